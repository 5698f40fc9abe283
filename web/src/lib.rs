pub mod error;
pub mod handlers;
pub mod templates;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use reddit_source::RedditDataSource;
use twitter_source::TwitterDataSource;

/// Shared handler state: one source instance per provider, reused
/// sequentially across requests.
#[derive(Clone)]
pub struct AppState {
    pub twitter: Arc<TwitterDataSource>,
    pub reddit: Arc<RedditDataSource>,
}

/// Creates the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/hello", get(handlers::hello))
        .route("/twitter", get(handlers::twitter_form))
        .route("/twitter-submit", post(handlers::twitter_submit))
        .route("/reddit", get(handlers::reddit_form))
        .route(
            "/reddit-submission-submit",
            post(handlers::reddit_submission_submit),
        )
        .route(
            "/reddit-subreddit-submit",
            post(handlers::reddit_subreddit_submit),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
