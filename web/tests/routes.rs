use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use magpie_core::config::RedditConfig;
use reddit_source::RedditDataSource;
use twitter_source::TwitterDataSource;
use web::{create_router, AppState};

// The live fetch paths need provider credentials; everything here stays
// offline and exercises the request plumbing around them.

fn test_app() -> axum::Router {
    let reddit_config = RedditConfig {
        client_id: "test-id".to_string(),
        client_secret: "test-secret".to_string(),
        user_agent: "magpie-tests/0.1".to_string(),
    };
    create_router(AppState {
        twitter: Arc::new(TwitterDataSource::new("test-token".to_string())),
        reddit: Arc::new(RedditDataSource::new(reddit_config, 25)),
    })
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn invalid_url_should_return_404() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/nothing_here_xxxx")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hello_should_return_hello_world() {
    let response = test_app()
        .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Hello world.");
}

#[tokio::test]
async fn index_should_return_frontpage() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<h1>Welcome</h1>"));
}

#[tokio::test]
async fn twitter_form_route_should_return_the_form() {
    let response = test_app()
        .oneshot(Request::builder().uri("/twitter").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Please define your Twitter query."));
    assert!(body.contains(r#"<input id="string" type="text" name="string" required>"#));
    assert!(body.contains(r#"<button type="submit">Submit</button>"#));
}

#[tokio::test]
async fn reddit_form_route_should_return_the_form() {
    let response = test_app()
        .oneshot(Request::builder().uri("/reddit").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Please define your Reddit query."));
    assert!(body.contains(r#"<input id="submission-id" type="text" name="submission_id" required>"#));
    assert!(body.contains(r#"<select name="kind" id="kind" required>"#));
}

#[tokio::test]
async fn empty_twitter_form_should_fail_with_400() {
    let response = test_app()
        .oneshot(form_post("/twitter-submit", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("string"));
}

#[tokio::test]
async fn empty_submission_form_should_fail_with_400() {
    let response = test_app()
        .oneshot(form_post("/reddit-submission-submit", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("submission_id"));
}

#[tokio::test]
async fn subreddit_form_missing_subreddit_should_fail_with_400() {
    let response = test_app()
        .oneshot(form_post("/reddit-subreddit-submit", "kind=hot"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn subreddit_form_missing_kind_should_fail_with_400() {
    let response = test_app()
        .oneshot(form_post(
            "/reddit-subreddit-submit",
            "subreddit=dataisbeautiful",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn subreddit_form_with_weird_kind_should_fail_with_400() {
    let response = test_app()
        .oneshot(form_post(
            "/reddit-subreddit-submit",
            "subreddit=dataisbeautiful&kind=horse",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("horse"));
}

#[tokio::test]
async fn subreddit_form_with_top_kind_should_fail_with_501() {
    let response = test_app()
        .oneshot(form_post(
            "/reddit-subreddit-submit",
            "subreddit=dataisbeautiful&kind=top",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}
