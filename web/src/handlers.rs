use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tracing::debug;

use magpie_core::{DataSource, SourceError, SubmissionQuery, SubredditQuery, TwitterQuery};

use crate::error::ApiError;
use crate::templates;
use crate::AppState;

pub async fn index() -> Html<&'static str> {
    debug!("Route {}", "/");
    Html(templates::INDEX_HTML)
}

pub async fn hello() -> &'static str {
    debug!("Hello world route was requested.");
    "Hello world."
}

pub async fn twitter_form() -> Html<&'static str> {
    debug!("Route {}", "/twitter");
    Html(templates::TWITTER_FORM_HTML)
}

pub async fn twitter_submit(
    State(state): State<AppState>,
    Form(query): Form<TwitterQuery>,
) -> Result<Response, ApiError> {
    debug!("Route {}", "/twitter-submit");
    let csv = state.twitter.query(&query).await?;
    // query() rejected the request already if `string` was absent.
    let filename = format!("{}.csv", query.string.as_deref().unwrap_or("twitter"));
    Ok(csv_attachment(&filename, csv))
}

pub async fn reddit_form() -> Html<&'static str> {
    debug!("Route {}", "/reddit");
    Html(templates::REDDIT_FORM_HTML)
}

pub async fn reddit_submission_submit(
    State(state): State<AppState>,
    Form(query): Form<SubmissionQuery>,
) -> Result<Response, ApiError> {
    debug!("Route {}", "/reddit-submission-submit");
    let submission_id = query
        .submission_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ApiError::from(SourceError::MissingParameter {
                field: "submission_id".to_string(),
            })
        })?;

    let csv = state.reddit.get_submission(submission_id).await?;
    Ok(csv_attachment(&format!("{submission_id}.csv"), csv))
}

pub async fn reddit_subreddit_submit(
    State(state): State<AppState>,
    Form(query): Form<SubredditQuery>,
) -> Result<Response, ApiError> {
    debug!("Route {}", "/reddit-subreddit-submit");
    let csv = state.reddit.query(&query).await?;
    let filename = format!(
        "{}-{}.csv",
        query.subreddit.as_deref().unwrap_or("reddit"),
        query.kind.as_deref().unwrap_or("listing")
    );
    Ok(csv_attachment(&filename, csv))
}

/// Wraps finished CSV text as a file download. Filenames stay unquoted,
/// matching the format the download links have always produced.
fn csv_attachment(filename: &str, csv: String) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        csv,
    )
        .into_response()
}
