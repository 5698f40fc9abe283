use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use magpie_core::config::RedditConfig;
use magpie_core::{ListingKind, ProviderError, Record};

use crate::comments::{CommentTree, ExpansionPolicy};
use crate::quota::QuotaSnapshot;

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Renew the app token when it is this close to expiry.
const TOKEN_RENEWAL_MARGIN: Duration = Duration::from_secs(60);

/// The morechildren endpoint accepts at most this many ids per call.
const MORECHILDREN_BATCH: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    pub kind: String,
    pub data: ListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<Thing<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub num_comments: u32,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub stickied: bool,
}

impl SubmissionData {
    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Record::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
struct AppToken {
    access_token: String,
    expires_at: Instant,
}

/// Authenticated session handle to the Reddit API. Safe for repeated
/// sequential use; concurrent in-flight use is the server's problem to
/// avoid (one request at a time per handle).
#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    config: RedditConfig,
    token: RwLock<Option<AppToken>>,
}

impl RedditApiClient {
    /// Builds the client without touching the network; the token is
    /// acquired lazily on the first call.
    pub fn new(config: RedditConfig) -> Self {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            config,
            token: RwLock::new(None),
        }
    }

    /// Builds the client and establishes the session immediately, so a
    /// misconfigured credential pair fails at construction rather than on
    /// the first user query.
    pub async fn connect(config: RedditConfig) -> Result<Self, ProviderError> {
        let client = Self::new(config);
        client.renew_token().await?;
        Ok(client)
    }

    async fn renew_token(&self) -> Result<String, ProviderError> {
        debug!("Requesting app-only token");
        let response = self
            .http_client
            .post(REDDIT_TOKEN_URL)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::AuthenticationFailed {
                reason: format!("token endpoint returned status {}", status.as_u16()),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|_| ProviderError::InvalidResponse {
                    details: "failed to parse token response".to_string(),
                })?;

        let access_token = token.access_token.clone();
        let expires_at = Instant::now() + Duration::from_secs(token.expires_in);
        *self.token.write().await = Some(AppToken {
            access_token: token.access_token,
            expires_at,
        });
        debug!("App token renewed, valid for {}s", token.expires_in);
        Ok(access_token)
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_RENEWAL_MARGIN {
                return Ok(token.access_token.clone());
            }
        }
        self.renew_token().await
    }

    async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", REDDIT_API_BASE, endpoint);

        debug!("GET {}", endpoint);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .query(query)
            .send()
            .await?;

        if let Some(quota) = QuotaSnapshot::from_headers(response.headers()) {
            quota.log(endpoint);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(error_for_status(status, endpoint));
        }

        response
            .json()
            .await
            .map_err(|_| ProviderError::InvalidResponse {
                details: format!("failed to parse response from {endpoint}"),
            })
    }

    /// Fetches one listing page of up to `limit` submissions; the
    /// provider may return fewer.
    pub async fn get_listing(
        &self,
        subreddit: &str,
        kind: ListingKind,
        limit: u32,
    ) -> Result<Vec<SubmissionData>, ProviderError> {
        let endpoint = format!("/r/{}/{}", subreddit, kind.as_str());
        let body = self
            .get_json(
                &endpoint,
                &[
                    ("limit", limit.to_string()),
                    ("raw_json", "1".to_string()),
                ],
            )
            .await?;

        let listing: Listing<SubmissionData> =
            serde_json::from_value(body).map_err(|_| ProviderError::InvalidResponse {
                details: format!("failed to parse listing for r/{subreddit}"),
            })?;

        let submissions: Vec<SubmissionData> = listing
            .data
            .children
            .into_iter()
            .map(|thing| thing.data)
            .collect();
        info!(
            "Retrieved {} submissions from r/{} ({})",
            submissions.len(),
            subreddit,
            kind
        );
        Ok(submissions)
    }

    /// Fetches one submission together with its initial comment tree.
    pub async fn get_submission(
        &self,
        submission_id: &str,
    ) -> Result<(SubmissionData, CommentTree), ProviderError> {
        let endpoint = format!("/comments/{}", submission_id);
        let body = self
            .get_json(&endpoint, &[("raw_json", "1".to_string())])
            .await?;

        let (submission, tree) = split_comments_response(&body)?;
        debug!(
            "Fetched submission {} with {} initial comments, {} placeholders",
            submission.id,
            tree.comments().len(),
            tree.pending_len()
        );
        Ok((submission, tree))
    }

    /// Resolves `more` placeholders in the tree. `Exhaustive` keeps
    /// going until none are left; `Bounded` stops after its batch budget
    /// and leaves the rest unresolved.
    pub async fn expand_comments(
        &self,
        link_fullname: &str,
        tree: &mut CommentTree,
        policy: ExpansionPolicy,
    ) -> Result<(), ProviderError> {
        let mut budget = policy.batch_budget();

        while tree.has_pending() && budget > 0 {
            for more in tree.take_pending() {
                if budget == 0 {
                    break;
                }
                for chunk in more.children.chunks(MORECHILDREN_BATCH) {
                    let things = self.fetch_more_children(link_fullname, chunk).await?;
                    tree.absorb_things(&things)?;
                }
                budget -= 1;
            }
        }

        if tree.has_pending() {
            debug!(
                "Left {} placeholder batches unresolved for {}",
                tree.pending_len(),
                link_fullname
            );
        }
        Ok(())
    }

    async fn fetch_more_children(
        &self,
        link_fullname: &str,
        children: &[String],
    ) -> Result<Vec<serde_json::Value>, ProviderError> {
        let body = self
            .get_json(
                "/api/morechildren",
                &[
                    ("api_type", "json".to_string()),
                    ("link_id", link_fullname.to_string()),
                    ("children", children.join(",")),
                    ("raw_json", "1".to_string()),
                ],
            )
            .await?;

        let response: MoreChildrenResponse =
            serde_json::from_value(body).map_err(|_| ProviderError::InvalidResponse {
                details: "failed to parse morechildren response".to_string(),
            })?;
        Ok(response.json.data.map(|data| data.things).unwrap_or_default())
    }
}

/// The comments endpoint answers with a two-part array: a listing holding
/// the submission itself, then the comment listing.
pub(crate) fn split_comments_response(
    body: &serde_json::Value,
) -> Result<(SubmissionData, CommentTree), ProviderError> {
    let parts = body
        .as_array()
        .filter(|parts| parts.len() == 2)
        .ok_or_else(|| ProviderError::InvalidResponse {
            details: "expected a two-part comments response".to_string(),
        })?;

    let listing: Listing<SubmissionData> =
        serde_json::from_value(parts[0].clone()).map_err(|_| ProviderError::InvalidResponse {
            details: "failed to parse submission part".to_string(),
        })?;
    let submission = listing
        .data
        .children
        .into_iter()
        .next()
        .map(|thing| thing.data)
        .ok_or_else(|| ProviderError::InvalidResponse {
            details: "comments response carried no submission".to_string(),
        })?;

    let tree = CommentTree::from_listing(&parts[1])?;
    Ok((submission, tree))
}

fn error_for_status(status: StatusCode, endpoint: &str) -> ProviderError {
    match status.as_u16() {
        401 => ProviderError::AuthenticationFailed {
            reason: "token rejected".to_string(),
        },
        403 => ProviderError::AuthenticationFailed {
            reason: format!("access to {endpoint} forbidden"),
        },
        code => ProviderError::ServerError { status_code: code },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_FIXTURE: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {"kind": "t3", "data": {"id": "aaa111", "title": "First post", "author": "alice",
                  "created_utc": 1600000000.0, "selftext": "", "url": "https://example.com",
                  "permalink": "/r/pics/comments/aaa111/first_post/", "subreddit": "pics",
                  "num_comments": 2, "score": 10, "stickied": false}},
                {"kind": "t3", "data": {"id": "bbb222", "title": "Second post",
                  "created_utc": 1600000100.0, "num_comments": 0, "score": 1}}
            ],
            "after": "t3_bbb222",
            "before": null
        }
    }"#;

    #[test]
    fn parses_a_listing_page() {
        let listing: Listing<SubmissionData> = serde_json::from_str(LISTING_FIXTURE).unwrap();
        assert_eq!(listing.kind, "Listing");
        assert_eq!(listing.data.children.len(), 2);
        assert_eq!(listing.data.children[0].data.title, "First post");
        // Absent fields fall back to defaults instead of failing the parse.
        assert!(listing.data.children[1].data.author.is_none());
        assert_eq!(listing.data.children[1].data.selftext, "");
    }

    #[test]
    fn splits_a_two_part_comments_response() {
        let body: serde_json::Value = serde_json::from_str(&format!(
            r#"[
                {LISTING_FIXTURE},
                {{"kind": "Listing", "data": {{"children": [
                    {{"kind": "t1", "data": {{"id": "c1", "author": "bob", "body": "nice",
                      "created_utc": 1600000200.0, "edited": false, "score": 3,
                      "is_submitter": false, "parent_id": "t3_aaa111", "stickied": false,
                      "replies": ""}}}}
                ], "after": null, "before": null}}}}
            ]"#
        ))
        .unwrap();

        let (submission, tree) = split_comments_response(&body).unwrap();
        assert_eq!(submission.id, "aaa111");
        assert_eq!(tree.comments().len(), 1);
        assert_eq!(tree.comments()[0].parent_id, "t3_aaa111");
    }

    #[test]
    fn rejects_a_response_without_two_parts() {
        let body: serde_json::Value = serde_json::from_str("[]").unwrap();
        assert!(matches!(
            split_comments_response(&body),
            Err(ProviderError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn submission_record_keeps_title_for_renaming() {
        let listing: Listing<SubmissionData> = serde_json::from_str(LISTING_FIXTURE).unwrap();
        let record = listing.data.children[0].data.to_record();
        assert_eq!(record["title"], "First post");
        assert_eq!(record["id"], "aaa111");
    }

    #[test]
    fn morechildren_response_yields_things() {
        let body = r#"{"json": {"errors": [], "data": {"things": [
            {"kind": "t1", "data": {"id": "c9", "body": "late reply"}}
        ]}}}"#;
        let parsed: MoreChildrenResponse = serde_json::from_str(body).unwrap();
        let things = parsed.json.data.unwrap().things;
        assert_eq!(things.len(), 1);
        assert_eq!(things[0]["kind"], "t1");
    }

    #[test]
    fn status_mapping_separates_auth_from_server_errors() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, "/r/pics/hot"),
            ProviderError::AuthenticationFailed { .. }
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, "/r/pics/hot"),
            ProviderError::ServerError { status_code: 502 }
        ));
    }
}
