use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use magpie_core::{ProviderError, Record};

const TWITTER_API_BASE: &str = "https://api.twitter.com/2";

/// The recent-search endpoint only accepts page sizes in this range; the
/// caller's smaller `max` is honoured by truncating the returned rows.
const MIN_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Criteria for one bounded recent-search call. The date bounds are
/// advisory on the provider side: results may fall outside them.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub query: String,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub max_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<TweetData>,
    pub includes: Option<Includes>,
    pub meta: Option<SearchMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetData {
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub public_metrics: Option<PublicMetrics>,
    pub entities: Option<Entities>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashtagEntity {
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<UserData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMeta {
    pub result_count: Option<u32>,
}

/// One tweet, normalised for projection.
#[derive(Debug, Clone, Serialize)]
pub struct Tweet {
    pub id: String,
    pub permalink: String,
    pub username: String,
    pub text: String,
    pub date: Option<DateTime<Utc>>,
    pub retweets: u64,
    pub hashtags: Vec<String>,
}

impl Tweet {
    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Record::new(),
        }
    }
}

#[derive(Debug)]
pub struct TwitterSearchClient {
    http_client: Client,
    bearer_token: String,
}

impl TwitterSearchClient {
    pub fn new(bearer_token: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            bearer_token,
        }
    }

    /// Runs one bounded search. At most `criteria.max_results` tweets come
    /// back; the provider may return fewer.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Tweet>, ProviderError> {
        let url = format!("{}/tweets/search/recent", TWITTER_API_BASE);
        let params = build_query_params(criteria);

        info!("Searching tweets for '{}'", criteria.query);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!("Search failed with status {} for '{}'", status, criteria.query);
            return Err(error_for_status(status));
        }

        let body: SearchResponse =
            response
                .json()
                .await
                .map_err(|_| ProviderError::InvalidResponse {
                    details: "failed to parse search response".to_string(),
                })?;

        let tweets = flatten_response(body, criteria.max_results);
        info!("Retrieved {} tweets for '{}'", tweets.len(), criteria.query);
        Ok(tweets)
    }
}

fn build_query_params(criteria: &SearchCriteria) -> Vec<(&'static str, String)> {
    let page_size = criteria.max_results.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
    let mut params = vec![
        ("query", criteria.query.clone()),
        ("max_results", page_size.to_string()),
        (
            "tweet.fields",
            "created_at,public_metrics,entities".to_string(),
        ),
        ("expansions", "author_id".to_string()),
        ("user.fields", "username".to_string()),
    ];

    if let Some(since) = criteria.since {
        params.push(("start_time", format!("{since}T00:00:00Z")));
    }
    if let Some(until) = criteria.until {
        params.push(("end_time", format!("{until}T23:59:59Z")));
    }

    params
}

fn error_for_status(status: StatusCode) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationFailed {
            reason: format!("search rejected with status {}", status.as_u16()),
        },
        code => ProviderError::ServerError { status_code: code },
    }
}

/// Resolves author usernames from the `includes` block and truncates to
/// the caller's requested maximum.
fn flatten_response(body: SearchResponse, max_results: u32) -> Vec<Tweet> {
    let usernames: HashMap<String, String> = body
        .includes
        .map(|includes| {
            includes
                .users
                .into_iter()
                .map(|user| (user.id, user.username))
                .collect()
        })
        .unwrap_or_default();

    body.data
        .into_iter()
        .take(max_results as usize)
        .map(|tweet| {
            let username = tweet
                .author_id
                .as_ref()
                .and_then(|id| usernames.get(id))
                .cloned()
                .unwrap_or_default();
            let permalink = if username.is_empty() {
                format!("https://twitter.com/i/web/status/{}", tweet.id)
            } else {
                format!("https://twitter.com/{}/status/{}", username, tweet.id)
            };
            let hashtags = tweet
                .entities
                .map(|entities| entities.hashtags.into_iter().map(|h| h.tag).collect())
                .unwrap_or_default();

            Tweet {
                permalink,
                username,
                hashtags,
                id: tweet.id,
                text: tweet.text,
                date: tweet.created_at,
                retweets: tweet.public_metrics.map(|m| m.retweet_count).unwrap_or(0),
            }
        })
        .collect()
}
