pub mod api;

use async_trait::async_trait;
use tracing::debug;

use magpie_core::{
    DataSource, Projection, Record, SourceError, TwitterQuery, DEFAULT_TWEET_LIMIT,
};

use crate::api::{SearchCriteria, TwitterSearchClient};

/// Column order of the tweet CSV. Hand-specified, not derived from the
/// data; extra provider fields are dropped during projection.
pub const TWEET_COLUMNS: &[&str] = &[
    "id",
    "permalink",
    "username",
    "text",
    "date",
    "retweets",
    "hashtags",
];

const TWEET_PROJECTION: Projection = Projection::new(TWEET_COLUMNS, &[]);

/// Tweet search backed by the recent-search API. Stateless across
/// requests apart from the configured HTTP client.
pub struct TwitterDataSource {
    client: TwitterSearchClient,
}

impl TwitterDataSource {
    pub fn new(bearer_token: String) -> Self {
        Self {
            client: TwitterSearchClient::new(bearer_token),
        }
    }
}

#[async_trait]
impl DataSource for TwitterDataSource {
    type Query = TwitterQuery;

    /// Validates the query, runs one bounded search and projects the
    /// result. The header row is present even when nothing matched.
    async fn query(&self, spec: &TwitterQuery) -> Result<String, SourceError> {
        let search_string = match spec.string.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => {
                return Err(SourceError::MissingParameter {
                    field: "string".to_string(),
                })
            }
        };

        let criteria = SearchCriteria {
            query: search_string.to_string(),
            since: spec.start_date,
            until: spec.end_date,
            max_results: spec.max.unwrap_or(DEFAULT_TWEET_LIMIT),
        };
        debug!("Twitter query: {:?}", criteria);

        let tweets = self.client.search(&criteria).await?;
        let records: Vec<Record> = tweets.iter().map(|tweet| tweet.to_record()).collect();
        TWEET_PROJECTION.to_csv(&records)
    }
}
