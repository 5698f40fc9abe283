pub mod api;
pub mod comments;
pub mod quota;

use async_trait::async_trait;
use tracing::info;

use magpie_core::config::RedditConfig;
use magpie_core::{
    join_records, DataSource, ListingKind, Projection, Record, SourceError, SubredditQuery,
};

use crate::api::{RedditApiClient, SubmissionData};
use crate::comments::{CommentTree, ExpansionPolicy};

/// Column order of the Reddit CSV. Hand-specified; extra provider fields
/// are dropped during projection.
pub const REDDIT_COLUMNS: &[&str] = &[
    "header",
    "comments",
    "author",
    "created_utc",
    "edited",
    "score",
    "is_submitter",
    "parent_id",
    "stickied",
];

/// `title` and `body` go out under the names the download format uses.
const REDDIT_PROJECTION: Projection = Projection::new(
    REDDIT_COLUMNS,
    &[("title", "header"), ("body", "comments")],
);

/// Listing-path placeholder resolution stops after this many batches.
/// The single-submission path has no such cap.
const LISTING_EXPANSION_LIMIT: u32 = 32;

/// Reddit downloads backed by an app-only API session established at
/// construction and reused sequentially across requests.
pub struct RedditDataSource {
    client: RedditApiClient,
    default_limit: u32,
}

impl RedditDataSource {
    /// Establishes the session immediately; bad credentials fail here
    /// instead of on the first user query.
    pub async fn connect(config: RedditConfig, default_limit: u32) -> Result<Self, SourceError> {
        let client = RedditApiClient::connect(config).await?;
        Ok(Self {
            client,
            default_limit,
        })
    }

    /// Builds the source without contacting the provider; the session is
    /// established on first use. `connect` is the production path.
    pub fn new(config: RedditConfig, default_limit: u32) -> Self {
        Self {
            client: RedditApiClient::new(config),
            default_limit,
        }
    }

    /// One submission with its full discussion. Every placeholder is
    /// resolved before joining, however long that takes on a large
    /// thread.
    pub async fn get_submission(&self, submission_id: &str) -> Result<String, SourceError> {
        let (submission, mut tree) = self.client.get_submission(submission_id).await?;
        let link = format!("t3_{}", submission.id);
        self.client
            .expand_comments(&link, &mut tree, ExpansionPolicy::Exhaustive)
            .await?;

        let rows = joined_rows(&submission, &tree);
        info!("Submission {} produced {} rows", submission.id, rows.len());
        REDDIT_PROJECTION.to_csv(&rows)
    }

    pub async fn get_hot(&self, subreddit: &str, limit: u32) -> Result<String, SourceError> {
        self.listing_csv(subreddit, ListingKind::Hot, limit).await
    }

    pub async fn get_new(&self, subreddit: &str, limit: u32) -> Result<String, SourceError> {
        self.listing_csv(subreddit, ListingKind::New, limit).await
    }

    /// Top listings were never wired up in the download format.
    pub async fn get_top(&self, _subreddit: &str, _limit: u32) -> Result<String, SourceError> {
        Err(SourceError::NotImplemented {
            operation: "get_top".to_string(),
        })
    }

    async fn listing_csv(
        &self,
        subreddit: &str,
        kind: ListingKind,
        limit: u32,
    ) -> Result<String, SourceError> {
        let submissions = self.client.get_listing(subreddit, kind, limit).await?;

        let mut rows: Vec<Record> = Vec::new();
        for submission in &submissions {
            // Listing pages carry no comment trees; fetch each
            // submission's discussion and resolve a bounded number of
            // placeholders, unlike the single-submission path.
            let (_, mut tree) = self.client.get_submission(&submission.id).await?;
            let link = format!("t3_{}", submission.id);
            self.client
                .expand_comments(
                    &link,
                    &mut tree,
                    ExpansionPolicy::Bounded(LISTING_EXPANSION_LIMIT),
                )
                .await?;
            rows.extend(joined_rows(submission, &tree));
        }

        info!(
            "r/{} {} listing produced {} rows from {} submissions",
            subreddit,
            kind,
            rows.len(),
            submissions.len()
        );
        REDDIT_PROJECTION.to_csv(&rows)
    }
}

#[async_trait]
impl DataSource for RedditDataSource {
    type Query = SubredditQuery;

    /// Listing dispatcher. Unknown kinds and `top` fail without touching
    /// the network.
    async fn query(&self, spec: &SubredditQuery) -> Result<String, SourceError> {
        let subreddit = spec
            .subreddit
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SourceError::MissingParameter {
                field: "subreddit".to_string(),
            })?;
        let kind: ListingKind = spec
            .kind
            .as_deref()
            .ok_or_else(|| SourceError::MissingParameter {
                field: "kind".to_string(),
            })?
            .parse()?;
        let limit = spec.limit.unwrap_or(self.default_limit);

        match kind {
            ListingKind::Hot => self.get_hot(subreddit, limit).await,
            ListingKind::New => self.get_new(subreddit, limit).await,
            ListingKind::Top => self.get_top(subreddit, limit).await,
        }
    }
}

fn joined_rows(submission: &SubmissionData, tree: &CommentTree) -> Vec<Record> {
    let parent = submission.to_record();
    let children: Vec<Record> = tree
        .comments()
        .iter()
        .map(|comment| comment.to_record())
        .collect();
    join_records(&parent, &children)
}
