use async_trait::async_trait;

use crate::error::SourceError;

/// Capability contract shared by the concrete data sources: turn one query
/// specification into complete CSV text.
///
/// Implementations perform a single bounded fetch per call and hold no
/// state across requests beyond their provider session handle. A failed
/// external call surfaces a [`SourceError`]; no partial output is produced.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Query specification this source understands.
    type Query: Send + Sync;

    /// Runs one query and returns UTF-8 CSV text, header row included
    /// even when zero data rows are produced.
    async fn query(&self, spec: &Self::Query) -> Result<String, SourceError>;
}
