use serde::{Deserialize, Serialize};
use serde_json::Value;

use magpie_core::{ProviderError, Record};

/// `edited` on a comment is either `false` or the edit timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Edited {
    Flag(bool),
    Timestamp(f64),
}

impl Default for Edited {
    fn default() -> Self {
        Edited::Flag(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentData {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub edited: Edited,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub is_submitter: bool,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub stickied: bool,
    /// Nested reply listing, or `""` when there are none. Walked during
    /// tree construction, never projected.
    #[serde(default, skip_serializing)]
    pub replies: Value,
}

impl CommentData {
    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Record::new(),
        }
    }
}

/// A `more` placeholder: the provider's marker that further comments
/// exist but were not returned. Must be resolved before joining; an
/// unresolved placeholder never reaches the output.
#[derive(Debug, Clone, Deserialize)]
pub struct MoreData {
    pub id: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub children: Vec<String>,
}

/// How far placeholder resolution goes. The single-submission download
/// is exhaustive; the listing download deliberately is not. Both
/// behaviours ship; keeping them as distinct variants keeps the
/// difference visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionPolicy {
    Exhaustive,
    Bounded(u32),
}

impl ExpansionPolicy {
    pub(crate) fn batch_budget(&self) -> u32 {
        match self {
            ExpansionPolicy::Exhaustive => u32::MAX,
            ExpansionPolicy::Bounded(batches) => *batches,
        }
    }
}

/// Flattened view of one submission's discussion: the real comments in
/// traversal order plus the placeholders still waiting to be resolved.
#[derive(Debug, Default)]
pub struct CommentTree {
    comments: Vec<CommentData>,
    pending: Vec<MoreData>,
}

impl CommentTree {
    /// Walks a comment listing, collecting comments (nested replies
    /// included) and `more` stubs.
    pub fn from_listing(listing: &Value) -> Result<Self, ProviderError> {
        let mut tree = Self::default();
        tree.absorb_listing(listing)?;
        Ok(tree)
    }

    pub fn comments(&self) -> &[CommentData] {
        &self.comments
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn take_pending(&mut self) -> Vec<MoreData> {
        std::mem::take(&mut self.pending)
    }

    /// Absorbs things returned by a morechildren call. These arrive flat;
    /// any fresh `more` stubs among them queue up for the next round.
    pub fn absorb_things(&mut self, things: &[Value]) -> Result<(), ProviderError> {
        for thing in things {
            self.absorb_thing(thing)?;
        }
        Ok(())
    }

    fn absorb_listing(&mut self, listing: &Value) -> Result<(), ProviderError> {
        // Empty reply slots arrive as "" rather than a listing object.
        if !listing.is_object() {
            return Ok(());
        }
        let children = listing
            .get("data")
            .and_then(|data| data.get("children"))
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::InvalidResponse {
                details: "comment listing without children".to_string(),
            })?;

        self.absorb_things(children)
    }

    fn absorb_thing(&mut self, thing: &Value) -> Result<(), ProviderError> {
        let data = || {
            thing
                .get("data")
                .cloned()
                .ok_or_else(|| ProviderError::InvalidResponse {
                    details: "thing without data".to_string(),
                })
        };

        match thing.get("kind").and_then(Value::as_str) {
            Some("t1") => {
                let comment: CommentData =
                    serde_json::from_value(data()?).map_err(|_| ProviderError::InvalidResponse {
                        details: "failed to parse comment".to_string(),
                    })?;
                let replies = comment.replies.clone();
                self.comments.push(comment);
                self.absorb_listing(&replies)?;
            }
            Some("more") => {
                let more: MoreData =
                    serde_json::from_value(data()?).map_err(|_| ProviderError::InvalidResponse {
                        details: "failed to parse more placeholder".to_string(),
                    })?;
                // "continue this thread" stubs carry no child ids and
                // cannot be fetched through morechildren; skip them.
                if !more.children.is_empty() {
                    self.pending.push(more);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
