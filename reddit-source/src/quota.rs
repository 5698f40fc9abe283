use reqwest::header::HeaderMap;
use tracing::info;

/// Snapshot of the provider's rate-limit headers after one call. Logged
/// for observability only; nothing here acts on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaSnapshot {
    pub used: f64,
    pub remaining: f64,
    pub reset_secs: u64,
}

impl QuotaSnapshot {
    /// Reads the `x-ratelimit-*` trio; absent or malformed headers mean
    /// no snapshot, not an error.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            used: header_f64(headers, "x-ratelimit-used")?,
            remaining: header_f64(headers, "x-ratelimit-remaining")?,
            reset_secs: header_f64(headers, "x-ratelimit-reset")? as u64,
        })
    }

    pub fn log(&self, endpoint: &str) {
        info!(
            "Reddit API quota after {}: used {}, remaining {}, window resets in {}s",
            endpoint, self.used, self.remaining, self.reset_secs
        );
    }
}

fn header_f64(headers: &HeaderMap, name: &str) -> Option<f64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
