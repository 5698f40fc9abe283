use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::SourceError;

/// One heterogeneous key/value record, as fetched from a provider or
/// produced by the joiner. Keys are field names, values arbitrary JSON.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Number of tweets returned when the query does not say otherwise.
pub const DEFAULT_TWEET_LIMIT: u32 = 10;

/// Twitter query specification, as submitted through the search form.
/// `string` is required and must be non-empty; the source rejects the
/// query before it reaches the provider otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwitterQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub string: Option<String>,
    #[serde(
        rename = "start-date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        rename = "end-date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max: Option<u32>,
}

/// Subreddit listing query. `kind` stays a raw string here; the Reddit
/// source parses it at dispatch time so unknown values surface as
/// `InvalidArgument` from the source, not from the form layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubredditQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub subreddit: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
}

/// Single-submission query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub submission_id: Option<String>,
}

/// Provider-ordered listing pages the Reddit source understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Hot,
    New,
    Top,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Hot => "hot",
            ListingKind::New => "new",
            ListingKind::Top => "top",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(ListingKind::Hot),
            "new" => Ok(ListingKind::New),
            "top" => Ok(ListingKind::Top),
            other => Err(SourceError::InvalidArgument {
                field: "kind".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// HTML forms submit unfilled inputs as empty strings; treat those as
/// absent instead of failing typed deserialization.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_kind_parses_known_values() {
        assert_eq!("hot".parse::<ListingKind>().unwrap(), ListingKind::Hot);
        assert_eq!("new".parse::<ListingKind>().unwrap(), ListingKind::New);
        assert_eq!("top".parse::<ListingKind>().unwrap(), ListingKind::Top);
    }

    #[test]
    fn listing_kind_rejects_unknown_values() {
        let err = "horse".parse::<ListingKind>().unwrap_err();
        match err {
            SourceError::InvalidArgument { field, value } => {
                assert_eq!(field, "kind");
                assert_eq!(value, "horse");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn twitter_query_treats_empty_fields_as_absent() {
        let query: TwitterQuery =
            serde_urlencoded::from_str("string=giraffe&start-date=&end-date=&max=").unwrap();
        assert_eq!(query.string.as_deref(), Some("giraffe"));
        assert!(query.start_date.is_none());
        assert!(query.end_date.is_none());
        assert!(query.max.is_none());
    }

    #[test]
    fn twitter_query_parses_dates_and_max() {
        let query: TwitterQuery =
            serde_urlencoded::from_str("string=goats&start-date=2020-08-15&end-date=2020-09-03&max=25")
                .unwrap();
        assert_eq!(
            query.start_date,
            Some(NaiveDate::from_ymd_opt(2020, 8, 15).unwrap())
        );
        assert_eq!(
            query.end_date,
            Some(NaiveDate::from_ymd_opt(2020, 9, 3).unwrap())
        );
        assert_eq!(query.max, Some(25));
    }

    #[test]
    fn subreddit_query_keeps_kind_unparsed() {
        let query: SubredditQuery =
            serde_urlencoded::from_str("subreddit=dataisbeautiful&kind=horse").unwrap();
        assert_eq!(query.kind.as_deref(), Some("horse"));
        assert!(query.limit.is_none());
    }
}
