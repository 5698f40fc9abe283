use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LISTING_LIMIT: u32 = 25;
pub const DEFAULT_USER_AGENT: &str = "magpie/0.1 (social data downloader)";

/// Application configuration. Loaded once at startup, either from the
/// environment or from a TOML file named by `MAGPIE_CONFIG`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Listing size used when a subreddit query carries no `limit`.
    #[serde(default = "default_listing_limit")]
    pub listing_limit: u32,
    pub reddit: RedditConfig,
    pub twitter: TwitterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterConfig {
    pub bearer_token: String,
}

impl AppConfig {
    /// Loads configuration from `MAGPIE_CONFIG` if set, the environment
    /// otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("MAGPIE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Self::from_env(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let listing_limit = match env::var("MAGPIE_LISTING_LIMIT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: "MAGPIE_LISTING_LIMIT".to_string(),
                value: raw,
            })?,
            Err(_) => DEFAULT_LISTING_LIMIT,
        };

        Ok(Self {
            bind_addr: env::var("MAGPIE_BIND_ADDR").unwrap_or_else(|_| default_bind_addr()),
            listing_limit,
            reddit: RedditConfig {
                client_id: require_env("REDDIT_CLIENT_ID")?,
                client_secret: require_env("REDDIT_CLIENT_SECRET")?,
                user_agent: env::var("REDDIT_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            },
            twitter: TwitterConfig {
                bearer_token: require_env("TWITTER_BEARER_TOKEN")?,
            },
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::Io(err)
            }
        })?;
        Self::from_toml(&contents)
    }

    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

fn require_env(var_name: &str) -> Result<String, ConfigError> {
    env::var(var_name).map_err(|_| ConfigError::MissingEnvironmentVariable {
        var_name: var_name.to_string(),
    })
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_listing_limit() -> u32 {
    DEFAULT_LISTING_LIMIT
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_toml_config() {
        let config = AppConfig::from_toml(
            r#"
            bind_addr = "0.0.0.0:9000"
            listing_limit = 50

            [reddit]
            client_id = "abc"
            client_secret = "def"
            user_agent = "test-agent/1.0"

            [twitter]
            bearer_token = "xyz"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.listing_limit, 50);
        assert_eq!(config.reddit.client_id, "abc");
        assert_eq!(config.twitter.bearer_token, "xyz");
    }

    #[test]
    fn toml_defaults_apply_when_fields_are_omitted() {
        let config = AppConfig::from_toml(
            r#"
            [reddit]
            client_id = "abc"
            client_secret = "def"

            [twitter]
            bearer_token = "xyz"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.listing_limit, DEFAULT_LISTING_LIMIT);
        assert_eq!(config.reddit.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn missing_required_section_is_a_parse_error() {
        let err = AppConfig::from_toml("listing_limit = 10").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_env_var_is_reported_by_name() {
        let err = require_env("MAGPIE_TEST_UNSET_VARIABLE").unwrap_err();
        match err {
            ConfigError::MissingEnvironmentVariable { var_name } => {
                assert_eq!(var_name, "MAGPIE_TEST_UNSET_VARIABLE");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
