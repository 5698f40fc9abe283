use thiserror::Error;

/// Errors a data source can surface to its caller. None of these are
/// caught or retried inside the sources; the web layer maps them to HTTP
/// statuses.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("missing required parameter '{field}'")]
    MissingParameter { field: String },

    #[error("invalid value '{value}' for parameter '{field}'")]
    InvalidArgument { field: String, value: String },

    #[error("operation not implemented: {operation}")]
    NotImplemented { operation: String },

    #[error("data source unavailable: {0}")]
    SourceUnavailable(#[from] ProviderError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Transport and authentication detail behind `SourceError::SourceUnavailable`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("request timeout")]
    RequestTimeout,

    #[error("provider returned status {status_code}")]
    ServerError { status_code: u16 },

    #[error("invalid provider response: {details}")]
    InvalidResponse { details: String },

    #[error("network error: {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::RequestTimeout
        } else {
            ProviderError::Network(err)
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::SourceUnavailable(err.into())
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        SourceError::Internal {
            message: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
