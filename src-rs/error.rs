use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Http { status: 404, .. })
    }
}

/// Ways a poll can end in the `failed` state.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PollError {
    #[error("{0}")]
    NetworkFailure(String),
    #[error("{0}")]
    RemoteFailure(String),
    #[error("malformed task response: {0}")]
    MalformedResponse(String),
    #[error("task polling timed out after {0}ms")]
    TimedOut(u128),
}

impl From<ClientError> for PollError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::MalformedResponse(msg) => PollError::MalformedResponse(msg),
            other => PollError::NetworkFailure(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("poll interval must be a positive number of milliseconds")]
    ZeroInterval,
    #[error("backoff multiplier must be at least 1.0, got {0}")]
    InvalidBackoff(f64),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
