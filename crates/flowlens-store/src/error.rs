use std::fmt;

/// Result type for flowlens-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while resolving flows
///
/// Messages never contain the session credential.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Platform rejected the credential (401/403)
    Unauthorized,

    /// Flow id unknown to the platform
    NotFound(String),

    /// Single failed attempt that may succeed if repeated (connectivity, timeout, 429, 5xx)
    Transient(String),

    /// Transient failures persisted through every retry attempt
    Unavailable { attempts: u32, reason: String },

    /// Platform answered with a body that does not match the expected contract
    Decode(String),

    /// Platform answered with a status outside the contract
    Remote(String),

    /// Configuration file or value is invalid
    Config(String),

    /// Session credential is absent or malformed
    Credential(String),
}

impl Error {
    /// Whether another attempt of the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unauthorized => write!(
                f,
                "The FlowLens platform rejected the access token (invalid or expired)"
            ),
            Error::NotFound(id) => write!(f, "Flow not found: {}", id),
            Error::Transient(msg) => write!(f, "Transient platform error: {}", msg),
            Error::Unavailable { attempts, reason } => write!(
                f,
                "FlowLens platform unavailable after {} attempts: {}",
                attempts, reason
            ),
            Error::Decode(msg) => write!(f, "Unexpected platform response: {}", msg),
            Error::Remote(msg) => write!(f, "Platform error: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Credential(msg) => write!(f, "Invalid access token: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest messages carry the URL but never request headers
        if err.is_decode() {
            Error::Decode(err.to_string())
        } else if err.is_builder() {
            Error::Config(err.to_string())
        } else if err.is_timeout() {
            Error::Transient(format!("request timed out: {}", err))
        } else {
            Error::Transient(err.to_string())
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {}", err))
    }
}
