use std::fmt;

/// Result type for flowlens-normalizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while normalizing a raw flow
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Too many timeline records had to be dropped to trust the remainder
    CorruptFlow {
        flow_id: String,
        dropped: usize,
        total: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CorruptFlow {
                flow_id,
                dropped,
                total,
            } => write!(
                f,
                "Flow {} is corrupt: {} of {} timeline records could not be interpreted",
                flow_id, dropped, total
            ),
        }
    }
}

impl std::error::Error for Error {}
