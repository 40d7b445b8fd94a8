use std::fmt;

/// Result type alias for surge core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for surge core operations
#[derive(Debug)]
pub enum Error {
    /// Malformed load pattern parameters (e.g., spike longer than the test)
    InvalidPattern(String),

    /// Unrecognized load pattern tag
    UnsupportedPattern(String),

    /// Invalid test configuration
    Config(String),

    /// Fatal dispatch setup failure (closed permit pool, panicked batch task)
    Dispatch(String),

    /// Configuration relay protocol errors
    Relay(String),

    /// I/O errors from the relay transport
    Io(std::io::Error),

    /// JSON encoding/decoding errors
    Serde(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPattern(msg) => write!(f, "Invalid load pattern: {msg}"),
            Error::UnsupportedPattern(tag) => write!(f, "Unsupported load pattern: {tag}"),
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
            Error::Dispatch(msg) => write!(f, "Dispatch error: {msg}"),
            Error::Relay(msg) => write!(f, "Relay error: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Serde(e) => write!(f, "Serialization error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}
