use thiserror::Error;

/// Failure classes for the client data core. Variants hold plain strings so
/// the enum stays `Clone`: the request deduper replays one settled result to
/// every caller attached to the same in-flight key.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        ConsoleError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        ConsoleError::Payload(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
