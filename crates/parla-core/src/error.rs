use thiserror::Error;

/// Top-level error type for Parla.
///
/// Covers configuration, I/O and server lifecycle failures. Conversation and
/// gateway failures have their own typed errors in `parla-chat`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParlaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<toml::de::Error> for ParlaError {
    fn from(err: toml::de::Error) -> Self {
        ParlaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ParlaError {
    fn from(err: toml::ser::Error) -> Self {
        ParlaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ParlaError {
    fn from(err: serde_json::Error) -> Self {
        ParlaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Parla operations.
pub type Result<T> = std::result::Result<T, ParlaError>;
