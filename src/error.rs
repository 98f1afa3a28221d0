//! Error types for the Brasa voice assistant and order backend

use thiserror::Error;

/// Result type alias for Brasa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the assistant or the order backend
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Menu loading or parsing error
    #[error("menu error: {0}")]
    Menu(String),

    /// Voice processing error
    #[error("voice error: {0}")]
    Voice(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Speech service refused our credentials
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Order submission error
    #[error("order error: {0}")]
    Order(String),

    /// Rejected request payload
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
