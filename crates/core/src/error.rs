//! Error types for the voice gateway

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the voice gateway
#[derive(Error, Debug)]
pub enum Error {
    // Engine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Synthesis-engine errors
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
