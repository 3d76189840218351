use thiserror::Error;

#[derive(Error, Debug)]
pub enum BciError {
    #[error("Stream '{name}' not found")]
    StreamNotFound { name: String },

    #[error("Stream lost: {0}")]
    StreamLost(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Channel count mismatch: stream has {expected} channels, sample has {got}")]
    ChannelMismatch { expected: usize, got: usize },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, BciError>;
