use thiserror::Error;

#[derive(Error, Debug)]
pub enum CafeError {
    /// Bad user input. The message is shown inline and nothing is written.
    #[error("{0}")]
    Validation(String),

    /// The action is not allowed in the current state.
    #[error("{0}")]
    Policy(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CafeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CafeError::Validation(msg.into())
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        CafeError::Policy(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CafeError::NotFound(what.into())
    }
}

pub type Result<T> = std::result::Result<T, CafeError>;
