pub mod language;
pub mod llm;
pub mod session;
pub mod speech;
pub mod store;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SaarthiError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for SaarthiError {
    fn from(e: std::io::Error) -> Self {
        SaarthiError::StorageError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SaarthiError>;
