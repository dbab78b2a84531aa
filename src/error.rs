use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error), // Network, HTTP status and body decoding failures

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}

pub type Result<T> = std::result::Result<T, ShopError>;

impl ShopError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShopError::NotFound(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ShopError::Transport(_))
    }
}
