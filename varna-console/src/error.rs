//! Error types for the Varna console

use thiserror::Error;

/// Console error type
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for ConsoleError {
    fn from(e: toml::de::Error) -> Self {
        ConsoleError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
