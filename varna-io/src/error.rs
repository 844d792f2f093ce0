//! Error types for VarnaIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// VarnaIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the listener or the session socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Color sensor fault
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Motor controller fault
    #[error("Motor error: {0}")]
    Motor(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
