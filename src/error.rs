#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("System call error: {0}")]
    System(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Feature not available: {0}")]
    NotAvailable(String),

    #[error("Illegal index: {index} (window holds {size} samples)")]
    IllegalIndex { index: usize, size: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn system<S: Into<String>>(msg: S) -> Self {
        Error::System(msg.into())
    }

    pub(crate) fn invalid_data<S: Into<String>>(msg: S) -> Self {
        Error::InvalidData(msg.into())
    }

    pub(crate) fn not_available<S: Into<String>>(msg: S) -> Self {
        Error::NotAvailable(msg.into())
    }

    pub(crate) fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

/// Result type for pal-metrics operations
pub type Result<T> = std::result::Result<T, Error>;
