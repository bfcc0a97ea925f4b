use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjdError {
    /// Malformed or unsafe folder identifier; raised before any filesystem access.
    #[error("invalid folder: {0}")]
    InvalidInput(String),

    #[error("folder not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip writer or the sink behind it failed.
    #[error("archive error: {0}")]
    Archive(String),
}

impl From<zip::result::ZipError> for ProjdError {
    fn from(e: zip::result::ZipError) -> Self {
        ProjdError::Archive(e.to_string())
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ProjdError>;
