use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
}

impl Error {
    /// Whether a retry of the same write could succeed later
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::QuotaExceeded { .. } | Error::Database(_) | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
