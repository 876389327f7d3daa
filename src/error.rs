use thiserror::Error;

/// Errors raised by the data layer.
///
/// SQLite failures (including NOT NULL, UNIQUE, CHECK and foreign-key
/// violations) are passed through untouched so callers can inspect them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid availability: {0}")]
    InvalidAvailability(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
