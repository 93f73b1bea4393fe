//! Errors of the link operations

use thiserror::Error;

use crate::slugs::InvalidSlug;
use crate::storage;

/// Error taxonomy of the link operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed URL, short code or parameter, the user can correct it
    #[error("{0}")]
    InvalidInput(String),

    /// The short code is taken by another link
    #[error("Short code `{0}` already exists")]
    DuplicateSlug(String),

    /// The requested resource does not exist (for the current user)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Transient storage failure, retrying is up to the caller
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(String),
}

/// Result type for the link operations
pub type Result<T> = core::result::Result<T, Error>;

impl From<InvalidSlug> for Error {
    fn from(err: InvalidSlug) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<storage::Error> for Error {
    fn from(err: storage::Error) -> Self {
        match err {
            storage::Error::DuplicateSlug(short_code) => Self::DuplicateSlug(short_code),
            storage::Error::DuplicateUser(_) => Self::InvalidInput(err.to_string()),
            storage::Error::NotFound => Self::NotFound("Link"),
            storage::Error::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}
