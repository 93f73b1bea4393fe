//! Short codes
//!
//! Validation of user supplied codes and generation of random ones

use std::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

/// Minimum length of a short code
pub const MIN_LENGTH: usize = 3;

/// Maximum length of a short code
pub const MAX_LENGTH: usize = 20;

/// Length of a generated short code
pub const GENERATED_LENGTH: usize = 6;

/// A short code that passed validation
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    /// The code as string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reasons a short code is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidSlug {
    /// Too short or too long
    #[error("Short code must be between 3 and 20 characters, got {0}")]
    Length(usize),

    /// Character outside of `[a-zA-Z0-9_-]`
    #[error("Short code can only contain letters, digits, `-` and `_`, found {0:?}")]
    Character(char),
}

/// Validate a short code
///
/// Accepts exactly `^[a-zA-Z0-9_-]{3,20}$`, the input is not trimmed
pub fn validate(code: &str) -> Result<ShortCode, InvalidSlug> {
    if let Some(ch) = code
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
    {
        return Err(InvalidSlug::Character(ch));
    }

    // only ASCII left, bytes are characters
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&code.len()) {
        return Err(InvalidSlug::Length(code.len()));
    }

    Ok(ShortCode(code.to_string()))
}

/// Generate a random short code
///
/// Drawn uniformly from the 62 ASCII letters and digits, uniqueness is left to the storage
pub fn generate() -> ShortCode {
    let code = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_LENGTH)
        .map(char::from)
        .collect();

    ShortCode(code)
}
