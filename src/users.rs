//! Users owning links

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

/// Minimum length of a password
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub session_id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// Normalize an email address for storage and lookups
///
/// Only a rough shape check, there is no verification mail
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) =>
        {
            Some(email)
        }
        _ => None,
    }
}
