//! All things related to the storage of users, links and click events

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::clicks::ClickEvent;
use crate::links::Link;
use crate::slugs::ShortCode;
use crate::users::User;

pub use memory::Memory;
pub use postgres::Postgres;

mod memory;
mod postgres;

/// Storage configuration
pub enum Config {
    /// Keep everything in memory, gone on shutdown
    Memory,

    /// Connect to Postgres with a connection string
    Postgres(String),
}

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// The short code is already used by another link
    #[error("Short code `{0}` already exists")]
    DuplicateSlug(String),

    /// The email address is already registered
    #[error("User `{0}` already exists")]
    DuplicateUser(String),

    /// The record to change does not exist
    #[error("Record not found")]
    NotFound,

    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Unavailable(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The initial session ID for the user
    pub session_id: &'a Uuid,

    /// The normalized email address
    pub email: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to create a Link
pub struct CreateLinkValues<'a> {
    /// The user owning the link
    pub owner_id: &'a Uuid,

    /// The normalized URL the link resolves to
    pub original_url: &'a str,

    /// The validated short code
    pub short_code: &'a ShortCode,
}

/// Values to update a Link
///
/// Fields that are `None` are left untouched
pub struct UpdateLinkValues<'a> {
    /// New normalized URL
    pub original_url: Option<&'a str>,

    /// New validated short code
    pub short_code: Option<&'a ShortCode>,
}

/// Request metadata stored with a click event
#[derive(Clone, Debug, Default)]
pub struct Hit {
    /// IP address of the client, when known
    pub ip_address: Option<IpAddr>,

    /// User agent of the client, when sent
    pub user_agent: Option<String>,
}

/// Storage with all supported operations
///
/// Every mutation is atomic, callers never read-modify-write
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its (normalized) email address
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Finds a single user by its ID
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>>;

    /// Create a single user
    ///
    /// Fails with [`Error::DuplicateUser`] when the email is taken
    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User>;

    /// Replace the session ID of a user, invalidating all tokens issued before
    async fn change_session(&self, user: &User, session_id: &Uuid) -> Result<User>;

    /// Create a link
    ///
    /// Fails with [`Error::DuplicateSlug`] when the short code is taken, nothing is inserted
    async fn create_link(&self, values: &CreateLinkValues<'_>) -> Result<Link>;

    /// Find a single link by its short code
    ///
    /// Case-sensitive exact match
    async fn find_single_link_by_code(&self, short_code: &str) -> Result<Option<Link>>;

    /// Find a single link by ID
    async fn find_single_link_by_id(&self, id: &Uuid) -> Result<Option<Link>>;

    /// Find all links of an owner, newest first
    async fn find_all_links_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Link>>;

    /// Update a link
    ///
    /// A short code colliding with another link fails with [`Error::DuplicateSlug`] and leaves
    /// the link unchanged
    async fn update_link(&self, id: &Uuid, values: &UpdateLinkValues<'_>) -> Result<Link>;

    /// Delete a link and all its click events
    async fn delete_link(&self, id: &Uuid) -> Result<()>;

    /// Record a click: append the event and increment the counter, both or neither
    async fn record_click(&self, link_id: &Uuid, hit: &Hit) -> Result<ClickEvent>;

    /// Find all click events of a link since a moment, oldest first
    async fn find_all_clicks_by_link_since(
        &self,
        link_id: &Uuid,
        since: &DateTime<Utc>,
    ) -> Result<Vec<ClickEvent>>;
}
