//! Utility functions for the API

use uuid::Uuid;

use crate::api::Error;
use crate::links::Link;
use crate::storage::Storage;

/// Fetch a link owned by the given user from storage
///
/// Links of other users are reported as not found
pub async fn fetch_owned_link<S: Storage>(
    storage: &S,
    owner_id: &Uuid,
    link_id: &Uuid,
) -> Result<Link, Error> {
    storage
        .find_single_link_by_id(link_id)
        .await?
        .filter(|link| link.owner_id == *owner_id)
        .map_or_else(|| Err(Error::not_found("Link not found")), Ok)
}
