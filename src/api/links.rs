//! Link API management
//!
//! Every route acts on behalf of the current user, links of other users do not exist for them

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::links;
use crate::links::Link;
use crate::resolver::Resolver;
use crate::storage::Storage;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::utils::fetch_owned_link;

/// The link response information
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_url: String,
    pub short_code: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            owner_id: link.owner_id,
            original_url: link.original_url,
            short_code: link.short_code,
            click_count: link.click_count,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// List all links of the current user, newest first
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/links
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "id": "<uuid>", "short_code": "abc123", "click_count": 3 ... } ] }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<LinkResponse>>, Error> {
    let links = storage.find_all_links_by_owner(&current_user.id).await?;

    Ok(Success::ok(
        links.into_iter().map(LinkResponse::from).collect(),
    ))
}

/// Get a single link
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/links/<uuid>
/// ```
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(link_id): PathParameters<Uuid>,
) -> Result<Success<LinkResponse>, Error> {
    let link = fetch_owned_link(&storage, &current_user.id, &link_id).await?;

    Ok(Success::ok(link.into()))
}

/// Create link form
#[derive(Debug, Deserialize)]
pub struct CreateLinkForm {
    /// URL to shorten, `https://` is assumed without a scheme
    original_url: String,

    /// Custom short code, generated when missing or blank
    short_code: Option<String>,
}

/// Create a link based on the [`CreateLinkForm`](CreateLinkForm) form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "original_url": "example.com", "short_code": "abc123" }' \
///     http://localhost:6000/api/links
/// ```
///
/// Response
/// ```json
/// { "data": { "id": "<uuid>", "original_url": "https://example.com", "short_code": "abc123" ... } }
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateLinkForm>,
) -> Result<Success<LinkResponse>, Error> {
    let short_code = form
        .short_code
        .as_deref()
        .map(str::trim)
        .filter(|short_code| !short_code.is_empty());

    let link = links::create_link(&storage, &current_user.id, &form.original_url, short_code).await?;

    tracing::debug!(
        "Created link `{}` to {} for user {}",
        link.short_code,
        link.original_url,
        current_user.id
    );

    Ok(Success::created(link.into()))
}

/// Update link form
///
/// Fields left out are not changed
#[derive(Debug, Deserialize)]
pub struct UpdateLinkForm {
    /// New URL
    original_url: Option<String>,

    /// New short code
    short_code: Option<String>,
}

/// Update a link based on the [`UpdateLinkForm`](UpdateLinkForm) form
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "short_code": "new-code" }' \
///     http://localhost:6000/api/links/<uuid>
/// ```
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(resolver): Extension<Resolver<S>>,
    current_user: CurrentUser<S>,
    PathParameters(link_id): PathParameters<Uuid>,
    Form(form): Form<UpdateLinkForm>,
) -> Result<Success<LinkResponse>, Error> {
    let link = fetch_owned_link(&storage, &current_user.id, &link_id).await?;

    let updated_link = links::update_link(
        &storage,
        &link.id,
        form.original_url.as_deref(),
        form.short_code.as_deref().map(str::trim),
    )
    .await?;

    resolver.forget(&link.short_code).await;

    Ok(Success::ok(updated_link.into()))
}

/// Delete a link, including its click events
///
/// Request:
/// ```sh
/// curl -v -XDELETE \
///     -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/links/<uuid>
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(resolver): Extension<Resolver<S>>,
    current_user: CurrentUser<S>,
    PathParameters(link_id): PathParameters<Uuid>,
) -> Result<Success<&'static str>, Error> {
    let link = fetch_owned_link(&storage, &current_user.id, &link_id).await?;

    links::delete_link(&storage, &link.id).await?;

    resolver.forget(&link.short_code).await;

    tracing::debug!("Deleted link `{}`", link.short_code);

    Ok(Success::<&'static str>::no_content())
}
