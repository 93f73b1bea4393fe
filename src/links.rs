//! Links
//!
//! A short code pointing to an original URL, owned by the user that created it

use chrono::DateTime;
use chrono::Utc;
use url::Url;
use uuid::Uuid;

use crate::error::Error;
use crate::error::Result;
use crate::slugs;
use crate::slugs::ShortCode;
use crate::storage;
use crate::storage::CreateLinkValues;
use crate::storage::Storage;
use crate::storage::UpdateLinkValues;

/// Attempts to find a free generated short code before giving up
pub const GENERATE_ATTEMPTS: usize = 5;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Link {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_url: String,
    pub short_code: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalize and validate a URL
///
/// Input without a scheme gets `https://` prepended. The returned string is the trimmed input,
/// not the re-serialized URL: `example.com` becomes `https://example.com`
pub fn normalize_url(input: &str) -> Result<String> {
    let input = input.trim();

    if input.is_empty() {
        return Err(Error::InvalidInput("URL can not be empty".to_string()));
    }

    let normalized = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };

    let url = Url::parse(&normalized)
        .map_err(|err| Error::InvalidInput(format!("Invalid URL: {err}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidInput(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidInput("URL needs a host".to_string()));
    }

    Ok(normalized)
}

/// Create a link for an owner
///
/// Without a custom short code one is generated; on a collision a new one is drawn, at most
/// [`GENERATE_ATTEMPTS`] times. A colliding custom code fails right away.
pub async fn create_link<S: Storage>(
    storage: &S,
    owner_id: &Uuid,
    original_url: &str,
    short_code: Option<&str>,
) -> Result<Link> {
    let original_url = normalize_url(original_url)?;

    if let Some(short_code) = short_code {
        let short_code = slugs::validate(short_code)?;

        return insert_link(storage, owner_id, &original_url, &short_code)
            .await
            .map_err(Error::from);
    }

    insert_generated_link(storage, owner_id, &original_url, slugs::generate).await
}

/// Insert a link under codes drawn from `generate` until one is free
async fn insert_generated_link<S, G>(
    storage: &S,
    owner_id: &Uuid,
    original_url: &str,
    mut generate: G,
) -> Result<Link>
where
    S: Storage,
    G: FnMut() -> ShortCode,
{
    let mut last_collision = String::new();

    for attempt in 1..=GENERATE_ATTEMPTS {
        let short_code = generate();

        match insert_link(storage, owner_id, original_url, &short_code).await {
            Err(storage::Error::DuplicateSlug(short_code)) => {
                tracing::debug!(
                    "Generated short code `{short_code}` is taken (attempt {attempt}/{GENERATE_ATTEMPTS})"
                );

                last_collision = short_code;
            }
            result => return result.map_err(Error::from),
        }
    }

    tracing::warn!("No free short code found after {GENERATE_ATTEMPTS} attempts");

    Err(Error::DuplicateSlug(last_collision))
}

/// Update the URL and/or short code of a link
///
/// Everything is validated before the storage is touched
pub async fn update_link<S: Storage>(
    storage: &S,
    link_id: &Uuid,
    original_url: Option<&str>,
    short_code: Option<&str>,
) -> Result<Link> {
    let original_url = original_url.map(normalize_url).transpose()?;
    let short_code = short_code.map(slugs::validate).transpose()?;

    let values = UpdateLinkValues {
        original_url: original_url.as_deref(),
        short_code: short_code.as_ref(),
    };

    Ok(storage.update_link(link_id, &values).await?)
}

/// Delete a link, its click events go with it
pub async fn delete_link<S: Storage>(storage: &S, link_id: &Uuid) -> Result<()> {
    Ok(storage.delete_link(link_id).await?)
}

async fn insert_link<S: Storage>(
    storage: &S,
    owner_id: &Uuid,
    original_url: &str,
    short_code: &ShortCode,
) -> storage::Result<Link> {
    let values = CreateLinkValues {
        owner_id,
        original_url,
        short_code,
    };

    storage.create_link(&values).await
}
