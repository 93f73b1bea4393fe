//! Resolving short codes
//!
//! Lookup of a short code, click accounting on a hit and an optional cache in front of the
//! storage

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use crate::clicks::ClickAccounting;
use crate::error::Error;
use crate::error::Result;
use crate::slugs;
use crate::storage::Hit;
use crate::storage::Storage;

/// Upper bound of cached short codes
const CACHE_CAPACITY: u64 = 10_000;

/// Where a short code points to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectTarget {
    /// The resolved link
    pub link_id: Uuid,

    /// The URL to redirect to
    pub original_url: String,
}

/// Resolver of short codes
#[derive(Clone)]
pub struct Resolver<S: Storage> {
    storage: S,
    accounting: ClickAccounting<S>,
    cache: Option<Cache<String, RedirectTarget>>,

    /// Bumped on every [`Resolver::forget`], lookups racing a forget are not cached
    forgotten: Arc<AtomicU64>,
}

impl<S: Storage> Resolver<S> {
    /// Create a resolver, caching lookups for `cache_ttl` when given
    pub fn new(storage: S, accounting: ClickAccounting<S>, cache_ttl: Option<Duration>) -> Self {
        let cache = cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build()
        });

        Self {
            storage,
            accounting,
            cache,
            forgotten: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Resolve a short code to its target
    ///
    /// A hit is counted exactly once. Accounting is best effort, its failures never reach the
    /// caller. A cached code whose link turns out to be gone is dropped and reported missing.
    pub async fn resolve(&self, short_code: &str, hit: Hit) -> Result<RedirectTarget> {
        if slugs::validate(short_code).is_err() {
            tracing::debug!("Short code `{short_code}` is not valid");

            return Err(Error::NotFound("Link"));
        }

        let target = self.lookup(short_code).await?;

        if !self
            .accounting
            .record_click_best_effort(target.link_id, hit)
            .await
        {
            // removed between lookup and accounting
            self.forget(short_code).await;

            return Err(Error::NotFound("Link"));
        }

        tracing::debug!(
            "Short code `{short_code}` resolves to {}",
            target.original_url
        );

        Ok(target)
    }

    /// Drop a short code from the cache
    ///
    /// Called when the link behind it is renamed, changed or deleted
    pub async fn forget(&self, short_code: &str) {
        if let Some(cache) = &self.cache {
            // bump first, a lookup inserting after this sees the change
            self.forgotten.fetch_add(1, Ordering::SeqCst);

            cache.invalidate(short_code).await;
        }
    }

    async fn lookup(&self, short_code: &str) -> Result<RedirectTarget> {
        if let Some(target) = self.cached(short_code).await {
            return Ok(target);
        }

        let generation = self.forgotten.load(Ordering::SeqCst);

        let link = self
            .storage
            .find_single_link_by_code(short_code)
            .await
            .map_err(|err| {
                tracing::error!("Lookup of short code `{short_code}` failed: {err}");

                Error::StoreUnavailable(err.to_string())
            })?
            .ok_or(Error::NotFound("Link"))?;

        let target = RedirectTarget {
            link_id: link.id,
            original_url: link.original_url,
        };

        if let Some(cache) = &self.cache {
            cache.insert(short_code.to_string(), target.clone()).await;

            // a forget ran while the storage was read, the entry may be stale
            if self.forgotten.load(Ordering::SeqCst) != generation {
                cache.invalidate(short_code).await;
            }
        }

        Ok(target)
    }

    async fn cached(&self, short_code: &str) -> Option<RedirectTarget> {
        match &self.cache {
            Some(cache) => cache.get(short_code).await,
            None => None,
        }
    }
}
