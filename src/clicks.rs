//! Click accounting
//!
//! Every successful resolution appends a click event and bumps the counter of the link. The
//! storage does both in one atomic operation.

use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::storage;
use crate::storage::Hit;
use crate::storage::Storage;

/// A recorded resolution of a link
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ClickEvent {
    pub id: Uuid,
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
}

/// How best-effort clicks are dispatched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Await the storage before answering, failures are only logged
    Inline,

    /// Spawn the storage write, tracked to be drained on shutdown
    Background,
}

impl FromStr for Dispatch {
    type Err = String;

    fn from_str(value: &str) -> core::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "background" => Ok(Self::Background),
            other => Err(format!(
                "Unknown click accounting `{other}`, expected `inline` or `background`"
            )),
        }
    }
}

/// Click accounting service
#[derive(Clone)]
pub struct ClickAccounting<S: Storage> {
    /// Storage holding the counters and events
    storage: S,

    /// Dispatch used by [`ClickAccounting::record_click_best_effort`]
    dispatch: Dispatch,

    /// Tracker of spawned background writes
    tasks: TaskTracker,
}

impl<S: Storage> ClickAccounting<S> {
    pub fn new(storage: S, dispatch: Dispatch, tasks: TaskTracker) -> Self {
        Self {
            storage,
            dispatch,
            tasks,
        }
    }

    /// Record a click without letting a failure reach the caller
    ///
    /// Failures are reported to the log. Returns `false` only when the link turned out to be
    /// gone, which is only known for inline dispatch.
    pub async fn record_click_best_effort(&self, link_id: Uuid, hit: Hit) -> bool {
        match self.dispatch {
            Dispatch::Inline => {
                let result = self.storage.record_click(&link_id, &hit).await;

                report(&link_id, result)
            }
            Dispatch::Background => {
                let storage = self.storage.clone();

                self.tasks.spawn(async move {
                    let result = storage.record_click(&link_id, &hit).await;

                    report(&link_id, result);
                });

                true
            }
        }
    }
}

/// Report the outcome of a best-effort click to the log
fn report(link_id: &Uuid, result: storage::Result<ClickEvent>) -> bool {
    match result {
        Ok(click) => {
            tracing::trace!("Recorded click {} on link {link_id}", click.id);

            true
        }
        Err(storage::Error::NotFound) => {
            tracing::warn!("Click not recorded, link {link_id} no longer exists");

            false
        }
        Err(err) => {
            tracing::error!("Click not recorded for link {link_id}: {err}");

            true
        }
    }
}
