//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
#[cfg(test)]
use std::sync::atomic::AtomicBool;
#[cfg(test)]
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::clicks::ClickEvent;
use crate::links::Link;
use crate::users::User;

use super::CreateLinkValues;
use super::CreateUserValues;
use super::Error;
use super::Hit;
use super::Result;
use super::Storage;
use super::UpdateLinkValues;

/// Everything in storage, behind a single lock
///
/// One lock keeps the short code index and the links in step, every operation is atomic
#[derive(Debug, Default)]
struct State {
    /// All users in storage
    users: HashMap<Uuid, User>,

    /// All links in storage
    links: HashMap<Uuid, Link>,

    /// Unique index of short code to link ID
    short_codes: HashMap<String, Uuid>,

    /// Link IDs in insertion order
    insertion_order: Vec<Uuid>,

    /// All click events, in insertion order
    clicks: Vec<ClickEvent>,
}

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// The shared state
    state: Arc<Mutex<State>>,

    /// Pretend the click accounting is down
    #[cfg(test)]
    clicks_unavailable: Arc<AtomicBool>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `record_click` fail with a connection error
    #[cfg(test)]
    pub fn make_clicks_unavailable(&self) {
        self.clicks_unavailable.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check_clicks_available(&self) -> Result<()> {
        if self.clicks_unavailable.load(Ordering::SeqCst) {
            return Err(Error::Unavailable("click accounting is down".to_string()));
        }

        Ok(())
    }

    #[cfg(not(test))]
    #[allow(clippy::unused_self)]
    fn check_clicks_available(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Storage for Memory {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let mut state = self.state.lock().await;

        if state.users.values().any(|user| user.email == values.email) {
            return Err(Error::DuplicateUser(values.email.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            session_id: *values.session_id,
            email: values.email.to_string(),
            hashed_password: values.hashed_password.to_string(),
            created_at: Utc::now(),
        };

        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn change_session(&self, user: &User, session_id: &Uuid) -> Result<User> {
        let mut state = self.state.lock().await;

        let user = state.users.get_mut(&user.id).ok_or(Error::NotFound)?;
        user.session_id = *session_id;

        Ok(user.clone())
    }

    async fn create_link(&self, values: &CreateLinkValues<'_>) -> Result<Link> {
        let mut state = self.state.lock().await;

        let short_code = values.short_code.as_str();

        if state.short_codes.contains_key(short_code) {
            return Err(Error::DuplicateSlug(short_code.to_string()));
        }

        let now = Utc::now();
        let link = Link {
            id: Uuid::new_v4(),
            owner_id: *values.owner_id,
            original_url: values.original_url.to_string(),
            short_code: short_code.to_string(),
            click_count: 0,
            created_at: now,
            updated_at: now,
        };

        state.short_codes.insert(link.short_code.clone(), link.id);
        state.insertion_order.push(link.id);
        state.links.insert(link.id, link.clone());

        Ok(link)
    }

    async fn find_single_link_by_code(&self, short_code: &str) -> Result<Option<Link>> {
        let state = self.state.lock().await;

        Ok(state
            .short_codes
            .get(short_code)
            .and_then(|id| state.links.get(id))
            .cloned())
    }

    async fn find_single_link_by_id(&self, id: &Uuid) -> Result<Option<Link>> {
        Ok(self.state.lock().await.links.get(id).cloned())
    }

    async fn find_all_links_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Link>> {
        let state = self.state.lock().await;

        // newest insert first, the stable sort keeps that order for equal timestamps
        let mut links = state
            .insertion_order
            .iter()
            .rev()
            .filter_map(|id| state.links.get(id))
            .filter(|link| &link.owner_id == owner_id)
            .cloned()
            .collect::<Vec<Link>>();

        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(links)
    }

    async fn update_link(&self, id: &Uuid, values: &UpdateLinkValues<'_>) -> Result<Link> {
        let mut state = self.state.lock().await;

        let Some(current_code) = state.links.get(id).map(|link| link.short_code.clone()) else {
            return Err(Error::NotFound);
        };

        // all checks before the first write
        if let Some(short_code) = values.short_code {
            if let Some(other_id) = state.short_codes.get(short_code.as_str()) {
                if other_id != id {
                    return Err(Error::DuplicateSlug(short_code.to_string()));
                }
            }
        }

        if let Some(short_code) = values.short_code {
            state.short_codes.remove(&current_code);
            state.short_codes.insert(short_code.to_string(), *id);
        }

        let link = state.links.get_mut(id).ok_or(Error::NotFound)?;

        if let Some(original_url) = values.original_url {
            link.original_url = original_url.to_string();
        }

        if let Some(short_code) = values.short_code {
            link.short_code = short_code.to_string();
        }

        link.updated_at = Utc::now();

        Ok(link.clone())
    }

    async fn delete_link(&self, id: &Uuid) -> Result<()> {
        let mut state = self.state.lock().await;

        let link = state.links.remove(id).ok_or(Error::NotFound)?;

        state.short_codes.remove(&link.short_code);
        state.insertion_order.retain(|link_id| link_id != id);
        state.clicks.retain(|click| &click.link_id != id);

        Ok(())
    }

    async fn record_click(&self, link_id: &Uuid, hit: &Hit) -> Result<ClickEvent> {
        self.check_clicks_available()?;

        let mut state = self.state.lock().await;

        let link = state.links.get_mut(link_id).ok_or(Error::NotFound)?;
        link.click_count += 1;

        let click = ClickEvent {
            id: Uuid::new_v4(),
            link_id: *link_id,
            clicked_at: Utc::now(),
            user_agent: hit.user_agent.clone(),
        };

        state.clicks.push(click.clone());

        Ok(click)
    }

    async fn find_all_clicks_by_link_since(
        &self,
        link_id: &Uuid,
        since: &DateTime<Utc>,
    ) -> Result<Vec<ClickEvent>> {
        Ok(self
            .state
            .lock()
            .await
            .clicks
            .iter()
            .filter(|click| &click.link_id == link_id && &click.clicked_at >= since)
            .cloned()
            .collect())
    }
}
