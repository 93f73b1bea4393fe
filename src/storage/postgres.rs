//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
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

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage from a connection string
    ///
    /// Migrations will be run
    pub async fn connect(database_connection_string: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_connection_string)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Unavailable(format!("Migrations could not run: {err}")))?;

        Ok(Self { connection_pool })
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE email = $1
            LIMIT 1
            ",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, session_id, email, hashed_password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.session_id)
        .bind(values.email)
        .bind(values.hashed_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| {
            write_error(err, || Error::DuplicateUser(values.email.to_string()))
        })?;

        Ok(user)
    }

    async fn change_session(&self, user: &User, session_id: &Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET session_id = $1
            WHERE id = $2
            RETURNING *
            ",
        )
        .bind(session_id)
        .bind(user.id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        user.ok_or(Error::NotFound)
    }

    async fn create_link(&self, values: &CreateLinkValues<'_>) -> Result<Link> {
        let link = sqlx::query_as::<_, Link>(
            r"
            INSERT INTO links (id, owner_id, original_url, short_code)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.owner_id)
        .bind(values.original_url)
        .bind(values.short_code.as_str())
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| {
            write_error(err, || Error::DuplicateSlug(values.short_code.to_string()))
        })?;

        Ok(link)
    }

    async fn find_single_link_by_code(&self, short_code: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(
            r"
            SELECT *
            FROM links
            WHERE short_code = $1
            LIMIT 1
            ",
        )
        .bind(short_code)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(link)
    }

    async fn find_single_link_by_id(&self, id: &Uuid) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(
            r"
            SELECT *
            FROM links
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(link)
    }

    async fn find_all_links_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Link>> {
        let links = sqlx::query_as::<_, Link>(
            r"
            SELECT *
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(owner_id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(links)
    }

    async fn update_link(&self, id: &Uuid, values: &UpdateLinkValues<'_>) -> Result<Link> {
        // a single statement, the unique index rejects a colliding code as a whole
        let link = sqlx::query_as::<_, Link>(
            r"
            UPDATE links
            SET original_url = COALESCE($2, original_url),
                short_code = COALESCE($3, short_code),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(values.original_url)
        .bind(values.short_code.map(|short_code| short_code.as_str()))
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(|err| {
            write_error(err, || {
                Error::DuplicateSlug(
                    values
                        .short_code
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                )
            })
        })?;

        link.ok_or(Error::NotFound)
    }

    async fn delete_link(&self, id: &Uuid) -> Result<()> {
        // click events go through `ON DELETE CASCADE`
        let result = sqlx::query(
            r"
            DELETE FROM links
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    async fn record_click(&self, link_id: &Uuid, hit: &Hit) -> Result<ClickEvent> {
        // increment and insert in one statement, no event without its increment
        let click = sqlx::query_as::<_, ClickEvent>(
            r"
            WITH incremented AS (
                UPDATE links
                SET click_count = click_count + 1
                WHERE id = $2
                RETURNING id
            )
            INSERT INTO click_events (id, link_id, ip_address, user_agent)
            SELECT $1, incremented.id, $3, $4
            FROM incremented
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(link_id)
        .bind(hit.ip_address.map(|ip_address| ip_address.to_string()))
        .bind(hit.user_agent.as_deref())
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        click.ok_or(Error::NotFound)
    }

    async fn find_all_clicks_by_link_since(
        &self,
        link_id: &Uuid,
        since: &DateTime<Utc>,
    ) -> Result<Vec<ClickEvent>> {
        let clicks = sqlx::query_as::<_, ClickEvent>(
            r"
            SELECT *
            FROM click_events
            WHERE link_id = $1 AND clicked_at >= $2
            ORDER BY clicked_at
            ",
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(clicks)
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Unavailable(err.to_string())
}

/// Convert `SQLx` error of a write, unique violations become the given conflict
fn write_error<F>(err: sqlx::Error, conflict: F) -> Error
where
    F: FnOnce() -> Error,
{
    if let sqlx::Error::Database(database_error) = &err {
        if database_error.is_unique_violation() {
            return conflict();
        }
    }

    connection_error(err)
}
