//! SQLite implementation of the subscription store.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::models::{COLUMNS, read_row, readable_rows, to_column};
use crate::domain::{GuildId, WebhookId, WebhookRegistration};
use crate::error::StoreError;

/// Webhook registrations keyed by webhook id, backed by `sqlx::SqlitePool`.
///
/// Each call runs a single statement on a pooled connection; nothing is
/// cached between calls, so every dispatch sees the current table.
#[derive(Debug, Clone)]
pub struct SubscriptionStore {
    pool: SqlitePool,
}

impl SubscriptionStore {
    /// Wraps an existing pool. The schema must already be migrated.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `url` and applies the
    /// embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the database cannot be opened
    /// or [`StoreError::Migrate`] if the schema cannot be applied.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Opens a private in-memory database, used by tests and dry runs.
    ///
    /// # Errors
    ///
    /// Same as [`SubscriptionStore::connect`].
    pub async fn in_memory() -> Result<Self, StoreError> {
        // one connection that never recycles: each new in-memory
        // connection would see an empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }

    /// Stores a new registration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the webhook id is already
    /// registered, or [`StoreError::Database`] on any other failure.
    pub async fn insert(&self, registration: &WebhookRegistration) -> Result<(), StoreError> {
        let id = to_column(registration.id.get(), "webhook id")?;
        let guild_id = to_column(registration.guild_id.get(), "guild id")?;
        let pings = registration.role_ids.as_ref().map(|roles| roles.to_column());

        let result = sqlx::query(
            "INSERT INTO webhooks (chain, id, guild_id, token, url, pings) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&registration.chain)
        .bind(id)
        .bind(guild_id)
        .bind(&registration.token)
        .bind(&registration.url)
        .bind(pings)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(
                    webhook = %registration.id,
                    chain = %registration.chain,
                    guild = %registration.guild_id,
                    "webhook registered"
                );
                Ok(())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(registration.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All readable registrations for the chain named `chain`, ordered by
    /// id. Rows that cannot be decoded are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    pub async fn for_chain(&self, chain: &str) -> Result<Vec<WebhookRegistration>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM webhooks WHERE chain = ? ORDER BY id"
        ))
        .bind(chain)
        .fetch_all(&self.pool)
        .await?;
        Ok(readable_rows(&rows))
    }

    /// All readable registrations owned by `guild`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    pub async fn for_guild(&self, guild: GuildId) -> Result<Vec<WebhookRegistration>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM webhooks WHERE guild_id = ? ORDER BY id"
        ))
        .bind(to_column(guild.get(), "guild id")?)
        .fetch_all(&self.pool)
        .await?;
        Ok(readable_rows(&rows))
    }

    /// Looks a registration up by webhook id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure or an unreadable row.
    pub async fn get(&self, id: WebhookId) -> Result<Option<WebhookRegistration>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM webhooks WHERE id = ?"))
            .bind(to_column(id.get(), "webhook id")?)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(read_row).transpose()
    }

    /// Number of registrations for the chain named `chain`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on database failure.
    pub async fn count_for_chain(&self, chain: &str) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM webhooks WHERE chain = ?")
            .bind(chain)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Removes the registration with `id`. Returns `true` if a row was
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on database failure.
    pub async fn delete(&self, id: WebhookId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = ?")
            .bind(to_column(id.get(), "webhook id")?)
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected() > 0;
        if removed {
            tracing::info!(webhook = %id, "webhook unregistered");
        }
        Ok(removed)
    }

    /// Closes the pool; later calls fail with [`StoreError::Database`].
    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
