//! Row mapping for the `webhooks` table.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::domain::{GuildId, RoleIds, WebhookId, WebhookRegistration};
use crate::error::StoreError;

/// Column order shared by every `SELECT` on `webhooks`.
///
/// Text columns are cast: under `STRING` column affinity a lone role id in
/// `pings` is stored as an integer.
pub(crate) const COLUMNS: &str = "CAST(chain AS TEXT) AS chain, id, guild_id, \
     CAST(token AS TEXT) AS token, CAST(url AS TEXT) AS url, CAST(pings AS TEXT) AS pings";

/// Raw `webhooks` row: `(chain, id, guild_id, token, url, pings)`.
pub(crate) type WebhookRow = (String, i64, i64, String, String, Option<String>);

/// Converts a snowflake to its signed column form.
pub(crate) fn to_column(value: u64, what: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Corrupt(format!("{what} {value} out of range")))
}

fn from_column(value: i64, what: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {what} {value}")))
}

/// Converts a row into a registration.
pub(crate) fn into_registration(row: WebhookRow) -> Result<WebhookRegistration, StoreError> {
    let (chain, id, guild_id, token, url, pings) = row;
    Ok(WebhookRegistration {
        id: WebhookId::new(from_column(id, "webhook id")?),
        guild_id: GuildId::new(from_column(guild_id, "guild id")?),
        chain,
        token,
        url,
        role_ids: pings.as_deref().and_then(RoleIds::parse_column),
    })
}

/// Decodes one fetched row.
pub(crate) fn read_row(row: &SqliteRow) -> Result<WebhookRegistration, StoreError> {
    into_registration(<WebhookRow as FromRow<'_, SqliteRow>>::from_row(row)?)
}

/// Decodes every readable row. Unreadable rows are logged and skipped.
pub(crate) fn readable_rows(rows: &[SqliteRow]) -> Vec<WebhookRegistration> {
    rows.iter()
        .filter_map(|row| match read_row(row) {
            Ok(registration) => Some(registration),
            Err(e) => {
                let id = row.try_get::<i64, _>("id").ok();
                tracing::warn!(?id, error = %e, "skipping unreadable webhook row");
                None
            }
        })
        .collect()
}
