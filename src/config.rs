//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                      | Default                        |
//! |-------------------------------|--------------------------------|
//! | `LISTEN_ADDR`                 | `0.0.0.0:3000`                 |
//! | `DATABASE_URL`                | `sqlite://webhooks.db`         |
//! | `DATABASE_MAX_CONNECTIONS`    | `5`                            |
//! | `CHAINS_FILE`                 | built-in Polkadot and Kusama   |
//! | `DISCORD_TOKEN`               | unset (no role mentions)       |
//! | `DISCORD_API_BASE`            | `https://discord.com/api/v10`  |
//! | `DISCORD_TIMEOUT_SECS`        | `15`                           |
//! | `RPC_PROBE_TIMEOUT_SECS`      | `30`                           |
//! | `RECONNECT_INITIAL_DELAY_MS`  | `500`                          |
//! | `RECONNECT_MAX_DELAY_SECS`    | `60`                           |
//! | `LOG_FORMAT`                  | `text` (`json` for JSON lines) |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::watcher::ReconnectPolicy;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`NotifierConfig::from_env`].
#[derive(Clone)]
pub struct NotifierConfig {
    /// Socket address to bind the admin API to.
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// JSON chain list; the built-in chains are used when unset.
    pub chains_file: Option<PathBuf>,

    /// Bot token for role lookups.
    pub discord_token: Option<String>,

    /// Root of the Discord REST API.
    pub discord_api_base: String,

    /// Timeout for each Discord request.
    pub discord_timeout: Duration,

    /// Chain watcher reconnect timing.
    pub reconnect: ReconnectPolicy,

    /// Log output format.
    pub log_format: LogFormat,
}

impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("listen_addr", &self.listen_addr)
            .field("database_url", &self.database_url)
            .field("database_max_connections", &self.database_max_connections)
            .field("chains_file", &self.chains_file)
            .field("discord_token", &self.discord_token.as_ref().map(|_| "<redacted>"))
            .field("discord_api_base", &self.discord_api_base)
            .field("discord_timeout", &self.discord_timeout)
            .field("reconnect", &self.reconnect)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl NotifierConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `LISTEN_ADDR` is set but
    /// cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`NotifierConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let listen_addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "LISTEN_ADDR",
                value: raw_addr.clone(),
            })?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://webhooks.db".to_string());
        let database_max_connections = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 5);

        let chains_file = non_empty(lookup("CHAINS_FILE")).map(PathBuf::from);
        let discord_token = non_empty(lookup("DISCORD_TOKEN"));
        let discord_api_base = non_empty(lookup("DISCORD_API_BASE"))
            .unwrap_or_else(|| "https://discord.com/api/v10".to_string());
        let discord_timeout = Duration::from_secs(parse_var(&lookup, "DISCORD_TIMEOUT_SECS", 15));

        // delays are at least 1ms and max_delay never undercuts initial_delay
        let initial_delay =
            Duration::from_millis(parse_var::<u64>(&lookup, "RECONNECT_INITIAL_DELAY_MS", 500).max(1));
        let max_delay =
            Duration::from_secs(parse_var(&lookup, "RECONNECT_MAX_DELAY_SECS", 60)).max(initial_delay);
        let reconnect = ReconnectPolicy {
            initial_delay,
            max_delay,
            probe_timeout: Duration::from_secs(parse_var(&lookup, "RPC_PROBE_TIMEOUT_SECS", 30)),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections,
            chains_file,
            discord_token,
            discord_api_base,
            discord_timeout,
            reconnect,
            log_format,
        })
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<NotifierConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        NotifierConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let Ok(config) = config(&[]) else {
            panic!("defaults rejected");
        };
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.database_url, "sqlite://webhooks.db");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.chains_file, None);
        assert_eq!(config.discord_token, None);
        assert_eq!(config.reconnect, ReconnectPolicy::default());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let Ok(config) = config(&[
            ("LISTEN_ADDR", "127.0.0.1:8080"),
            ("CHAINS_FILE", "/etc/chains.json"),
            ("DISCORD_TOKEN", "abc"),
            ("RECONNECT_MAX_DELAY_SECS", "5"),
            ("LOG_FORMAT", "JSON"),
        ]) else {
            panic!("valid config rejected");
        };
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.chains_file, Some(PathBuf::from("/etc/chains.json")));
        assert_eq!(config.discord_token.as_deref(), Some("abc"));
        assert_eq!(config.reconnect.max_delay, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let Ok(config) = config(&[("DATABASE_MAX_CONNECTIONS", "many")]) else {
            panic!("config rejected");
        };
        assert_eq!(config.database_max_connections, 5);
    }

    #[test]
    fn zero_reconnect_delays_are_clamped() {
        let Ok(config) = config(&[
            ("RECONNECT_INITIAL_DELAY_MS", "0"),
            ("RECONNECT_MAX_DELAY_SECS", "0"),
        ]) else {
            panic!("config rejected");
        };
        assert_eq!(config.reconnect.initial_delay, Duration::from_millis(1));
        assert_eq!(config.reconnect.max_delay, Duration::from_millis(1));
    }

    #[test]
    fn max_delay_never_undercuts_initial_delay() {
        let Ok(config) = config(&[
            ("RECONNECT_INITIAL_DELAY_MS", "3000"),
            ("RECONNECT_MAX_DELAY_SECS", "1"),
        ]) else {
            panic!("config rejected");
        };
        assert_eq!(config.reconnect.max_delay, Duration::from_secs(3));
    }

    #[test]
    fn invalid_listen_addr_is_an_error() {
        let result = config(&[("LISTEN_ADDR", "not-an-address")]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "LISTEN_ADDR", .. })
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let Ok(config) = config(&[("DISCORD_TOKEN", "very-secret")]) else {
            panic!("config rejected");
        };
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
