use std::time::Duration;

use anyhow::{ensure, Context, Result};
use chrono::FixedOffset;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    /// Upper bound on every individual store call.
    pub store_timeout: Duration,
    /// History window used when the caller does not ask for one.
    pub history_limit: u32,
    /// Largest history window a caller may request.
    pub history_max_limit: u32,
    /// Size of the newest-first `/api/readings` listing.
    pub recent_limit: u32,
    /// Offset applied when formatting timestamps for display.
    pub display_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            database_url: required("DATABASE_URL")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "3000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            store_timeout: Duration::from_secs(
                optional("STORE_TIMEOUT_SECS", "5")
                    .parse()
                    .context("STORE_TIMEOUT_SECS must be a positive integer")?,
            ),
            history_limit: optional("HISTORY_LIMIT", "200")
                .parse()
                .context("HISTORY_LIMIT must be a non-negative integer")?,
            history_max_limit: optional("HISTORY_MAX_LIMIT", "5000")
                .parse()
                .context("HISTORY_MAX_LIMIT must be a non-negative integer")?,
            recent_limit: optional("RECENT_LIMIT", "100")
                .parse()
                .context("RECENT_LIMIT must be a non-negative integer")?,
            display_offset: parse_offset(&optional("DISPLAY_UTC_OFFSET_MINUTES", "0"))?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.history_limit <= self.history_max_limit,
            "HISTORY_LIMIT ({}) must not exceed HISTORY_MAX_LIMIT ({})",
            self.history_limit,
            self.history_max_limit
        );
        ensure!(self.db_max_connections > 0, "DB_MAX_CONNECTIONS must be at least 1");
        ensure!(!self.store_timeout.is_zero(), "STORE_TIMEOUT_SECS must be at least 1");
        Ok(())
    }
}

/// Parse a signed minute offset such as `"-300"` or `"120"`.
fn parse_offset(raw: &str) -> Result<FixedOffset> {
    let minutes: i32 = raw
        .trim()
        .parse()
        .with_context(|| format!("DISPLAY_UTC_OFFSET_MINUTES must be an integer, got: {raw:?}"))?;
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("DISPLAY_UTC_OFFSET_MINUTES out of range: {minutes}"))
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            database_url: "postgres://localhost/fridge".into(),
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            db_max_connections: 10,
            store_timeout: Duration::from_secs(5),
            history_limit: 200,
            history_max_limit: 5000,
            recent_limit: 100,
            display_offset: FixedOffset::east_opt(0).unwrap(),
        }
    }

    #[test]
    fn parse_offset_accepts_signed_minutes() {
        assert_eq!(parse_offset("0").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_offset("120").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_offset(" -300 ").unwrap().local_minus_utc(), -18000);
    }

    #[test]
    fn parse_offset_rejects_garbage() {
        let err = parse_offset("two hours").unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[test]
    fn parse_offset_rejects_a_full_day() {
        let err = parse_offset("1440").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn default_limits_are_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn history_limit_above_max_is_rejected() {
        let config = Config {
            history_limit: 10,
            history_max_limit: 5,
            ..sample()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("HISTORY_LIMIT"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = Config {
            store_timeout: Duration::ZERO,
            ..sample()
        };
        assert!(config.validate().is_err());
    }
}
