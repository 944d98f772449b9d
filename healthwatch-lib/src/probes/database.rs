//! Database connectivity probe.

use crate::config::{Config, DatabaseConfig};
use crate::models::ProbeResult;
use crate::probes::Probe;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;
use tracing::warn;

const NAME: &str = "database";

/// Executes a trivial `SELECT 1` against the configured PostgreSQL instance.
///
/// An entirely unconfigured database section disables the probe (`Skipped`);
/// a partially configured one fails it with the missing key named.
#[derive(Debug, Default)]
pub struct DatabaseProbe;

impl DatabaseProbe {
    pub fn new() -> Self {
        Self
    }
}

/// Build connect options, naming the first missing required key.
fn connect_options(db: &DatabaseConfig) -> Result<PgConnectOptions, &'static str> {
    let host = db.host.as_deref().ok_or("DB_HOST not configured")?;
    let user = db.user.as_deref().ok_or("DB_USER not configured")?;
    let password = db.password.as_deref().ok_or("DB_PASSWORD not configured")?;
    let name = db.name.as_deref().ok_or("DB_NAME not configured")?;

    Ok(PgConnectOptions::new()
        .host(host)
        .port(db.port)
        .username(user)
        .password(password)
        .database(name))
}

#[async_trait]
impl Probe for DatabaseProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, config: &Config) -> ProbeResult {
        let db = &config.database;
        if !db.is_configured() {
            warn!("database check skipped: no database configured");
            return ProbeResult::skipped(NAME, "no database configured");
        }

        let options = match connect_options(db) {
            Ok(options) => options,
            Err(missing) => return ProbeResult::fail(NAME, missing),
        };

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(db.connect_timeout_secs))
            .connect_lazy_with(options);

        let result = match sqlx::query("SELECT 1").fetch_one(&pool).await {
            Ok(_) => ProbeResult::ok(NAME, "SELECT 1 succeeded"),
            Err(err) => ProbeResult::fail(NAME, format!("connection check failed: {err}")),
        };
        pool.close().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProbeOutcome;

    fn db_config(
        host: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
        name: Option<&str>,
    ) -> Config {
        let mut config = Config::default();
        config.database.host = host.map(str::to_owned);
        config.database.user = user.map(str::to_owned);
        config.database.password = password.map(str::to_owned);
        config.database.name = name.map(str::to_owned);
        config.database.connect_timeout_secs = 1;
        config
    }

    #[tokio::test]
    async fn unconfigured_database_is_skipped() {
        let config = db_config(None, None, None, None);
        let result = DatabaseProbe::new().run(&config).await;
        assert_eq!(result.outcome, ProbeOutcome::Skipped);
        assert!(result.detail.contains("no database configured"));
    }

    #[tokio::test]
    async fn partially_configured_database_fails_with_missing_key() {
        let config = db_config(Some("127.0.0.1"), None, Some("pw"), Some("app"));
        let result = DatabaseProbe::new().run(&config).await;
        assert_eq!(result.outcome, ProbeOutcome::Fail);
        assert!(result.detail.contains("DB_USER"));
    }

    #[tokio::test]
    async fn unreachable_database_fails() {
        // port 9 (discard) is not a PostgreSQL listener; loopback refuses fast
        let mut config = db_config(Some("127.0.0.1"), Some("u"), Some("p"), Some("db"));
        config.database.port = 9;
        let result = DatabaseProbe::new().run(&config).await;
        assert_eq!(result.outcome, ProbeOutcome::Fail);
        assert!(result.detail.contains("connection check failed"));
    }

    #[test]
    fn missing_keys_are_reported_in_declaration_order() {
        let db = DatabaseConfig {
            host: None,
            user: Some("u".to_owned()),
            ..DatabaseConfig::default()
        };
        assert_eq!(connect_options(&db).unwrap_err(), "DB_HOST not configured");
    }
}
