use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use crate::error::Result;
use std::time::Duration;

/// Schema of the session table. Safe to run on every startup.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS deep_work_sessions (
    id          BIGSERIAL PRIMARY KEY,
    start       TIMESTAMPTZ NOT NULL,
    "end"       TIMESTAMPTZ,
    focused     BIGINT CHECK (focused >= 0),
    tag         TEXT NOT NULL CHECK (tag <> ''),
    description TEXT NOT NULL CHECK (description <> ''),
    CONSTRAINT deep_work_sessions_end_after_start
        CHECK ("end" IS NULL OR "end" >= start),
    CONSTRAINT deep_work_sessions_focused_within_span
        CHECK ("end" IS NULL OR focused IS NULL
               OR focused <= EXTRACT(EPOCH FROM ("end" - start)))
);
CREATE INDEX IF NOT EXISTS deep_work_sessions_start_idx
    ON deep_work_sessions (start DESC);
"#;

/// Creates a new database connection pool.
///
/// # Arguments
///
/// * `database_url` - The URL of the PostgreSQL database.
///
/// # Returns
///
/// A `Result` containing the `Pool`.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let mut cfg = Config::new();
    let pg_config: tokio_postgres::Config = database_url.parse()?;

    if let Some(tokio_postgres::config::Host::Tcp(hostname)) = pg_config.get_hosts().first() {
        cfg.host = Some(hostname.to_string());
    }

    if let Some(port) = pg_config.get_ports().first() {
        cfg.port = Some(*port);
    }

    if let Some(dbname) = pg_config.get_dbname() {
        cfg.dbname = Some(dbname.to_string());
    }

    if let Some(user) = pg_config.get_user() {
        cfg.user = Some(user.to_string());
    }

    if let Some(password) = pg_config.get_password() {
        cfg.password = Some(String::from_utf8_lossy(password).to_string());
    }

    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    cfg.pool = Some(PoolConfig {
        max_size: 16,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(Duration::from_secs(5)),
            create: Some(Duration::from_secs(2)),
            recycle: Some(Duration::from_secs(1)),
        },
        ..PoolConfig::default()
    });

    Ok(cfg.create_pool(Some(Runtime::Tokio1), NoTls)?)
}

/// Creates the session table and its index if they are missing.
pub async fn ensure_schema(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    tracing::info!("✅ Session schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_guards_timing_invariants() {
        assert!(SCHEMA.contains(r#"CHECK ("end" IS NULL OR "end" >= start)"#));
        assert!(SCHEMA.contains(r#"focused <= EXTRACT(EPOCH FROM ("end" - start))"#));
        assert!(SCHEMA.contains("CHECK (tag <> '')"));
    }
}
