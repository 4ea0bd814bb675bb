use anyhow::{Context, Result};
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

/// Which session store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL through a deadpool connection pool.
    Postgres,
    /// Process-local store, lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown session store '{}'", other)),
        }
    }
}

/// The application's configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: Option<String>,
    /// The session store backend.
    pub store: StoreBackend,
    /// The address the server binds to.
    pub bind_addr: SocketAddr,
    /// Directory served for every non-API path.
    pub static_dir: PathBuf,
    /// Origin allowed by CORS.
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            store: StoreBackend::Memory,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: PathBuf::from("public"),
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let store = match env::var("SESSION_STORE") {
            Ok(value) => value
                .parse::<StoreBackend>()
                .map_err(anyhow::Error::msg)
                .context("Invalid SESSION_STORE")?,
            Err(_) => StoreBackend::Postgres,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set (or use SESSION_STORE=memory)");
        }

        Ok(Self {
            database_url,
            store,
            bind_addr: match env::var("BIND_ADDR") {
                Ok(addr) => addr.parse().context("Invalid BIND_ADDR")?,
                Err(_) => defaults.bind_addr,
            },
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_backend_names() {
        assert_eq!("postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!(" Memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
