use std::sync::Arc;
use crate::config::{Config, StoreBackend};
use crate::error::{AppError, Result};
use crate::repositories::{
    memory::MemorySessionStore,
    session::{PgSessionStore, SessionStore},
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Where sessions are persisted.
    pub store: Arc<dyn SessionStore>,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`, connecting to the configured store.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match config.store {
            StoreBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::Internal("DATABASE_URL is required for the postgres store".to_string())
                })?;
                let pool = crate::db::create_pool(url)?;
                crate::db::ensure_schema(&pool).await?;
                tracing::info!("✅ PostgreSQL pool initialized with deadpool-postgres");
                Arc::new(PgSessionStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("⚠️ Using the in-memory session store; data is lost on restart");
                Arc::new(MemorySessionStore::new())
            }
        };

        Ok(Self::with_store(store, config.clone()))
    }

    /// Builds the state around an existing store.
    pub fn with_store(store: Arc<dyn SessionStore>, config: Config) -> Self {
        AppState { store, config }
    }
}
