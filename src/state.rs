use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::warn;

use crate::config::AppConfig;
use crate::store::{FleetStore, PostgresStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FleetStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Production wiring: config from the environment, Postgres behind the
    /// store port, migrations applied on boot.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self {
            store: Arc::new(PostgresStore::new(db)),
            config,
        })
    }

    /// Assembles a state from an already-built store and config; tests use
    /// this with [`crate::store::MemoryStore`].
    pub fn from_parts(store: Arc<dyn FleetStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }
}
