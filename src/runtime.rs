//! Runtime services and shared state for support-triage.

use tracing::instrument;

use crate::{
    base::{config::Config, types::Res},
    service::db::DbClient,
    triage::Engine,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the ticket store, and the triage engine.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The ticket store.
    pub db: DbClient,
    /// The triage engine.
    pub engine: Engine,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Initialize the engine, building the knowledge index.
        let engine = Engine::from_config(&config).await;

        Ok(Self { config, db, engine })
    }

    /// Assemble a runtime from already-built parts.
    pub fn from_parts(config: Config, db: DbClient, engine: Engine) -> Self {
        Self { config, db, engine }
    }
}
