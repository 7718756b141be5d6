pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use models::*;
pub use services::recommendation::RecommendationEngine;
pub use services::store::{InMemoryStore, InteractionStore, PostgresStore};

use anyhow::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let store = Arc::new(PostgresStore::connect(&config.database).await?);
        let engine = Arc::new(RecommendationEngine::new(
            store,
            config.recommendation.clone(),
        ));

        Ok(Self { config, engine })
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
