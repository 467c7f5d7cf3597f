pub mod commands;
pub mod config;
pub mod db;
pub mod engine;
pub mod flags;
pub mod history;
pub mod math;
pub mod models;
pub mod resolver;
pub mod target;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

pub use config::{AppConfig, ConfigError};
pub use db::AppState;
pub use engine::{compute_target_unified, EngineRegistry, TargetEngine};
pub use flags::{FeatureFlags, SqliteFlags, StaticFlags};
pub use resolver::{EquipmentResolver, HttpEquipmentResolver, ResolverError};
pub use target::{compute_target_v3, ComputeTargetInput, ComputeTargetResult, TargetOptions};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
  #[error("Configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("Failed to initialize database: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Failed to build equipment resolver: {0}")]
  Resolver(#[from] ResolverError),
}

/// Build the shared application state from the environment
pub async fn bootstrap() -> Result<AppState, BootstrapError> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  telemetry::init_tracing(&config.log_filter);

  let pool = db::initialize_db(&config.database_url).await?;

  let resolver = match &config.resolver_url {
    Some(url) => {
      let http = HttpEquipmentResolver::new(url, config.resolver_api_key.clone(), config.resolver_timeout)?;
      tracing::info!(endpoint = %http.endpoint(), "equipment resolver configured");
      Some(Arc::new(http) as Arc<dyn EquipmentResolver>)
    }
    None => {
      tracing::info!("no equipment resolver configured, targets stay unsnapped");
      None
    }
  };

  let engines = EngineRegistry::with_v3(
    TargetOptions {
      resolver_timeout: config.resolver_timeout,
    },
    &config.engine_flag,
  );
  tracing::info!(engines = ?engines.versions(), flag = %config.engine_flag, "target engines ready");

  Ok(AppState::new(pool, config, engines, resolver))
}
