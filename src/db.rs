use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::engine::EngineRegistry;
use crate::flags::SqliteFlags;
use crate::resolver::EquipmentResolver;

pub type DbPool = SqlitePool;

/// Application state shared by every command
pub struct AppState {
  pub db: DbPool,
  pub flags: SqliteFlags,
  pub engines: EngineRegistry,
  pub resolver: Option<Arc<dyn EquipmentResolver>>,
  pub config: AppConfig,
}

impl AppState {
  pub fn new(
    db: DbPool,
    config: AppConfig,
    engines: EngineRegistry,
    resolver: Option<Arc<dyn EquipmentResolver>>,
  ) -> Self {
    Self {
      flags: SqliteFlags::new(db.clone()),
      db,
      engines,
      resolver,
      config,
    }
  }

  pub fn resolver(&self) -> Option<&dyn EquipmentResolver> {
    self.resolver.as_deref()
  }
}

/// Open the connection pool and run migrations
pub async fn initialize_db(database_url: &str) -> Result<DbPool, sqlx::Error> {
  tracing::info!(url = %database_url, "initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("database initialized");

  Ok(pool)
}
