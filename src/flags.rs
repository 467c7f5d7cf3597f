//! Feature flag lookup used to pick the target engine version

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Flag store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for FlagError {
    fn from(e: sqlx::Error) -> Self {
        FlagError::Database(e.to_string())
    }
}

/// Boolean flag lookup. Unknown flags read as off.
#[async_trait]
pub trait FeatureFlags: Send + Sync {
    async fn get_flag(&self, name: &str) -> Result<bool, FlagError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeatureFlag {
    pub name: String,
    pub enabled: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// ---------------------------------------------------------------------------
/// SQLite-backed flags
/// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SqliteFlags {
    pool: SqlitePool,
}

impl SqliteFlags {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn set_flag(&self, name: &str, enabled: bool) -> Result<(), FlagError> {
        sqlx::query(
            r#"
            INSERT INTO feature_flags (name, enabled, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET
                enabled = excluded.enabled,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(name)
        .bind(enabled)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::info!(flag = name, enabled, "feature flag updated");
        Ok(())
    }

    pub async fn list_flags(&self) -> Result<Vec<FeatureFlag>, FlagError> {
        let flags = sqlx::query_as::<_, FeatureFlag>(
            "SELECT name, enabled, updated_at FROM feature_flags ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(flags)
    }
}

#[async_trait]
impl FeatureFlags for SqliteFlags {
    async fn get_flag(&self, name: &str) -> Result<bool, FlagError> {
        let enabled: Option<bool> =
            sqlx::query_scalar("SELECT enabled FROM feature_flags WHERE name = ?1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(enabled.unwrap_or(false))
    }
}

/// ---------------------------------------------------------------------------
/// In-memory flags
/// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StaticFlags {
    flags: RwLock<HashMap<String, bool>>,
}

impl StaticFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(self, name: &str, enabled: bool) -> Self {
        self.set(name, enabled);
        self
    }

    pub fn set(&self, name: &str, enabled: bool) {
        // A poisoned lock still holds a usable map
        let mut flags = self.flags.write().unwrap_or_else(|e| e.into_inner());
        flags.insert(name.to_string(), enabled);
    }
}

#[async_trait]
impl FeatureFlags for StaticFlags {
    async fn get_flag(&self, name: &str) -> Result<bool, FlagError> {
        let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
        Ok(flags.get(name).copied().unwrap_or(false))
    }
}
