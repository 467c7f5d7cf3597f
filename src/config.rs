//! Runtime configuration, read from the environment (and `.env`)

use std::env;
use std::time::Duration;

use crate::engine::DEFAULT_ENGINE_FLAG;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://lift-coach.db?mode=rwc";
const DEFAULT_RESOLVER_TIMEOUT_MS: u64 = 1500;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {value}")]
  Invalid { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  pub resolver_url: Option<String>,
  pub resolver_api_key: Option<String>,
  pub resolver_timeout: Duration,
  pub engine_flag: String,
  pub log_filter: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      resolver_url: None,
      resolver_api_key: None,
      resolver_timeout: Duration::from_millis(DEFAULT_RESOLVER_TIMEOUT_MS),
      engine_flag: DEFAULT_ENGINE_FLAG.to_string(),
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let resolver_timeout = match non_empty("EQUIPMENT_RESOLVER_TIMEOUT_MS") {
      Some(raw) => {
        let ms: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
          name: "EQUIPMENT_RESOLVER_TIMEOUT_MS".into(),
          value: raw.clone(),
        })?;
        Duration::from_millis(ms)
      }
      None => defaults.resolver_timeout,
    };

    Ok(Self {
      database_url: non_empty("LIFT_COACH_DATABASE_URL").unwrap_or(defaults.database_url),
      resolver_url: non_empty("EQUIPMENT_RESOLVER_URL"),
      resolver_api_key: non_empty("EQUIPMENT_RESOLVER_API_KEY"),
      resolver_timeout,
      engine_flag: non_empty("TARGET_ENGINE_FLAG").unwrap_or(defaults.engine_flag),
      log_filter: non_empty("LIFT_COACH_LOG").unwrap_or(defaults.log_filter),
    })
  }
}

/// Unset and blank read the same
fn non_empty(name: &str) -> Option<String> {
  env::var(name)
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
