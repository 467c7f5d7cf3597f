//! Test utilities shared by the unit tests
//!
//! - Database setup/teardown
//! - Mock inputs and app state
//! - Float assertions

use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::db::AppState;
use crate::engine::EngineRegistry;
use crate::resolver::{EquipmentResolver, HttpEquipmentResolver};
use crate::target::{
  ComputeTargetInput, EntryMode, EquipmentContext, Feel, LastPerformance, LoadType,
  ReadinessContext, TargetOptions,
};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed three climbing sessions for an exercise: 60, 62.5, 65 kg x 8,
/// the last one felt excellent
pub async fn seed_test_performances(pool: &SqlitePool, exercise_id: &str) -> Vec<i64> {
  let sessions = [
    (60.0, "too_little", 12),
    (62.5, "too_little", 14),
    (65.0, "excellent", 16),
  ];

  let mut ids = Vec::new();

  for (weight_kg, feel, day) in sessions {
    let result = sqlx::query(
      r#"
      INSERT INTO performance_log (exercise_id, weight_kg, reps, feel, performed_on)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(exercise_id)
    .bind(weight_kg)
    .bind(8_i64)
    .bind(feel)
    .bind(NaiveDate::from_ymd_opt(2026, 10, day).expect("valid date"))
    .execute(pool)
    .await
    .expect("Failed to seed performance");

    ids.push(result.last_insert_rowid());
  }

  ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Barbell lift, 30 kg x 8 last time, felt excellent, neutral readiness
pub fn mock_target_input(exercise_id: &str) -> ComputeTargetInput {
  ComputeTargetInput {
    last: LastPerformance {
      prev_weight_kg: Some(30.0),
      prev_reps: Some(8),
      prev_date: NaiveDate::from_ymd_opt(2026, 10, 16),
      prev_feel: Some(Feel::Excellent),
    },
    readiness: ReadinessContext {
      today_score: 50.0,
      last_score: None,
    },
    safety: None,
    equipment: EquipmentContext {
      exercise_id: exercise_id.to_string(),
      equipment_ref: None,
      gym_id: Some("home".to_string()),
      unit: None,
      load_type: LoadType::DualLoad,
      entry_mode: EntryMode::Total,
    },
    intent: None,
  }
}

/// App state over a test pool, optionally pointing at an HTTP resolver
pub fn mock_app_state(pool: SqlitePool, resolver_url: Option<&str>) -> AppState {
  let config = AppConfig {
    resolver_url: resolver_url.map(str::to_string),
    resolver_timeout: Duration::from_secs(2),
    ..AppConfig::default()
  };

  let resolver = resolver_url.map(|url| {
    let http = HttpEquipmentResolver::new(url, None, config.resolver_timeout)
      .expect("Failed to build test resolver");
    Arc::new(http) as Arc<dyn EquipmentResolver>
  });

  let engines = EngineRegistry::with_v3(
    TargetOptions {
      resolver_timeout: config.resolver_timeout,
    },
    &config.engine_flag,
  );

  AppState::new(pool, config, engines, resolver)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('performance_log', 'feature_flags', 'target_log')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 3, "Expected 3 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_performances_returns_ids() {
    let pool = setup_test_db().await;

    let ids = seed_test_performances(&pool, "bench").await;
    assert_eq!(ids.len(), 3);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM performance_log WHERE exercise_id = 'bench'")
      .fetch_one(&pool)
      .await
      .expect("Failed to count sets");

    assert_eq!(count, 3);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_input_is_barbell_with_history() {
    let input = mock_target_input("squat");
    assert_eq!(input.equipment.exercise_id, "squat");
    assert_eq!(input.equipment.load_type, LoadType::DualLoad);
    assert_eq!(input.last.history_weight(), Some(30.0));
  }
}
