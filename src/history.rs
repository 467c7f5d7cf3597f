//! Performance history and target audit log
//!
//! The most recent logged set per exercise is what the target engine sees
//! as `LastPerformance`. Every computed target can be stored with its full
//! debug bundle for later inspection.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{NewPerformance, PerformanceRecord, TargetLogEntry};
use crate::target::{ComputeTargetResult, LastPerformance};

/// ---------------------------------------------------------------------------
/// Performance Log
/// ---------------------------------------------------------------------------

/// Record a working set, returning its row id
pub async fn record_performance(pool: &SqlitePool, set: &NewPerformance) -> Result<i64, String> {
    let feel = set.feel.map(|f| f.to_string());

    let result = sqlx::query(
        r#"
        INSERT INTO performance_log (exercise_id, weight_kg, reps, feel, performed_on)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&set.exercise_id)
    .bind(set.weight_kg)
    .bind(set.reps)
    .bind(feel)
    .bind(set.performed_on)
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to record performance: {}", e))?;

    Ok(result.last_insert_rowid())
}

/// Most recent set for an exercise, if any
pub async fn load_latest_record(
    pool: &SqlitePool,
    exercise_id: &str,
) -> Result<Option<PerformanceRecord>, String> {
    sqlx::query_as::<_, PerformanceRecord>(
        r#"
        SELECT id, exercise_id, weight_kg, reps, feel, performed_on, created_at
        FROM performance_log
        WHERE exercise_id = ?1
        ORDER BY performed_on DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(exercise_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| format!("Failed to load performance: {}", e))
}

/// Last performance for an exercise; empty (new lifter) when nothing is logged
pub async fn load_last_performance(
    pool: &SqlitePool,
    exercise_id: &str,
) -> Result<LastPerformance, String> {
    Ok(load_latest_record(pool, exercise_id)
        .await?
        .map(|record| record.to_last_performance())
        .unwrap_or_default())
}

/// ---------------------------------------------------------------------------
/// Target Log
/// ---------------------------------------------------------------------------

pub async fn save_target_log(
    pool: &SqlitePool,
    exercise_id: &str,
    result: &ComputeTargetResult,
) -> Result<i64, String> {
    let result_json = serde_json::to_string(result)
        .map_err(|e| format!("Failed to serialize target: {}", e))?;

    let row = sqlx::query(
        r#"
        INSERT INTO target_log (exercise_id, total_weight_kg, reps, notes, result_json, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(exercise_id)
    .bind(result.target.total_weight_kg)
    .bind(result.target.reps)
    .bind(&result.target.notes)
    .bind(&result_json)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to save target log: {}", e))?;

    Ok(row.last_insert_rowid())
}

/// Newest first
pub async fn load_target_logs(
    pool: &SqlitePool,
    exercise_id: &str,
    limit: i64,
) -> Result<Vec<TargetLogEntry>, String> {
    sqlx::query_as::<_, TargetLogEntry>(
        r#"
        SELECT id, exercise_id, total_weight_kg, reps, notes, result_json, created_at
        FROM target_log
        WHERE exercise_id = ?1
        ORDER BY created_at DESC, id DESC
        LIMIT ?2
        "#,
    )
    .bind(exercise_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| format!("Failed to load target log: {}", e))
}

impl TargetLogEntry {
    pub fn result(&self) -> Result<ComputeTargetResult, String> {
        serde_json::from_str(&self.result_json)
            .map_err(|e| format!("Failed to parse stored target: {}", e))
    }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
