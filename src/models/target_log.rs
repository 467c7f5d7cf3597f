use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored target computation, full result kept as JSON
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TargetLogEntry {
  pub id: i64,
  pub exercise_id: String,
  pub total_weight_kg: f64,
  pub reps: i64,
  pub notes: Option<String>,
  pub result_json: String,
  pub created_at: DateTime<Utc>,
}
