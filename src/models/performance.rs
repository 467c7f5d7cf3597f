use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::target::{Feel, LastPerformance};

/// One logged working set
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PerformanceRecord {
  pub id: i64,
  pub exercise_id: String,
  pub weight_kg: Option<f64>,
  pub reps: Option<i64>,
  pub feel: Option<String>,
  pub performed_on: NaiveDate,
  pub created_at: Option<DateTime<Utc>>,
}

impl PerformanceRecord {
  /// View of this set as the engine's last-performance input
  pub fn to_last_performance(&self) -> LastPerformance {
    LastPerformance {
      prev_weight_kg: self.weight_kg,
      prev_reps: self.reps.and_then(|r| i32::try_from(r).ok()),
      prev_date: Some(self.performed_on),
      prev_feel: self.feel.as_deref().and_then(|f| f.parse::<Feel>().ok()),
    }
  }
}

/// For inserting new sets (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerformance {
  pub exercise_id: String,
  pub weight_kg: Option<f64>,
  pub reps: Option<i64>,
  pub feel: Option<Feel>,
  pub performed_on: NaiveDate,
}
