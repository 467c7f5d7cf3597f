pub mod flags;
pub mod target;

use crate::db::AppState;
use crate::history::{load_last_performance, record_performance};
use crate::models::NewPerformance;
use crate::target::LastPerformance;

/// Log a completed working set
pub async fn record_set(state: &AppState, set: NewPerformance) -> Result<i64, String> {
  let id = record_performance(&state.db, &set).await?;
  tracing::info!(exercise_id = %set.exercise_id, id, "set recorded");
  Ok(id)
}

pub async fn get_last_performance(
  state: &AppState,
  exercise_id: String,
) -> Result<LastPerformance, String> {
  load_last_performance(&state.db, &exercise_id).await
}
