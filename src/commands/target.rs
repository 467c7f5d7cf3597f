//! Target commands: compute, compute from history, audit trail

use crate::db::AppState;
use crate::engine::compute_target_unified;
use crate::history::{load_last_performance, load_target_logs, save_target_log};
use crate::models::TargetLogEntry;
use crate::target::{
  ComputeTargetInput, ComputeTargetResult, EquipmentContext, IntentHints, ReadinessContext,
  SafetyPrefs,
};

const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Compute a target for a fully specified input and store it in the audit log
pub async fn compute_target(
  state: &AppState,
  input: ComputeTargetInput,
) -> Result<ComputeTargetResult, String> {
  let result =
    compute_target_unified(&input, &state.engines, &state.flags, state.resolver()).await;

  save_target_log(&state.db, &input.equipment.exercise_id, &result).await?;

  Ok(result)
}

/// Compute a target using the newest logged set as last performance
pub async fn compute_target_for_exercise(
  state: &AppState,
  equipment: EquipmentContext,
  readiness: ReadinessContext,
  safety: Option<SafetyPrefs>,
  intent: Option<IntentHints>,
) -> Result<ComputeTargetResult, String> {
  let last = load_last_performance(&state.db, &equipment.exercise_id).await?;

  compute_target(
    state,
    ComputeTargetInput {
      last,
      readiness,
      safety,
      equipment,
      intent,
    },
  )
  .await
}

pub async fn get_target_history(
  state: &AppState,
  exercise_id: String,
  limit: Option<i64>,
) -> Result<Vec<TargetLogEntry>, String> {
  let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 500);
  load_target_logs(&state.db, &exercise_id, limit).await
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
