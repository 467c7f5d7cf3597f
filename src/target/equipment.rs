//! Stage 4: hand the safety-clamped weight to the equipment resolver.
//!
//! This is the only stage that awaits. Every resolver outcome other than a
//! valid snap leaves the weight untouched; the stage itself cannot fail.

use std::time::Duration;

use super::types::{ComputeTargetInput, EquipmentWorking, LoadType, ResolverStatus, Working};
use super::DecisionLog;
use crate::resolver::{EquipmentResolver, ResolveRequest, ResolveResult};

/// A snap smaller than this is not worth a note to the lifter
const NOTE_THRESHOLD_KG: f64 = 0.05;

pub async fn equipment_resolve(
    input: &ComputeTargetInput,
    prev: &Working,
    resolver: Option<&dyn EquipmentResolver>,
    timeout: Duration,
    log: &mut DecisionLog,
) -> EquipmentWorking {
    let desired_kg = prev.weight_kg;

    let outcome = match resolver {
        Some(resolver) => {
            let request = ResolveRequest {
                exercise_id: input.equipment.exercise_id.clone(),
                desired_kg,
                gym_id: input.equipment.gym_id.clone(),
            };
            call_resolver(resolver, &request, timeout).await
        }
        None => Outcome::Fallback(ResolverStatus::Unavailable, "no resolver configured".to_string()),
    };

    let mut working = EquipmentWorking {
        weight_kg: desired_kg,
        reps: prev.reps,
        reason: String::new(),
        desired_kg,
        per_side_kg: None,
        residual_kg: None,
        implement: None,
        bar_weight_kg: None,
        per_side_plates: Vec::new(),
        resolver_status: ResolverStatus::Unavailable,
    };

    match outcome {
        Outcome::Snapped(result) => {
            log.push(format!(
                "equipment: snapped {:.2}kg -> {:.2}kg on {}",
                desired_kg, result.total_kg, result.implement
            ));
            working.weight_kg = result.total_kg;
            working.residual_kg = Some(result.residual_kg.unwrap_or(desired_kg - result.total_kg));
            working.reason = format!("Snapped to {:.1}kg on {}", result.total_kg, result.implement);
            if let Some(details) = result.details {
                working.bar_weight_kg = details.bar_weight_kg;
                working.per_side_plates = details.per_side_plates;
            }
            working.implement = Some(result.implement);
            working.resolver_status = ResolverStatus::Snapped;
        }
        Outcome::Fallback(status, why) => {
            log.push(format!(
                "equipment: {} ({}), kept {:.2}kg unsnapped",
                status, why, desired_kg
            ));
            working.reason = format!("No equipment snapping ({}), using {:.1}kg", status, desired_kg);
            working.resolver_status = status;
        }
    }

    if input.equipment.load_type == LoadType::DualLoad {
        working.per_side_kg = Some(working.weight_kg / 2.0);
    }

    working
}

/// Note for the lifter when a snap moved the weight noticeably
pub fn snap_note(working: &EquipmentWorking) -> Option<String> {
    if working.snapped() && (working.weight_kg - working.desired_kg).abs() >= NOTE_THRESHOLD_KG {
        Some(format!("snapped from {:.1}kg", working.desired_kg))
    } else {
        None
    }
}

enum Outcome {
    Snapped(ResolveResult),
    Fallback(ResolverStatus, String),
}

async fn call_resolver(
    resolver: &dyn EquipmentResolver,
    request: &ResolveRequest,
    timeout: Duration,
) -> Outcome {
    match tokio::time::timeout(timeout, resolver.resolve(request)).await {
        Err(_) => {
            tracing::warn!(
                exercise_id = %request.exercise_id,
                timeout_ms = timeout.as_millis() as u64,
                "equipment resolver timed out"
            );
            Outcome::Fallback(
                ResolverStatus::Timeout,
                format!("no answer within {}ms", timeout.as_millis()),
            )
        }
        Ok(Err(e)) => {
            tracing::warn!(exercise_id = %request.exercise_id, "equipment resolver failed: {e}");
            Outcome::Fallback(ResolverStatus::Error, e.to_string())
        }
        Ok(Ok(None)) => Outcome::Fallback(
            ResolverStatus::NoData,
            format!("no equipment data for {}", request.exercise_id),
        ),
        Ok(Ok(Some(result))) if !result.total_kg.is_finite() || result.total_kg < 0.0 => {
            tracing::warn!(
                exercise_id = %request.exercise_id,
                total_kg = result.total_kg,
                "equipment resolver returned an unusable weight"
            );
            Outcome::Fallback(
                ResolverStatus::Invalid,
                format!("resolver returned {}kg", result.total_kg),
            )
        }
        Ok(Ok(Some(result))) => Outcome::Snapped(result),
    }
}
