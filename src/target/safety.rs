//! Stage 3: bound session-to-session weight swings and working reps

use super::readiness::{GLOBAL_MAX_REPS, GLOBAL_MIN_REPS};
use super::types::{ClampApplied, ComputeTargetInput, SafetyDetail, SafetyRails, Working};
use super::DecisionLog;
use crate::math;

/// Effective rails: caller overrides on top of the defaults.
///
/// Rep rails can only tighten the global rep range, never widen it.
pub fn resolve_rails(input: &ComputeTargetInput) -> SafetyRails {
    let defaults = SafetyRails::default();
    let mut rails = match &input.safety {
        Some(prefs) => SafetyRails {
            max_pct_up: prefs.max_pct_up.unwrap_or(defaults.max_pct_up),
            max_pct_down: prefs.max_pct_down.unwrap_or(defaults.max_pct_down),
            min_working_reps: prefs.min_working_reps.unwrap_or(defaults.min_working_reps),
            max_working_reps: prefs.max_working_reps.unwrap_or(defaults.max_working_reps),
        },
        None => defaults,
    };

    rails.min_working_reps =
        math::clamp_reps(rails.min_working_reps, GLOBAL_MIN_REPS, GLOBAL_MAX_REPS);
    rails.max_working_reps = math::clamp_reps(
        rails.max_working_reps,
        rails.min_working_reps,
        GLOBAL_MAX_REPS,
    );
    rails
}

/// Float noise allowed when a limit already sits on a tenth
const LIMIT_EPSILON: f64 = 1e-9;

/// Express a clamped weight to one decimal without crossing the limit
fn to_tenth_below(limit: f64) -> f64 {
    let rounded = math::round_to(limit, 1);
    if rounded > limit + LIMIT_EPSILON {
        math::floor_to(limit, 1)
    } else {
        rounded
    }
}

fn to_tenth_above(limit: f64) -> f64 {
    let rounded = math::round_to(limit, 1);
    if rounded < limit - LIMIT_EPSILON {
        math::ceil_to(limit, 1)
    } else {
        rounded
    }
}

pub fn safety_clamp(
    input: &ComputeTargetInput,
    prev: &Working,
    log: &mut DecisionLog,
) -> (Working, SafetyDetail) {
    let rails = resolve_rails(input);

    // Without history the rails are anchored on the candidate itself
    let base_weight_kg = input.last.history_weight().unwrap_or(prev.weight_kg);
    let up_limit_kg = base_weight_kg * (1.0 + rails.max_pct_up / 100.0);
    let down_limit_kg = (base_weight_kg * (1.0 - rails.max_pct_down / 100.0)).max(0.0);

    let mut weight_kg = prev.weight_kg;
    let mut clamp_applied = ClampApplied::None;
    let mut reasons = Vec::new();

    if weight_kg > up_limit_kg {
        let mut clamped = to_tenth_below(up_limit_kg);
        // No tenth fits between the rails: use the exact limit
        if clamped < down_limit_kg - LIMIT_EPSILON {
            clamped = up_limit_kg;
        }
        log.push(format!(
            "safety: {:.1}kg above +{}% rail, clamped to {:.1}kg",
            weight_kg, rails.max_pct_up, clamped
        ));
        reasons.push(format!("capped at +{}% of last session", rails.max_pct_up));
        weight_kg = clamped;
        clamp_applied = ClampApplied::Up;
    }

    if weight_kg < down_limit_kg {
        let mut clamped = to_tenth_above(down_limit_kg);
        if clamped > up_limit_kg + LIMIT_EPSILON {
            clamped = down_limit_kg;
        }
        log.push(format!(
            "safety: {:.1}kg below -{}% rail, clamped to {:.1}kg",
            weight_kg, rails.max_pct_down, clamped
        ));
        reasons.push(format!("held at -{}% of last session", rails.max_pct_down));
        weight_kg = clamped;
        clamp_applied = ClampApplied::Down;
    }

    let reps = math::clamp_reps(prev.reps, rails.min_working_reps, rails.max_working_reps);
    let reps_clamped = reps != prev.reps;
    if reps_clamped {
        log.push(format!(
            "safety: reps {} clamped to {} (rails {}-{})",
            prev.reps, reps, rails.min_working_reps, rails.max_working_reps
        ));
        reasons.push(format!(
            "reps kept within {}-{}",
            rails.min_working_reps, rails.max_working_reps
        ));
    }

    let reason = if reasons.is_empty() {
        "Within safety rails".to_string()
    } else {
        format!("Safety: {}", reasons.join(", "))
    };

    let working = Working {
        weight_kg,
        reps,
        reason,
    };

    let detail = SafetyDetail {
        rails,
        base_weight_kg,
        up_limit_kg,
        down_limit_kg,
        clamp_applied,
        reps_clamped,
    };

    (working, detail)
}
