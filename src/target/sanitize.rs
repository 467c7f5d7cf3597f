//! Boundary normalisation for pipeline input.
//!
//! Inputs are corrected, never rejected. Each correction is logged as a
//! decision so the debug bundle shows what the stages actually saw.

use super::readiness::{GLOBAL_MAX_REPS, GLOBAL_MIN_REPS};
use super::types::{ComputeTargetInput, SafetyPrefs, SafetyRails};
use super::DecisionLog;

/// Neutral readiness used when the supplied score is not a number
pub const NEUTRAL_READINESS: f64 = 50.0;

pub const DEFAULT_MICRO_PROGRESSION_PCT: f64 = 1.0;

/// Heaviest previous weight taken at face value. Anything above is a data
/// error (wrong unit, typo) and is treated like no history.
pub const MAX_PREV_WEIGHT_KG: f64 = 1000.0;

/// Bound on programmed progression and on the upward rail, in percent
const MAX_PCT: f64 = 100.0;

pub fn sanitize(input: &ComputeTargetInput, log: &mut DecisionLog) -> ComputeTargetInput {
    let mut clean = input.clone();

    if let Some(w) = clean.last.prev_weight_kg {
        if !w.is_finite() || w <= 0.0 || w > MAX_PREV_WEIGHT_KG {
            log.push(format!("input: prevWeightKg {} ignored, treating as new lifter", w));
            clean.last.prev_weight_kg = None;
        }
    }

    if let Some(r) = clean.last.prev_reps {
        if r <= 0 {
            log.push(format!("input: prevReps {} ignored", r));
            clean.last.prev_reps = None;
        }
    }

    if !clean.readiness.today_score.is_finite() {
        log.push(format!(
            "input: readiness today {} replaced with neutral {}",
            clean.readiness.today_score, NEUTRAL_READINESS
        ));
        clean.readiness.today_score = NEUTRAL_READINESS;
    }

    if clean.readiness.last_score.is_some_and(|s| !s.is_finite()) {
        log.push("input: readiness last score ignored (not a number)".to_string());
        clean.readiness.last_score = None;
    }

    if let Some(intent) = clean.intent.as_mut() {
        if intent.micro_progression_pct.is_some_and(|p| !p.is_finite()) {
            log.push(format!(
                "input: microProgressionPct replaced with default {}",
                DEFAULT_MICRO_PROGRESSION_PCT
            ));
            intent.micro_progression_pct = Some(DEFAULT_MICRO_PROGRESSION_PCT);
        }
        if let Some(p) = intent.micro_progression_pct {
            if p.abs() > MAX_PCT {
                let capped = p.clamp(-MAX_PCT, MAX_PCT);
                log.push(format!("input: microProgressionPct {} capped at {}", p, capped));
                intent.micro_progression_pct = Some(capped);
            }
        }
        if let Some(goal) = intent.target_rep_goal {
            if goal <= 0 {
                log.push(format!("input: targetRepGoal {} ignored", goal));
                intent.target_rep_goal = None;
            }
        }
    }

    if let Some(safety) = clean.safety.as_mut() {
        sanitize_safety(safety, log);
    }

    clean
}

fn sanitize_safety(safety: &mut SafetyPrefs, log: &mut DecisionLog) {
    let defaults = SafetyRails::default();

    if safety.max_pct_up.is_some_and(|p| !p.is_finite() || p < 0.0) {
        log.push(format!(
            "input: maxPctUp {:?} replaced with default {}",
            safety.max_pct_up, defaults.max_pct_up
        ));
        safety.max_pct_up = None;
    }

    if safety.max_pct_down.is_some_and(|p| !p.is_finite() || p < 0.0) {
        log.push(format!(
            "input: maxPctDown {:?} replaced with default {}",
            safety.max_pct_down, defaults.max_pct_down
        ));
        safety.max_pct_down = None;
    }

    if let Some(p) = safety.max_pct_up {
        if p > MAX_PCT {
            log.push(format!("input: maxPctUp {} capped at {}", p, MAX_PCT));
            safety.max_pct_up = Some(MAX_PCT);
        }
    }

    // A decrease of 100% or more would allow a zero or negative floor
    if let Some(p) = safety.max_pct_down {
        if p > 100.0 {
            log.push(format!("input: maxPctDown {} capped at 100", p));
            safety.max_pct_down = Some(100.0);
        }
    }

    // Rep rails may only tighten the global rep range
    if let Some(min) = safety.min_working_reps {
        let bounded = min.clamp(GLOBAL_MIN_REPS, GLOBAL_MAX_REPS);
        if bounded != min {
            log.push(format!("input: minWorkingReps {} moved to {}", min, bounded));
            safety.min_working_reps = Some(bounded);
        }
    }

    if let Some(max) = safety.max_working_reps {
        let bounded = max.clamp(GLOBAL_MIN_REPS, GLOBAL_MAX_REPS);
        if bounded != max {
            log.push(format!("input: maxWorkingReps {} moved to {}", max, bounded));
            safety.max_working_reps = Some(bounded);
        }
    }

    let min = safety.min_working_reps.unwrap_or(defaults.min_working_reps);
    if let Some(max) = safety.max_working_reps {
        if max < min {
            log.push(format!(
                "input: maxWorkingReps {} raised to minWorkingReps {}",
                max, min
            ));
            safety.max_working_reps = Some(min);
        }
    }
}
