//! Stage 1: project a baseline from the last performance, or seed a starter load

use super::sanitize::DEFAULT_MICRO_PROGRESSION_PCT;
use super::types::{ComputeTargetInput, Feel, LoadType, Working};
use super::DecisionLog;
use crate::math;

/// Starter load for two-sided implements. Equipment snapping corrects it.
pub const SEED_DUAL_LOAD_KG: f64 = 30.0;
/// Starter load for everything else
pub const SEED_OTHER_KG: f64 = 20.0;

const DEFAULT_REPS: i32 = 8;
const MIN_BASELINE_REPS: i32 = 5;
const MAX_BASELINE_REPS: i32 = 20;

const FEEL_TOO_LITTLE_FACTOR: f64 = 1.02;
const FEEL_TOO_MUCH_FACTOR: f64 = 0.98;

pub fn baseline(input: &ComputeTargetInput, log: &mut DecisionLog) -> Working {
    let intent = input.intent.as_ref();

    let rep_target = intent
        .and_then(|i| i.target_rep_goal)
        .unwrap_or_else(|| DEFAULT_REPS.max(input.last.prev_reps.unwrap_or(DEFAULT_REPS)));
    let reps = math::clamp_reps(rep_target, MIN_BASELINE_REPS, MAX_BASELINE_REPS);

    let micro_pct = intent
        .and_then(|i| i.micro_progression_pct)
        .unwrap_or(DEFAULT_MICRO_PROGRESSION_PCT);

    let (mut weight_kg, mut reason) = match input.last.history_weight() {
        Some(prev) => {
            let progressed = prev * (1.0 + micro_pct / 100.0);
            log.push(format!(
                "baseline: progressed {:.1}kg by {}% -> {:.2}kg",
                prev, micro_pct, progressed
            ));
            (
                progressed,
                format!("Progressed from last session ({:.1}kg, +{}%)", prev, micro_pct),
            )
        }
        None => {
            let seed = match input.equipment.load_type {
                LoadType::DualLoad => SEED_DUAL_LOAD_KG,
                LoadType::SingleLoad | LoadType::Stack => SEED_OTHER_KG,
            };
            log.push(format!("baseline: no history, seeded {:.1}kg", seed));
            (seed, format!("New lifter: seeded starter load {:.1}kg", seed))
        }
    };

    match input.last.prev_feel {
        Some(Feel::TooLittle) => {
            weight_kg *= FEEL_TOO_LITTLE_FACTOR;
            reason.push_str("; last set felt too light (+2%)");
            log.push("baseline: feel too_little, weight x1.02".to_string());
        }
        Some(Feel::TooMuch) => {
            weight_kg *= FEEL_TOO_MUCH_FACTOR;
            reason.push_str("; last set felt too heavy (-2%)");
            log.push("baseline: feel too_much, weight x0.98".to_string());
        }
        Some(Feel::Excellent) | None => {}
    }

    Working {
        weight_kg: weight_kg.max(0.0),
        reps,
        reason,
    }
}
