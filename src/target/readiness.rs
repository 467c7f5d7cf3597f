//! Stage 2: scale weight and bias reps by today's readiness score.
//!
//! The curve is asymmetric: a score of 0 costs 7% of the load while a
//! score of 100 adds only 6%.

use super::types::{ComputeTargetInput, ReadinessDetail, Working};
use super::DecisionLog;
use crate::math;

const MULTIPLIER_AT_ZERO: f64 = -0.07;
const MULTIPLIER_AT_HUNDRED: f64 = 0.06;

/// Scores at or below this lose the full rep penalty
const REP_BIAS_PIVOT: f64 = 40.0;
const REP_BIAS_SPAN: f64 = 60.0;
const REP_BIAS_MIN: f64 = -2.0;
const REP_BIAS_MAX: f64 = 1.0;

pub const GLOBAL_MIN_REPS: i32 = 3;
pub const GLOBAL_MAX_REPS: i32 = 20;

/// Strength multiplier for a raw readiness score
pub fn strength_multiplier(score: f64) -> f64 {
    let s = math::clamp(score, 0.0, 100.0);
    math::lerp(MULTIPLIER_AT_ZERO, MULTIPLIER_AT_HUNDRED, s / 100.0)
}

/// Whole-rep bias for a raw readiness score
pub fn rep_bias(score: f64) -> i32 {
    let s = math::clamp(score, 0.0, 100.0);
    let t = math::clamp((s - REP_BIAS_PIVOT) / REP_BIAS_SPAN, 0.0, 1.0);
    math::round_half_up(math::lerp(REP_BIAS_MIN, REP_BIAS_MAX, t))
}

pub fn readiness_adjust(
    input: &ComputeTargetInput,
    prev: &Working,
    log: &mut DecisionLog,
) -> (Working, ReadinessDetail) {
    let today = math::clamp(input.readiness.today_score, 0.0, 100.0);
    let last = input.readiness.last_score.map(|s| math::clamp(s, 0.0, 100.0));

    let multiplier = strength_multiplier(today);
    let bias = rep_bias(today);

    let weight_kg = math::round_to((prev.weight_kg * (1.0 + multiplier)).max(0.0), 1);
    let reps = math::clamp_reps(prev.reps + bias, GLOBAL_MIN_REPS, GLOBAL_MAX_REPS);

    log.push(format!(
        "readiness: score {:.0} -> multiplier {:+.4}, rep bias {:+}",
        today, multiplier, bias
    ));

    let working = Working {
        weight_kg,
        reps,
        reason: format!(
            "Readiness {:.0}/100: load {:+.1}%, reps {:+}",
            today,
            multiplier * 100.0,
            bias
        ),
    };

    let detail = ReadinessDetail {
        today,
        last,
        delta: last.map(|l| today - l),
        multiplier,
        rep_bias: bias,
    };

    (working, detail)
}
