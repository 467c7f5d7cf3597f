//! Numeric helpers shared by the target pipeline stages

/// Kilograms per pound is the reciprocal of this.
pub const LB_PER_KG: f64 = 2.2046226218;

/// Clamp `x` into `[lo, hi]`.
///
/// NaN collapses to `lo` so a bad value can never escape the range.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() {
        return lo;
    }
    x.max(lo).min(hi)
}

pub fn clamp_reps(reps: i32, lo: i32, hi: i32) -> i32 {
    reps.max(lo).min(hi)
}

/// Round to `decimals` places, ties away from zero
pub fn round_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (x * factor).round() / factor
}

pub fn floor_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (x * factor).floor() / factor
}

pub fn ceil_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (x * factor).ceil() / factor
}

/// Round to the nearest integer with ties toward +infinity (-1.5 -> -1, 1.5 -> 2).
pub fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1). `t` is not clamped.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LB_PER_KG
}

pub fn lb_to_kg(lb: f64) -> f64 {
    lb / LB_PER_KG
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
