//! Staged Target Suggestion Engine (V3)
//!
//! Derives a working weight and rep target for one exercise from:
//! - last performance (weight, reps, subjective feel)
//! - today's readiness score
//! - safety rails on session-to-session change
//! - equipment context (load type, resolver for loadable weights)
//!
//! Stages run strictly in order, each returning a fresh `Working`:
//! baseline -> readiness -> safety -> equipment -> debug bundle.
//! Only the equipment stage awaits, and it never fails.

pub mod baseline;
pub mod debug;
pub mod equipment;
pub mod readiness;
pub mod safety;
pub mod sanitize;
pub mod types;

use std::time::Duration;

use crate::resolver::EquipmentResolver;

pub use types::*;

pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_millis(1500);

/// ---------------------------------------------------------------------------
/// Decision Log: one entry per significant branch, in order
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionLog {
    entries: Vec<String>,
}

impl DecisionLog {
    pub fn push(&mut self, entry: String) {
        tracing::debug!(decision = %entry);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// ---------------------------------------------------------------------------
/// Orchestrator
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct TargetOptions {
    /// Upper bound on the equipment resolver round trip
    pub resolver_timeout: Duration,
}

impl Default for TargetOptions {
    fn default() -> Self {
        Self {
            resolver_timeout: DEFAULT_RESOLVER_TIMEOUT,
        }
    }
}

/// Run all five stages for one exercise
pub async fn compute_target_v3(
    input: &ComputeTargetInput,
    resolver: Option<&dyn EquipmentResolver>,
    options: TargetOptions,
) -> ComputeTargetResult {
    let mut log = DecisionLog::default();

    let clean = sanitize::sanitize(input, &mut log);

    let stage1 = baseline::baseline(&clean, &mut log);
    let (stage2, readiness_detail) = readiness::readiness_adjust(&clean, &stage1, &mut log);
    let (stage3, safety_detail) = safety::safety_clamp(&clean, &stage2, &mut log);
    let stage4 = equipment::equipment_resolve(
        &clean,
        &stage3,
        resolver,
        options.resolver_timeout,
        &mut log,
    )
    .await;

    let target = TargetSuggestion {
        total_weight_kg: stage4.weight_kg,
        per_side_kg: stage4.per_side_kg,
        reps: stage4.reps,
        unit: clean.equipment.unit.unwrap_or_default(),
        notes: equipment::snap_note(&stage4),
    };

    tracing::debug!(
        exercise_id = %clean.equipment.exercise_id,
        total_kg = target.total_weight_kg,
        reps = target.reps,
        resolver = %stage4.resolver_status,
        "target computed"
    );

    let debug = debug::assemble(input, &clean, readiness_detail, safety_detail, &stage4, log);

    ComputeTargetResult {
        target,
        stages: StageSnapshots {
            baseline: stage1,
            readiness: stage2,
            safety: stage3,
            equipment: stage4,
        },
        debug,
    }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::resolver::{ResolveDetails, ResolveRequest, ResolveResult, ResolverError};
    use async_trait::async_trait;

    /// Rounds to the nearest 2.5kg the way a plate-loaded bar would
    struct PlateResolver;

    #[async_trait]
    impl EquipmentResolver for PlateResolver {
        async fn resolve(
            &self,
            request: &ResolveRequest,
        ) -> Result<Option<ResolveResult>, ResolverError> {
            let total_kg = (request.desired_kg / 2.5).round() * 2.5;
            Ok(Some(ResolveResult {
                implement: "olympic_bar".to_string(),
                total_kg,
                residual_kg: Some(request.desired_kg - total_kg),
                details: Some(ResolveDetails {
                    bar_weight_kg: Some(20.0),
                    per_side_plates: vec![],
                    unit: None,
                }),
            }))
        }
    }

    struct EmptyResolver;

    #[async_trait]
    impl EquipmentResolver for EmptyResolver {
        async fn resolve(
            &self,
            _request: &ResolveRequest,
        ) -> Result<Option<ResolveResult>, ResolverError> {
            Ok(None)
        }
    }

    fn input_json(json: &str) -> ComputeTargetInput {
        serde_json::from_str(json).expect("valid input")
    }

    fn returning_lifter(prev_weight: f64, today: f64, load_type: LoadType) -> ComputeTargetInput {
        ComputeTargetInput {
            last: LastPerformance {
                prev_weight_kg: Some(prev_weight),
                prev_reps: Some(8),
                prev_date: None,
                prev_feel: None,
            },
            readiness: ReadinessContext {
                today_score: today,
                last_score: None,
            },
            safety: None,
            equipment: EquipmentContext {
                exercise_id: "squat".to_string(),
                equipment_ref: None,
                gym_id: None,
                unit: None,
                load_type,
                entry_mode: EntryMode::Total,
            },
            intent: None,
        }
    }

    #[tokio::test]
    async fn test_new_lifter_dual_load_neutral_readiness() {
        let input = input_json(
            r#"{"last":{},"readiness":{"todayScore0to100":50},
                "equipment":{"loadType":"dual_load","entryMode":"total","exerciseId":"x"}}"#,
        );

        let result = compute_target_v3(&input, None, TargetOptions::default()).await;

        assert_eq!(result.stages.baseline.weight_kg, 30.0);
        assert!(result.stages.baseline.reps >= 8);
        assert_approx_eq!(result.debug.readiness.multiplier, -0.005, 1e-9);
        assert_approx_eq!(result.stages.readiness.weight_kg, 29.85, 0.051);
        assert!((7..=8).contains(&result.target.reps));
        assert_eq!(result.target.unit, Unit::Kg);
    }

    #[tokio::test]
    async fn test_returning_lifter_feel_too_much() {
        let input = input_json(
            r#"{"last":{"prevWeightKg":100,"prevReps":8,"prevFeel":"too_much"},
                "readiness":{"todayScore0to100":70},
                "equipment":{"loadType":"dual_load","entryMode":"total","exerciseId":"bench"},
                "intent":{"microProgressionPct":1}}"#,
        );

        let result = compute_target_v3(&input, None, TargetOptions::default()).await;

        assert_approx_eq!(result.stages.baseline.weight_kg, 98.98, 1e-9);
    }

    #[tokio::test]
    async fn test_safety_clamp_end_to_end() {
        // 15% programmed jump with full readiness lands well above the +6% rail
        let mut input = returning_lifter(100.0, 100.0, LoadType::Stack);
        input.intent = Some(IntentHints {
            target_rep_goal: None,
            micro_progression_pct: Some(15.0),
        });

        let result = compute_target_v3(&input, None, TargetOptions::default()).await;

        assert!(result.stages.readiness.weight_kg > 115.0);
        assert_eq!(result.stages.safety.weight_kg, 106.0);
        assert_eq!(result.debug.safety.clamp_applied, ClampApplied::Up);
        assert_eq!(result.target.total_weight_kg, 106.0);
    }

    #[tokio::test]
    async fn test_resolver_fallback_keeps_safety_weight() {
        let input = returning_lifter(82.5, 64.0, LoadType::DualLoad);

        let result = compute_target_v3(&input, None, TargetOptions::default()).await;

        assert_eq!(result.target.total_weight_kg, result.stages.safety.weight_kg);
        assert_eq!(result.target.notes, None);
        assert!(!result.debug.equipment.resolver_used);
        assert_eq!(result.debug.equipment.resolver_status, ResolverStatus::Unavailable);
    }

    #[tokio::test]
    async fn test_resolver_without_data_is_not_used() {
        let input = returning_lifter(82.5, 64.0, LoadType::DualLoad);

        let result = compute_target_v3(&input, Some(&EmptyResolver), TargetOptions::default()).await;

        assert_eq!(result.debug.equipment.resolver_status, ResolverStatus::NoData);
        assert!(!result.debug.equipment.resolver_used);
        assert_eq!(result.target.total_weight_kg, result.stages.safety.weight_kg);
    }

    #[tokio::test]
    async fn test_dual_load_total_is_twice_per_side() {
        for today in [0.0, 25.0, 50.0, 75.0, 100.0] {
            let input = returning_lifter(77.3, today, LoadType::DualLoad);
            let result = compute_target_v3(&input, Some(&PlateResolver), TargetOptions::default()).await;

            let per_side = result.target.per_side_kg.expect("dual load has per side");
            assert_eq!(result.target.total_weight_kg, 2.0 * per_side);
        }
    }

    #[tokio::test]
    async fn test_single_load_has_no_per_side() {
        let input = returning_lifter(40.0, 50.0, LoadType::SingleLoad);
        let result = compute_target_v3(&input, Some(&PlateResolver), TargetOptions::default()).await;
        assert_eq!(result.target.per_side_kg, None);
    }

    #[tokio::test]
    async fn test_snap_sets_note_and_debug() {
        let input = returning_lifter(81.5, 80.0, LoadType::DualLoad);

        let result = compute_target_v3(&input, Some(&PlateResolver), TargetOptions::default()).await;

        let desired = result.stages.safety.weight_kg;
        assert_eq!(result.stages.equipment.desired_kg, desired);
        assert_eq!(result.target.total_weight_kg % 2.5, 0.0);
        assert!(result.debug.equipment.resolver_used);
        assert_eq!(result.debug.equipment.implement.as_deref(), Some("olympic_bar"));
        if (result.target.total_weight_kg - desired).abs() >= 0.05 {
            assert_eq!(result.target.notes, Some(format!("snapped from {:.1}kg", desired)));
        }
    }

    #[tokio::test]
    async fn test_pipeline_is_idempotent() {
        let input = returning_lifter(92.5, 43.0, LoadType::DualLoad);

        let first = compute_target_v3(&input, None, TargetOptions::default()).await;
        let second = compute_target_v3(&input, None, TargetOptions::default()).await;

        assert_eq!(first, second);
    }

    fn rails(up: f64, down: f64, min_reps: i32, max_reps: i32) -> Option<SafetyPrefs> {
        Some(SafetyPrefs {
            max_pct_up: Some(up),
            max_pct_down: Some(down),
            min_working_reps: Some(min_reps),
            max_working_reps: Some(max_reps),
        })
    }

    #[tokio::test]
    async fn test_rep_and_weight_bounds_hold() {
        let rail_sets = [
            None,
            rails(0.0, 0.0, 5, 20),
            rails(2.5, 5.0, 6, 10),
            rails(100.0, 100.0, 25, 30),
            rails(0.0, 0.0, 1, 2),
            rails(50.0, 250.0, -4, 99),
        ];

        for safety in rail_sets {
            for prev in [20.0, 47.5, 60.05, 100.0, 180.0] {
                for today in [0.0, 30.0, 60.0, 100.0] {
                    for reps in [1, 3, 8, 15, 30] {
                        let mut input = returning_lifter(prev, today, LoadType::DualLoad);
                        input.safety = safety.clone();
                        input.last.prev_reps = Some(reps);
                        input.last.prev_feel = Some(Feel::TooLittle);

                        let result = compute_target_v3(&input, None, TargetOptions::default()).await;

                        let r2 = result.stages.readiness.reps;
                        let r3 = result.stages.safety.reps;
                        let w3 = result.stages.safety.weight_kg;
                        let applied = &result.debug.safety;
                        assert!((3..=20).contains(&r2));
                        assert!((3..=20).contains(&r3), "reps {} under {:?}", r3, safety);
                        assert!(
                            (applied.rails.min_working_reps..=applied.rails.max_working_reps)
                                .contains(&r3)
                        );
                        assert!(w3 <= applied.up_limit_kg + 1e-9, "{} above {:?}", w3, applied);
                        assert!(w3 >= applied.down_limit_kg - 1e-9, "{} below {:?}", w3, applied);
                        if safety.is_none() {
                            assert!(w3 <= prev * 1.06 + 1e-9);
                            assert!(w3 >= prev * 0.88 - 1e-9);
                        }
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_implausible_history_stays_serializable() {
        let input = returning_lifter(1e308, 50.0, LoadType::DualLoad);

        let result = compute_target_v3(&input, None, TargetOptions::default()).await;

        assert_eq!(result.stages.baseline.weight_kg, baseline::SEED_DUAL_LOAD_KG);
        assert!(result.target.total_weight_kg.is_finite());

        let json = serde_json::to_string(&result).unwrap();
        let back: ComputeTargetResult = serde_json::from_str(&json).expect("stored result parses");
        assert_eq!(back.target.reps, result.target.reps);
        assert!(back.target.per_side_kg.is_some());
    }

    #[tokio::test]
    async fn test_debug_bundle_threads_stage_values() {
        let mut input = returning_lifter(60.0, 85.0, LoadType::Stack);
        input.readiness.last_score = Some(70.0);
        input.equipment.unit = Some(Unit::Lb);

        let result = compute_target_v3(&input, None, TargetOptions::default()).await;

        assert_eq!(result.debug.input, input);
        assert_eq!(result.debug.readiness.delta, Some(15.0));
        assert_eq!(
            result.debug.readiness.multiplier,
            readiness::strength_multiplier(85.0)
        );
        assert_eq!(result.debug.safety.rails, SafetyRails::default());
        assert_eq!(result.debug.equipment.load_type, LoadType::Stack);
        assert_eq!(result.target.unit, Unit::Lb);
        // baseline, readiness, equipment fallback
        assert_eq!(result.debug.decisions.len(), 3);
        assert!(result.debug.decisions[0].starts_with("baseline:"));
    }

    #[tokio::test]
    async fn test_garbage_history_is_normalised() {
        let mut input = returning_lifter(-40.0, f64::NAN, LoadType::DualLoad);
        input.last.prev_reps = Some(0);

        let result = compute_target_v3(&input, None, TargetOptions::default()).await;

        assert_eq!(result.stages.baseline.weight_kg, baseline::SEED_DUAL_LOAD_KG);
        assert_eq!(result.debug.normalized_last.prev_weight_kg, None);
        assert_eq!(result.debug.readiness.today, sanitize::NEUTRAL_READINESS);
        assert!(result.target.total_weight_kg >= 0.0);
    }

    #[tokio::test]
    async fn test_result_serializes_for_display() {
        let input = returning_lifter(50.0, 50.0, LoadType::DualLoad);
        let result = compute_target_v3(&input, Some(&PlateResolver), TargetOptions::default()).await;

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["target"]["totalWeightKg"].is_number());
        assert!(json["target"]["perSideKg"].is_number());
        assert!(json["stages"]["equipment"]["desiredKg"].is_number());
        assert!(json["debug"]["decisions"].is_array());
        assert_eq!(json["debug"]["equipment"]["resolverStatus"], "snapped");
    }
}
