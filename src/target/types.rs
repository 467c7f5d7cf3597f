//! Input and output records for the target pipeline.
//!
//! Everything here crosses the JSON boundary: fields are camelCase,
//! enum values snake_case.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::math;

/// ---------------------------------------------------------------------------
/// Enumerations
/// ---------------------------------------------------------------------------

/// How the previous set felt to the lifter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feel {
    TooLittle,
    Excellent,
    TooMuch,
}

impl std::fmt::Display for Feel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLittle => write!(f, "too_little"),
            Self::Excellent => write!(f, "excellent"),
            Self::TooMuch => write!(f, "too_much"),
        }
    }
}

impl std::str::FromStr for Feel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "too_little" => Ok(Self::TooLittle),
            "excellent" => Ok(Self::Excellent),
            "too_much" => Ok(Self::TooMuch),
            _ => Err(format!("Unknown feel: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[default]
    Kg,
    Lb,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kg => write!(f, "kg"),
            Self::Lb => write!(f, "lb"),
        }
    }
}

/// How the implement takes load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    /// Loaded symmetrically on two sides (barbell)
    DualLoad,
    /// Loaded on one side only (single-arm lever)
    SingleLoad,
    /// Pin-selected weight stack
    Stack,
}

/// Whether the lifter thinks in per-side plate weight or total weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    PerSide,
    Total,
}

/// ---------------------------------------------------------------------------
/// Inputs
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPerformance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_reps: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_feel: Option<Feel>,
}

impl LastPerformance {
    /// Previous weight, if there is one worth progressing from
    pub fn history_weight(&self) -> Option<f64> {
        self.prev_weight_kg.filter(|w| *w > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessContext {
    #[serde(rename = "todayScore0to100")]
    pub today_score: f64,
    #[serde(
        rename = "lastScore0to100",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_score: Option<f64>,
}

impl Default for ReadinessContext {
    fn default() -> Self {
        Self {
            today_score: 50.0,
            last_score: None,
        }
    }
}

/// Optional per-lifter overrides of the session-to-session rails
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyPrefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pct_up: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pct_down: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_working_reps: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_working_reps: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentContext {
    pub exercise_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gym_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    pub load_type: LoadType,
    pub entry_mode: EntryMode,
}

/// Programmed nudges from a template or program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rep_goal: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_progression_pct: Option<f64>,
}

/// The single parameter of the target engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeTargetInput {
    #[serde(default)]
    pub last: LastPerformance,
    #[serde(default)]
    pub readiness: ReadinessContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<SafetyPrefs>,
    pub equipment: EquipmentContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentHints>,
}

/// ---------------------------------------------------------------------------
/// Stage values
/// ---------------------------------------------------------------------------

/// Candidate threaded through the stages. Each stage returns a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Working {
    pub weight_kg: f64,
    pub reps: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverStatus {
    Snapped,
    NoData,
    Unavailable,
    Timeout,
    Error,
    Invalid,
}

impl std::fmt::Display for ResolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapped => write!(f, "snapped"),
            Self::NoData => write!(f, "no_data"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Timeout => write!(f, "timeout"),
            Self::Error => write!(f, "error"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

/// Stage 4 output: the final candidate plus display-only equipment metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentWorking {
    pub weight_kg: f64,
    pub reps: i32,
    pub reason: String,
    pub desired_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_side_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_side_plates: Vec<f64>,
    pub resolver_status: ResolverStatus,
}

impl EquipmentWorking {
    pub fn snapped(&self) -> bool {
        self.resolver_status == ResolverStatus::Snapped
    }
}

/// ---------------------------------------------------------------------------
/// Outputs
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSuggestion {
    pub total_weight_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_side_kg: Option<f64>,
    pub reps: i32,
    pub unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TargetSuggestion {
    /// Total weight in the display unit
    pub fn display_total(&self) -> f64 {
        match self.unit {
            Unit::Kg => self.total_weight_kg,
            Unit::Lb => math::kg_to_lb(self.total_weight_kg),
        }
    }

    pub fn display_per_side(&self) -> Option<f64> {
        self.per_side_kg.map(|kg| match self.unit {
            Unit::Kg => kg,
            Unit::Lb => math::kg_to_lb(kg),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSnapshots {
    pub baseline: Working,
    pub readiness: Working,
    pub safety: Working,
    pub equipment: EquipmentWorking,
}

/// Readiness arithmetic as actually applied by stage 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessDetail {
    pub today: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    pub multiplier: f64,
    pub rep_bias: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampApplied {
    None,
    Up,
    Down,
}

/// Effective rails after defaults were filled in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRails {
    pub max_pct_up: f64,
    pub max_pct_down: f64,
    pub min_working_reps: i32,
    pub max_working_reps: i32,
}

impl Default for SafetyRails {
    fn default() -> Self {
        Self {
            max_pct_up: 6.0,
            max_pct_down: 12.0,
            min_working_reps: 5,
            max_working_reps: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyDetail {
    pub rails: SafetyRails,
    pub base_weight_kg: f64,
    pub up_limit_kg: f64,
    pub down_limit_kg: f64,
    pub clamp_applied: ClampApplied,
    pub reps_clamped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDetail {
    pub entry_mode: EntryMode,
    pub load_type: LoadType,
    pub resolver_used: bool,
    pub resolver_status: ResolverStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implement: Option<String>,
    pub desired_kg: f64,
    pub final_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_side_plates: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugBundle {
    pub input: ComputeTargetInput,
    pub normalized_last: LastPerformance,
    pub readiness: ReadinessDetail,
    pub safety: SafetyDetail,
    pub equipment: EquipmentDetail,
    pub decisions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeTargetResult {
    pub target: TargetSuggestion,
    pub stages: StageSnapshots,
    pub debug: DebugBundle,
}
