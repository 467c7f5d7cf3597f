//! Stage 5: package everything the stages did into a self-contained bundle.
//!
//! Pure aggregation. The readiness and safety details are the ones the
//! stages actually applied, never recomputed here.

use super::types::{
    ComputeTargetInput, DebugBundle, EquipmentDetail, EquipmentWorking, ReadinessDetail,
    SafetyDetail,
};
use super::DecisionLog;

pub fn assemble(
    raw_input: &ComputeTargetInput,
    clean_input: &ComputeTargetInput,
    readiness: ReadinessDetail,
    safety: SafetyDetail,
    equipment: &EquipmentWorking,
    decisions: DecisionLog,
) -> DebugBundle {
    // Only a snap counts; a resolver that answered nothing useful was not used
    let resolver_used = equipment.snapped();

    DebugBundle {
        input: raw_input.clone(),
        normalized_last: clean_input.last.clone(),
        readiness,
        safety,
        equipment: EquipmentDetail {
            entry_mode: clean_input.equipment.entry_mode,
            load_type: clean_input.equipment.load_type,
            resolver_used,
            resolver_status: equipment.resolver_status,
            implement: equipment.implement.clone(),
            desired_kg: equipment.desired_kg,
            final_kg: equipment.weight_kg,
            residual_kg: equipment.residual_kg,
            bar_weight_kg: equipment.bar_weight_kg,
            per_side_plates: equipment.per_side_plates.clone(),
        },
        decisions: decisions.into_entries(),
    }
}
