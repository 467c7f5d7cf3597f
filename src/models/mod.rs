pub mod performance;
pub mod target_log;

pub use performance::{NewPerformance, PerformanceRecord};
pub use target_log::TargetLogEntry;
