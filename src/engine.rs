//! Engine registry and the unified target entry point
//!
//! Call sites ask for "a target" and never name an engine. A feature flag
//! picks the engine version through the registry; today both sides of the
//! flag resolve to V3.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::flags::FeatureFlags;
use crate::resolver::EquipmentResolver;
use crate::target::{compute_target_v3, ComputeTargetInput, ComputeTargetResult, TargetOptions};

pub const V3: &str = "v3";
pub const DEFAULT_ENGINE_FLAG: &str = "target_engine_v3";

/// ---------------------------------------------------------------------------
/// Engine strategy
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait TargetEngine: Send + Sync {
    fn version(&self) -> &'static str;

    async fn compute(
        &self,
        input: &ComputeTargetInput,
        resolver: Option<&dyn EquipmentResolver>,
    ) -> ComputeTargetResult;
}

pub struct V3Engine {
    options: TargetOptions,
}

impl V3Engine {
    pub fn new(options: TargetOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl TargetEngine for V3Engine {
    fn version(&self) -> &'static str {
        V3
    }

    async fn compute(
        &self,
        input: &ComputeTargetInput,
        resolver: Option<&dyn EquipmentResolver>,
    ) -> ComputeTargetResult {
        compute_target_v3(input, resolver, self.options).await
    }
}

/// ---------------------------------------------------------------------------
/// Selection rule: which version each side of the flag maps to
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSelection {
    pub flag: String,
    pub when_on: String,
    pub when_off: String,
}

impl Default for EngineSelection {
    fn default() -> Self {
        Self {
            flag: DEFAULT_ENGINE_FLAG.to_string(),
            when_on: V3.to_string(),
            when_off: V3.to_string(),
        }
    }
}

/// ---------------------------------------------------------------------------
/// Registry
/// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn TargetEngine>>,
    default_version: String,
    selection: EngineSelection,
    options: TargetOptions,
}

impl EngineRegistry {
    /// Empty registry; `options` also configure the last-resort V3 engine
    pub fn new(options: TargetOptions, flag: &str) -> Self {
        Self {
            engines: HashMap::new(),
            default_version: V3.to_string(),
            selection: EngineSelection {
                flag: flag.to_string(),
                ..Default::default()
            },
            options,
        }
    }

    /// Registry holding only the V3 engine
    pub fn with_v3(options: TargetOptions, flag: &str) -> Self {
        let mut registry = Self::new(options, flag);
        registry.register(Arc::new(V3Engine::new(options)));
        registry
    }

    pub fn options(&self) -> TargetOptions {
        self.options
    }

    pub fn register(&mut self, engine: Arc<dyn TargetEngine>) {
        self.engines.insert(engine.version().to_string(), engine);
    }

    pub fn set_selection(&mut self, selection: EngineSelection) {
        self.selection = selection;
    }

    pub fn selection(&self) -> &EngineSelection {
        &self.selection
    }

    pub fn versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.engines.keys().cloned().collect();
        versions.sort();
        versions
    }

    pub fn get(&self, version: &str) -> Option<Arc<dyn TargetEngine>> {
        self.engines.get(version).cloned()
    }

    /// Version for a flag state, falling back to the default when the
    /// selected version is not registered
    fn pick(&self, flag_on: bool) -> (Arc<dyn TargetEngine>, Option<String>) {
        let wanted = if flag_on {
            &self.selection.when_on
        } else {
            &self.selection.when_off
        };

        match self.engines.get(wanted) {
            Some(engine) => (engine.clone(), None),
            None => {
                let fallback = self
                    .engines
                    .get(&self.default_version)
                    .or_else(|| self.engines.values().next())
                    .cloned()
                    .unwrap_or_else(|| {
                        let v3: Arc<dyn TargetEngine> =
                            Arc::new(V3Engine::new(self.options));
                        v3
                    });
                (fallback, Some(wanted.clone()))
            }
        }
    }
}

/// Compute a target through whichever engine the flag selects.
///
/// Flag lookup failures read as off. The path taken is prepended to the
/// decision log.
pub async fn compute_target_unified(
    input: &ComputeTargetInput,
    registry: &EngineRegistry,
    flags: &dyn FeatureFlags,
    resolver: Option<&dyn EquipmentResolver>,
) -> ComputeTargetResult {
    let flag = &registry.selection().flag;
    let flag_on = match flags.get_flag(flag).await {
        Ok(on) => on,
        Err(e) => {
            tracing::warn!(flag = %flag, "feature flag lookup failed, treating as off: {e}");
            false
        }
    };

    let (engine, missing) = registry.pick(flag_on);
    let state = if flag_on { "on" } else { "off" };

    let mut path = vec![format!(
        "engine: {} via flag {}={}",
        engine.version(),
        flag,
        state
    )];
    if let Some(missing) = missing {
        tracing::warn!(wanted = %missing, used = engine.version(), "engine version not registered");
        path.push(format!(
            "engine: {} not registered, fell back to {}",
            missing,
            engine.version()
        ));
    }

    let mut result = engine.compute(input, resolver).await;
    path.append(&mut result.debug.decisions);
    result.debug.decisions = path;
    result
}
