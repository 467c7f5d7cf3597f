//! Feature flag commands

use crate::db::AppState;
use crate::flags::{FeatureFlag, FeatureFlags};

pub async fn get_feature_flag(state: &AppState, name: String) -> Result<bool, String> {
  state.flags.get_flag(&name).await.map_err(|e| e.to_string())
}

pub async fn set_feature_flag(state: &AppState, name: String, enabled: bool) -> Result<(), String> {
  state
    .flags
    .set_flag(&name, enabled)
    .await
    .map_err(|e| e.to_string())
}

pub async fn list_feature_flags(state: &AppState) -> Result<Vec<FeatureFlag>, String> {
  state.flags.list_flags().await.map_err(|e| e.to_string())
}
