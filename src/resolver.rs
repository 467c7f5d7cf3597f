//! Equipment resolver capability
//!
//! Snapping a desired weight to something loadable (plates, stack pins,
//! fixed bars) lives outside this crate. The target pipeline only sees the
//! `EquipmentResolver` trait; `HttpEquipmentResolver` reaches the remote
//! RPC that owns the equipment configuration.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::target::Unit;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const RESOLVE_PATH: &str = "rpc/resolve_load";

/// ---------------------------------------------------------------------------
/// Contract
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
  pub exercise_id: String,
  pub desired_kg: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gym_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveDetails {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bar_weight_kg: Option<f64>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub per_side_plates: Vec<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unit: Option<Unit>,
}

/// Nearest loadable configuration for a desired weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResult {
  pub implement: String,
  pub total_kg: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub residual_kg: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<ResolveDetails>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
  #[error("Missing configuration: {0}")]
  Config(String),

  #[error("HTTP request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

impl From<reqwest::Error> for ResolverError {
  fn from(e: reqwest::Error) -> Self {
    ResolverError::Request(e.to_string())
  }
}

/// Snaps a desired weight to a loadable one.
///
/// `Ok(None)` means the resolver has no configuration for this
/// exercise/gym; callers treat it the same as having no resolver.
#[async_trait]
pub trait EquipmentResolver: Send + Sync {
  async fn resolve(&self, request: &ResolveRequest) -> Result<Option<ResolveResult>, ResolverError>;
}

/// ---------------------------------------------------------------------------
/// HTTP (RPC) Resolver
/// ---------------------------------------------------------------------------

pub struct HttpEquipmentResolver {
  client: Client,
  endpoint: Url,
  api_key: Option<String>,
}

impl HttpEquipmentResolver {
  pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, ResolverError> {
    // Keep the base path when joining: "https://x/v1" must become "https://x/v1/rpc/..."
    let base = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };
    let endpoint = Url::parse(&base)
      .and_then(|u| u.join(RESOLVE_PATH))
      .map_err(|e| ResolverError::Config(format!("invalid resolver url {}: {}", base_url, e)))?;

    let client = Client::builder().timeout(timeout).build()?;

    Ok(Self {
      client,
      endpoint,
      api_key,
    })
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }
}

#[async_trait]
impl EquipmentResolver for HttpEquipmentResolver {
  async fn resolve(&self, request: &ResolveRequest) -> Result<Option<ResolveResult>, ResolverError> {
    let mut builder = self.client.post(self.endpoint.clone()).json(request);
    if let Some(key) = &self.api_key {
      builder = builder.bearer_auth(key).header("apikey", key);
    }

    let response = builder.send().await?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
      return Ok(None);
    }

    let body = response.text().await?;

    if !status.is_success() {
      return Err(ResolverError::Api(format!("HTTP {}: {}", status, body)));
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
      return Ok(None);
    }

    serde_json::from_str::<ResolveResult>(trimmed)
      .map(Some)
      .map_err(|e| ResolverError::Parse(format!("{}: {}", e, trimmed)))
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
