//! Gateway configuration: backend location and per-provider routing.

use std::sync::Arc;

use aivis_core::ProviderKind;
use serde::{Deserialize, Serialize};

use crate::{GatewayError, Gateways, HttpGateway};

/// Which backend model serves a provider kind, and whether it is grounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRoute {
    pub provider: String,
    pub use_google_search: bool,
}

impl ProviderRoute {
    pub fn new(provider: impl Into<String>, use_google_search: bool) -> Self {
        Self {
            provider: provider.into(),
            use_google_search,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend base URL, without trailing slash.
    pub base_url: String,
    pub timeout_secs: u64,
    pub standard: ProviderRoute,
    pub alternate: ProviderRoute,
    pub grounded: ProviderRoute,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            standard: ProviderRoute::new("gemini", false),
            alternate: ProviderRoute::new("openrouter", false),
            grounded: ProviderRoute::new("gemini", true),
        }
    }
}

impl GatewayConfig {
    pub fn route(&self, kind: ProviderKind) -> &ProviderRoute {
        match kind {
            ProviderKind::Standard => &self.standard,
            ProviderKind::Alternate => &self.alternate,
            ProviderKind::Grounded => &self.grounded,
        }
    }

    /// Select the backend model for the standard provider.
    ///
    /// Only affects [`ProviderKind::Standard`]; the set of three providers in
    /// an audit is fixed.
    pub fn with_standard_provider(mut self, provider: impl Into<String>) -> Self {
        self.standard.provider = provider.into();
        self
    }
}

/// Build one [`HttpGateway`] per provider kind.
pub fn http_gateways(config: &GatewayConfig) -> Result<Gateways, GatewayError> {
    let build = |kind| -> Result<Arc<dyn crate::ProviderGateway>, GatewayError> {
        Ok(Arc::new(HttpGateway::new(config, kind)?))
    };
    Ok(Gateways::new(
        build(ProviderKind::Standard)?,
        build(ProviderKind::Alternate)?,
        build(ProviderKind::Grounded)?,
    ))
}
