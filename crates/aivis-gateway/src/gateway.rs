//! The provider gateway contract.

use std::sync::Arc;

use aivis_core::{CompanyProfile, Prompt, ProviderKind};
use async_trait::async_trait;

use crate::{BatchPayload, GatewayError, ResultPayload};

/// One evaluation provider.
///
/// Each instance is bound to a single [`ProviderKind`]; grounding and backend
/// model selection are fixed at construction. The company profile is passed
/// through untouched.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Evaluate every prompt in one call. `model_results` must come back in
    /// the order of `prompts`.
    async fn evaluate_batch(
        &self,
        profile: &CompanyProfile,
        prompts: &[Prompt],
    ) -> Result<BatchPayload, GatewayError>;

    /// Evaluate a single prompt.
    async fn evaluate_prompt(
        &self,
        profile: &CompanyProfile,
        prompt: &Prompt,
    ) -> Result<ResultPayload, GatewayError>;
}

/// The fixed set of three gateways an audit fans out to.
#[derive(Clone)]
pub struct Gateways {
    slots: [Arc<dyn ProviderGateway>; 3],
}

impl Gateways {
    pub fn new(
        standard: Arc<dyn ProviderGateway>,
        alternate: Arc<dyn ProviderGateway>,
        grounded: Arc<dyn ProviderGateway>,
    ) -> Self {
        Self {
            slots: [standard, alternate, grounded],
        }
    }

    pub fn get(&self, kind: ProviderKind) -> &Arc<dyn ProviderGateway> {
        &self.slots[kind.index()]
    }
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways").finish_non_exhaustive()
    }
}
