//! HTTP gateway for the evaluation backend's `/evaluate-all` and
//! `/evaluate-prompt` endpoints.

use std::time::Duration;

use aivis_core::{CompanyProfile, Prompt, ProviderKind};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::wire::{BatchRequest, SingleRequest, WirePrompt};
use crate::{BatchPayload, GatewayConfig, GatewayError, ProviderGateway, ResultPayload};

/// Longest server error body kept in a [`GatewayError::Server`].
const MAX_ERROR_BODY: usize = 512;

/// Gateway bound to one provider kind on the evaluation backend.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    kind: ProviderKind,
    provider: String,
    use_google_search: bool,
}

impl HttpGateway {
    /// Create a gateway for `kind`, routed as `config` describes.
    pub fn new(config: &GatewayConfig, kind: ProviderKind) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let route = config.route(kind);
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            kind,
            provider: route.provider.clone(),
            use_google_search: route.use_google_search,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, provider = %self.kind, "posting to evaluation backend");

        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Server {
                status: status.as_u16(),
                body: server_message(&text),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ProviderGateway for HttpGateway {
    async fn evaluate_batch(
        &self,
        profile: &CompanyProfile,
        prompts: &[Prompt],
    ) -> Result<BatchPayload, GatewayError> {
        let body = BatchRequest {
            company_profile: profile,
            prompts: prompts.iter().map(WirePrompt::from).collect(),
            use_google_search: self.use_google_search,
            provider: &self.provider,
        };
        info!(
            provider = %self.kind,
            backend = %self.provider,
            count = prompts.len(),
            "requesting batch evaluation"
        );
        let payload: BatchPayload = self.post_json("evaluate-all", &body).await?;
        info!(
            provider = %self.kind,
            results = payload.model_results.len(),
            "batch evaluation returned"
        );
        Ok(payload)
    }

    async fn evaluate_prompt(
        &self,
        profile: &CompanyProfile,
        prompt: &Prompt,
    ) -> Result<ResultPayload, GatewayError> {
        let body = SingleRequest {
            company_profile: profile,
            prompt: WirePrompt::from(prompt),
            use_google_search: self.use_google_search,
            provider: &self.provider,
        };
        info!(provider = %self.kind, prompt_id = %prompt.id, "requesting prompt evaluation");
        self.post_json("evaluate-prompt", &body).await
    }
}

/// Extract a readable message from an error body.
///
/// The backend reports failures as `{"detail": "..."}`; anything else is kept
/// verbatim, truncated.
fn server_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(serde_json::Value::String(detail)) = map.get("detail") {
            return detail.clone();
        }
    }
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
