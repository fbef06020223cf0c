//! Scripted in-memory gateways for orchestrator tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aivis_core::{
    CompanyProfile, Evaluation, EvaluationResult, IdentityAssigner, Prompt, ProviderKind,
    RawPrompt, Sentiment, SourceTag,
};
use aivis_gateway::{BatchPayload, GatewayError, Gateways, ProviderGateway, ResultPayload};
use async_trait::async_trait;
use tokio::sync::Barrier;

type Script = Box<dyn Fn(&[Prompt]) -> Result<BatchPayload, GatewayError> + Send + Sync>;

pub(crate) struct StubGateway {
    script: Script,
    delay: Option<Duration>,
    barrier: Option<Arc<Barrier>>,
    calls: AtomicUsize,
}

impl StubGateway {
    pub(crate) fn from_fn(
        f: impl Fn(&[Prompt]) -> Result<BatchPayload, GatewayError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(f),
            delay: None,
            barrier: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers every prompt in order; `response_text` echoes the prompt text.
    pub(crate) fn scored(score: f64) -> Self {
        Self::from_fn(move |prompts| {
            Ok(BatchPayload {
                overall_score: Some(score),
                key_findings: Some(vec![format!("finding at {score}")]),
                optimizer_tips: Some(vec![format!("tip at {score}")]),
                model_results: prompts.iter().map(|p| payload(&p.text, None)).collect(),
                ..BatchPayload::default()
            })
        })
    }

    /// Call `n` scores `10 * n` with findings naming the round; only round 1 writes tips.
    pub(crate) fn shifting() -> Self {
        let round = AtomicUsize::new(0);
        Self::from_fn(move |prompts| {
            let n = round.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(BatchPayload {
                overall_score: Some(10.0 * n as f64),
                key_findings: Some(vec![format!("finding from round {n}")]),
                optimizer_tips: (n == 1).then(|| vec!["tip from round 1".to_string()]),
                model_results: prompts.iter().map(|p| payload(&p.text, None)).collect(),
                ..BatchPayload::default()
            })
        })
    }

    /// Answers the first call, then the backend is unreachable.
    pub(crate) fn once() -> Self {
        let round = AtomicUsize::new(0);
        Self::from_fn(move |prompts| {
            if round.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(GatewayError::Unreachable("connection refused".into()));
            }
            Ok(BatchPayload {
                overall_score: Some(50.0),
                model_results: prompts.iter().map(|p| payload(&p.text, None)).collect(),
                ..BatchPayload::default()
            })
        })
    }

    pub(crate) fn failing(status: u16) -> Self {
        Self::from_fn(move |_| {
            Err(GatewayError::Server {
                status,
                body: format!("status {status}"),
            })
        })
    }

    pub(crate) fn unreachable() -> Self {
        Self::from_fn(|_| Err(GatewayError::Unreachable("connection refused".into())))
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Wait on `barrier` before answering.
    pub(crate) fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ProviderGateway for StubGateway {
    async fn evaluate_batch(
        &self,
        _profile: &CompanyProfile,
        prompts: &[Prompt],
    ) -> Result<BatchPayload, GatewayError> {
        self.pause().await;
        (self.script)(prompts)
    }

    async fn evaluate_prompt(
        &self,
        _profile: &CompanyProfile,
        prompt: &Prompt,
    ) -> Result<ResultPayload, GatewayError> {
        self.pause().await;
        let batch = (self.script)(std::slice::from_ref(prompt))?;
        batch
            .model_results
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Malformed("empty response".into()))
    }
}

pub(crate) fn gateways(
    standard: &Arc<StubGateway>,
    alternate: &Arc<StubGateway>,
    grounded: &Arc<StubGateway>,
) -> Gateways {
    Gateways::new(standard.clone(), alternate.clone(), grounded.clone())
}

pub(crate) fn payload(text: &str, prompt_id: Option<&str>) -> ResultPayload {
    ResultPayload {
        prompt_id: prompt_id.map(Into::into),
        model_name: Some("stub".into()),
        response_text: text.to_string(),
        sources: vec![],
        evaluation: evaluation(true, 0.5),
    }
}

pub(crate) fn evaluation(brand_present: bool, accuracy: f64) -> Evaluation {
    Evaluation {
        brand_present,
        url_cited: false,
        sentiment: Sentiment::Neutral,
        accuracy_score: accuracy,
        recommendation_rank: brand_present.then_some(1),
        competitor_ranks: vec![],
    }
}

pub(crate) fn result(prompt_id: &str, provider: ProviderKind, text: &str) -> EvaluationResult {
    EvaluationResult {
        prompt_id: prompt_id.into(),
        provider,
        model_name: None,
        response_text: text.to_string(),
        sources: vec![],
        evaluation: evaluation(true, 0.5),
    }
}

pub(crate) fn prompts(texts: &[&str]) -> Vec<Prompt> {
    IdentityAssigner::new().assign_all(
        texts.iter().map(|t| RawPrompt::new(*t, "Unbiased Discovery")),
        SourceTag::Generated,
    )
}

pub(crate) fn profile() -> CompanyProfile {
    CompanyProfile::new("Acme")
}
