//! Orchestration driver: concurrent fan-out to the three providers.
//!
//! Each provider call runs as its own spawned task. Tasks are joined, not
//! raced: one provider failing never cancels the others, and a task keeps
//! running to completion even if the caller stops waiting, so the tracker
//! and store never keep a half-finished batch.

use std::sync::Arc;

use aivis_core::{
    BatchSet, CompanyProfile, CompositeReport, EvaluationResult, Prompt, ProviderKind, aggregate,
};
use aivis_gateway::Gateways;
use futures::future::join_all;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::{DispatchError, DispatchErrorKind, Dispatcher, ResultStore, Tracker, UnitPhase};

/// Everything one audit produced.
#[derive(Debug, Clone, Default)]
pub struct AuditOutcome {
    pub batches: BatchSet,
    pub failures: Vec<DispatchError>,
    /// `None` when no provider succeeded.
    pub composite: Option<CompositeReport>,
}

#[derive(Clone)]
pub struct Orchestrator {
    dispatcher: Arc<Dispatcher>,
}

impl Orchestrator {
    /// Orchestrator with fresh tracker and store.
    pub fn new(gateways: Gateways) -> Self {
        Self::with_state(gateways, Arc::new(Tracker::new()), Arc::new(ResultStore::new()))
    }

    pub fn with_state(gateways: Gateways, tracker: Arc<Tracker>, store: Arc<ResultStore>) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(gateways, tracker, store)),
        }
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        self.dispatcher.tracker()
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        self.dispatcher.store()
    }

    /// Run all three batches concurrently and aggregate whatever succeeded.
    pub async fn audit(&self, prompts: &[Prompt], profile: &CompanyProfile) -> AuditOutcome {
        self.audit_on(prompts, &ProviderKind::ALL, profile).await
    }

    /// Run batches for the given providers concurrently and aggregate whatever succeeded.
    pub async fn audit_on(
        &self,
        prompts: &[Prompt],
        providers: &[ProviderKind],
        profile: &CompanyProfile,
    ) -> AuditOutcome {
        if prompts.is_empty() {
            warn!("audit requested with no prompts");
            return AuditOutcome::default();
        }

        let prompts: Arc<[Prompt]> = prompts.into();
        let profile = Arc::new(profile.clone());

        let handles: Vec<_> = providers
            .iter()
            .map(|&kind| {
                let dispatcher = Arc::clone(&self.dispatcher);
                let prompts = Arc::clone(&prompts);
                let profile = Arc::clone(&profile);
                tokio::spawn(async move { dispatcher.run_batch(kind, &prompts, &profile).await })
            })
            .collect();

        let joined = join_all(handles).await;

        let mut outcome = AuditOutcome::default();
        for (&kind, joined) in providers.iter().zip(joined) {
            match joined {
                Ok(Ok(report)) => outcome.batches.insert(report),
                Ok(Err(err)) => outcome.failures.push(err),
                Err(join_err) => {
                    let err = self.abandon(kind, &prompts, join_err);
                    outcome.failures.push(err);
                }
            }
        }

        outcome.composite = aggregate(&outcome.batches);
        match &outcome.composite {
            Some(c) => info!(
                score = c.overall_score,
                providers = c.provider_count,
                base = %c.source_batch,
                "composite audit complete"
            ),
            None => warn!(failures = outcome.failures.len(), "no provider produced a report"),
        }
        outcome
    }

    /// Composite report over every provider that succeeded, or `None` if none did.
    pub async fn evaluate_all(
        &self,
        prompts: &[Prompt],
        profile: &CompanyProfile,
    ) -> Option<CompositeReport> {
        self.audit(prompts, profile).await.composite
    }

    /// Re-evaluate one prompt against one provider.
    pub async fn evaluate_one(
        &self,
        prompt: &Prompt,
        provider: ProviderKind,
        profile: &CompanyProfile,
    ) -> Result<EvaluationResult, DispatchError> {
        self.evaluate_one_on(prompt, &[provider], profile)
            .await
            .into_iter()
            .next()
            .map(|(_, r)| r)
            .unwrap_or_else(|| {
                Err(DispatchError::new(
                    provider,
                    DispatchErrorKind::Aborted,
                    "no dispatch was made",
                ))
            })
    }

    /// Re-evaluate one prompt against all three providers concurrently.
    ///
    /// Each provider succeeds or fails on its own.
    pub async fn evaluate_one_all_providers(
        &self,
        prompt: &Prompt,
        profile: &CompanyProfile,
    ) -> Vec<(ProviderKind, Result<EvaluationResult, DispatchError>)> {
        self.evaluate_one_on(prompt, &ProviderKind::ALL, profile).await
    }

    /// Re-evaluate one prompt against the given providers concurrently.
    pub async fn evaluate_one_on(
        &self,
        prompt: &Prompt,
        providers: &[ProviderKind],
        profile: &CompanyProfile,
    ) -> Vec<(ProviderKind, Result<EvaluationResult, DispatchError>)> {
        let prompt = Arc::new(prompt.clone());
        let profile = Arc::new(profile.clone());

        let handles: Vec<_> = providers
            .iter()
            .map(|&kind| {
                let dispatcher = Arc::clone(&self.dispatcher);
                let prompt = Arc::clone(&prompt);
                let profile = Arc::clone(&profile);
                tokio::spawn(async move { dispatcher.run_single(kind, &prompt, &profile).await })
            })
            .collect();

        let joined = join_all(handles).await;
        providers
            .iter()
            .zip(joined)
            .map(|(&kind, joined)| {
                let result = match joined {
                    Ok(r) => r,
                    Err(join_err) => Err(self.abandon(kind, std::slice::from_ref(&*prompt), join_err)),
                };
                (kind, result)
            })
            .collect()
    }

    /// A dispatch task died before settling its units; fail them so nothing stays in flight.
    fn abandon(&self, kind: ProviderKind, prompts: &[Prompt], join_err: JoinError) -> DispatchError {
        let err = DispatchError::new(kind, DispatchErrorKind::Aborted, join_err.to_string());
        warn!(provider = %kind, error = %err, "dispatch task ended abnormally");
        self.tracker().set_phase_all(
            prompts.iter().map(|p| &p.id),
            kind,
            UnitPhase::Failed,
            Some(&err.to_string()),
        );
        err
    }
}
