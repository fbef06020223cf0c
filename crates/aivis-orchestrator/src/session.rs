//! Audit session: the prompt list and all per-session evaluation state.
//!
//! Everything here lives for one session and is dropped on [`reset`](AuditSession::reset).
//! Nothing is persisted.
//!
//! Each prompt list the session adopts (ingest, refresh, reset) starts a new
//! generation with its own tracker and store. Dispatches still running from an
//! earlier generation finish into that generation's state, which nothing reads
//! any more, and their composite is never published.

use std::sync::{Arc, RwLock};

use aivis_core::{
    CompanyProfile, CompositeReport, EvaluationResult, IdentityAssigner, Prompt, PromptId,
    ProviderKind, RawPrompt, SourceTag, rank_label,
};
use aivis_gateway::Gateways;
use futures::future::join_all;
use tracing::{info, warn};

use crate::{AuditOutcome, DispatchError, DispatchErrorKind, Orchestrator, ResultStore, Tracker};

pub const MANUAL_INTENT: &str = "Manual Custom";
pub const BULK_INTENT: &str = "Bulk Import";

struct State {
    generation: u64,
    orchestrator: Orchestrator,
    prompts: Vec<Prompt>,
    composite: Option<Arc<CompositeReport>>,
}

pub struct AuditSession {
    gateways: Gateways,
    assigner: IdentityAssigner,
    state: RwLock<State>,
}

impl AuditSession {
    pub fn new(gateways: Gateways) -> Self {
        Self {
            state: RwLock::new(State {
                generation: 0,
                orchestrator: Orchestrator::new(gateways.clone()),
                prompts: Vec::new(),
                composite: None,
            }),
            gateways,
            assigner: IdentityAssigner::new(),
        }
    }

    /// Tracker of the current generation.
    pub fn tracker(&self) -> Arc<Tracker> {
        Arc::clone(crate::lock::read(&self.state).orchestrator.tracker())
    }

    /// Result store of the current generation.
    pub fn store(&self) -> Arc<ResultStore> {
        Arc::clone(crate::lock::read(&self.state).orchestrator.store())
    }

    /// Current prompt list, newest additions first.
    pub fn prompts(&self) -> Vec<Prompt> {
        crate::lock::read(&self.state).prompts.clone()
    }

    pub fn prompt(&self, id: &PromptId) -> Option<Prompt> {
        crate::lock::read(&self.state)
            .prompts
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    /// Latest composite report; `None` before any audit or when no provider succeeded.
    pub fn composite(&self) -> Option<Arc<CompositeReport>> {
        crate::lock::read(&self.state).composite.clone()
    }

    /// Start over with a freshly generated prompt list.
    pub fn ingest_generated(&self, raw: Vec<RawPrompt>) -> Vec<Prompt> {
        let prompts = self.assigner.assign_all(raw, SourceTag::Generated);
        let mut state = crate::lock::write(&self.state);
        self.advance(&mut state);
        state.prompts = prompts.clone();
        state.composite = None;
        info!(count = prompts.len(), generation = state.generation, "ingested generated prompts");
        prompts
    }

    /// Prepend one user-written prompt. Blank text is ignored.
    pub fn add_manual(&self, text: &str) -> Option<Prompt> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let prompt = self
            .assigner
            .assign(RawPrompt::new(text, MANUAL_INTENT), SourceTag::Manual, 0);
        crate::lock::write(&self.state).prompts.insert(0, prompt.clone());
        Some(prompt)
    }

    /// Prepend one prompt per non-blank line, keeping their order.
    pub fn import_bulk(&self, text: &str) -> Vec<Prompt> {
        let raw = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| RawPrompt::new(l, BULK_INTENT));
        let imported = self.assigner.assign_all(raw, SourceTag::Bulk);
        let mut state = crate::lock::write(&self.state);
        state.prompts.splice(0..0, imported.iter().cloned());
        info!(count = imported.len(), "imported prompts");
        imported
    }

    /// Replace the prompt list. Results and unit states of the old prompts are
    /// dropped; the last composite stays until the next audit.
    pub fn refresh(&self, raw: Vec<RawPrompt>) -> Vec<Prompt> {
        let prompts = self.assigner.assign_all(raw, SourceTag::Refreshed);
        let mut state = crate::lock::write(&self.state);
        self.advance(&mut state);
        state.prompts = prompts.clone();
        info!(count = prompts.len(), generation = state.generation, "refreshed prompts");
        prompts
    }

    /// Drop every prompt, result, unit state and the composite report.
    pub fn reset(&self) {
        let mut state = crate::lock::write(&self.state);
        self.advance(&mut state);
        state.prompts.clear();
        state.composite = None;
    }

    /// Audit the current prompt list on all three providers.
    ///
    /// A provider with any unit of the list already in flight is skipped and
    /// reported as an `InFlight` failure. The stored composite is replaced by
    /// this audit's, including by `None`, unless the session moved to a new
    /// prompt list while the audit ran.
    pub async fn run_audit(&self, profile: &CompanyProfile) -> AuditOutcome {
        let (generation, orchestrator, prompts) = {
            let state = crate::lock::read(&self.state);
            (state.generation, state.orchestrator.clone(), state.prompts.clone())
        };

        let mut claimed = Vec::with_capacity(ProviderKind::ALL.len());
        let mut busy = Vec::new();
        for provider in ProviderKind::ALL {
            if orchestrator
                .tracker()
                .try_begin_all(prompts.iter().map(|p| &p.id), provider)
            {
                claimed.push(provider);
            } else {
                warn!(provider = %provider, "skipping provider with units in flight");
                busy.push(DispatchError::new(
                    provider,
                    DispatchErrorKind::InFlight,
                    "prompts are already being evaluated",
                ));
            }
        }

        let mut outcome = orchestrator.audit_on(&prompts, &claimed, profile).await;
        outcome.failures.extend(busy);

        let mut state = crate::lock::write(&self.state);
        if state.generation == generation {
            state.composite = outcome.composite.clone().map(Arc::new);
        } else {
            warn!(generation, current = state.generation, "discarding audit of a replaced prompt list");
        }
        outcome
    }

    /// Re-run one unit. Refused without a gateway call if the unit is already in flight.
    pub async fn rerun(
        &self,
        prompt_id: &PromptId,
        provider: ProviderKind,
        profile: &CompanyProfile,
    ) -> Result<EvaluationResult, DispatchError> {
        let (generation, orchestrator, prompt) = {
            let state = crate::lock::read(&self.state);
            let prompt = state
                .prompts
                .iter()
                .find(|p| &p.id == prompt_id)
                .cloned()
                .ok_or_else(|| unknown_prompt(prompt_id, provider))?;
            (state.generation, state.orchestrator.clone(), prompt)
        };
        if !orchestrator.tracker().try_begin(prompt_id, provider) {
            return Err(in_flight(prompt_id, provider));
        }

        let result = orchestrator.evaluate_one(&prompt, provider, profile).await;
        if crate::lock::read(&self.state).generation != generation {
            return Err(DispatchError::new(
                provider,
                DispatchErrorKind::Aborted,
                format!("prompt {prompt_id} left the session while it was evaluated"),
            ));
        }
        result
    }

    /// Re-run one prompt on every provider that is not already busy with it.
    pub async fn rerun_all_providers(
        &self,
        prompt_id: &PromptId,
        profile: &CompanyProfile,
    ) -> Vec<(ProviderKind, Result<EvaluationResult, DispatchError>)> {
        let runs = ProviderKind::ALL
            .map(|provider| async move { (provider, self.rerun(prompt_id, provider, profile).await) });
        join_all(runs).await
    }

    /// Rank badge for one unit.
    pub fn rank_label(&self, prompt_id: &PromptId, provider: ProviderKind) -> String {
        rank_label(self.store().result_for(prompt_id, provider).as_ref())
    }

    /// Move to a new generation with empty tracker and store.
    fn advance(&self, state: &mut State) {
        state.generation += 1;
        state.orchestrator = Orchestrator::new(self.gateways.clone());
    }
}

fn unknown_prompt(prompt_id: &PromptId, provider: ProviderKind) -> DispatchError {
    DispatchError::new(
        provider,
        DispatchErrorKind::UnknownPrompt,
        format!("no prompt {prompt_id} in this session"),
    )
}

fn in_flight(prompt_id: &PromptId, provider: ProviderKind) -> DispatchError {
    DispatchError::new(
        provider,
        DispatchErrorKind::InFlight,
        format!("prompt {prompt_id} is already being evaluated"),
    )
}
