//! Batch and single-unit dispatch to one provider.
//!
//! A batch call is all-or-nothing: either every returned result is written to
//! the store and its unit marked succeeded, or nothing is written and every
//! unit in the batch is marked failed.

use std::collections::HashMap;
use std::sync::Arc;

use aivis_core::scoring;
use aivis_core::{
    BatchReport, CompanyProfile, EvaluationResult, Prompt, PromptId, ProviderKind,
};
use aivis_gateway::{BatchPayload, Gateways, ResultPayload};
use tracing::{info, warn};

use crate::{DispatchError, DispatchErrorKind, ResultStore, Tracker, UnitPhase};

pub struct Dispatcher {
    gateways: Gateways,
    tracker: Arc<Tracker>,
    store: Arc<ResultStore>,
}

impl Dispatcher {
    pub fn new(gateways: Gateways, tracker: Arc<Tracker>, store: Arc<ResultStore>) -> Self {
        Self {
            gateways,
            tracker,
            store,
        }
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Evaluate every prompt against `provider` in one gateway call.
    ///
    /// A short response is a degraded success: the returned report lists the
    /// unanswered prompts in `missing`, and their units are marked failed.
    pub async fn run_batch(
        &self,
        provider: ProviderKind,
        prompts: &[Prompt],
        profile: &CompanyProfile,
    ) -> Result<BatchReport, DispatchError> {
        let ids: Vec<&PromptId> = prompts.iter().map(|p| &p.id).collect();
        self.tracker
            .set_phase_all(ids.iter().copied(), provider, UnitPhase::InFlight, None);
        info!(provider = %provider, count = prompts.len(), "dispatching batch");

        let payload = match self
            .gateways
            .get(provider)
            .evaluate_batch(profile, prompts)
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                let err = DispatchError::from_gateway(provider, &e);
                warn!(provider = %provider, error = %err, "batch failed");
                self.tracker.set_phase_all(
                    ids.iter().copied(),
                    provider,
                    UnitPhase::Failed,
                    Some(&err.to_string()),
                );
                return Err(err);
            }
        };

        let report = build_report(provider, prompts, payload);

        let answered: Vec<PromptId> = report
            .per_prompt_results
            .iter()
            .map(|r| r.prompt_id.clone())
            .collect();
        self.store
            .put_batch(provider, report.per_prompt_results.iter().cloned());
        self.tracker
            .set_phase_all(&answered, provider, UnitPhase::Succeeded, None);

        if report.is_partial() {
            let partial = DispatchError::new(
                provider,
                DispatchErrorKind::PartialBatch,
                format!(
                    "{} of {} prompts unanswered",
                    report.missing.len(),
                    prompts.len()
                ),
            );
            warn!(provider = %provider, error = %partial, "partial batch");
            self.tracker.set_phase_all(
                &report.missing,
                provider,
                UnitPhase::Failed,
                Some(&partial.to_string()),
            );
        }

        info!(
            provider = %provider,
            score = report.overall_score,
            answered = answered.len(),
            "batch complete"
        );
        Ok(report)
    }

    /// Evaluate one prompt against `provider`, with the same all-or-nothing
    /// semantics as a batch, scoped to one unit.
    pub async fn run_single(
        &self,
        provider: ProviderKind,
        prompt: &Prompt,
        profile: &CompanyProfile,
    ) -> Result<EvaluationResult, DispatchError> {
        self.tracker
            .set_phase(&prompt.id, provider, UnitPhase::InFlight, None);

        let outcome = self
            .gateways
            .get(provider)
            .evaluate_prompt(profile, prompt)
            .await
            .map_err(|e| DispatchError::from_gateway(provider, &e))
            .and_then(|payload| bind_single(provider, prompt, payload));

        match outcome {
            Ok(result) => {
                self.store.put(result.clone());
                self.tracker
                    .set_phase(&prompt.id, provider, UnitPhase::Succeeded, None);
                info!(provider = %provider, prompt_id = %prompt.id, "prompt evaluated");
                Ok(result)
            }
            Err(err) => {
                warn!(provider = %provider, prompt_id = %prompt.id, error = %err, "prompt evaluation failed");
                self.tracker.set_phase(
                    &prompt.id,
                    provider,
                    UnitPhase::Failed,
                    Some(err.to_string()),
                );
                Err(err)
            }
        }
    }
}

fn bind_single(
    provider: ProviderKind,
    prompt: &Prompt,
    payload: ResultPayload,
) -> Result<EvaluationResult, DispatchError> {
    match &payload.prompt_id {
        Some(echo) if *echo != prompt.id => Err(DispatchError::new(
            provider,
            DispatchErrorKind::MalformedResponse,
            format!("response is for prompt {echo}, expected {}", prompt.id),
        )),
        _ => Ok(payload.into_result(prompt.id.clone(), provider)),
    }
}

/// Pair returned results with the prompts they answer.
///
/// When every result echoes a prompt id, results are matched by id: unknown
/// ids are dropped and the last duplicate wins. Otherwise index `i` of the
/// response belongs to index `i` of the request; surplus results are
/// dropped and trailing prompts stay unanswered.
///
/// Returns the results in prompt order and the unanswered prompt ids.
pub(crate) fn associate(
    provider: ProviderKind,
    prompts: &[Prompt],
    results: Vec<ResultPayload>,
) -> (Vec<EvaluationResult>, Vec<PromptId>) {
    let echoed = !results.is_empty() && results.iter().all(|r| r.prompt_id.is_some());

    let mut by_position: Vec<Option<ResultPayload>> = if echoed {
        let mut by_id: HashMap<PromptId, ResultPayload> = HashMap::with_capacity(results.len());
        for r in results {
            if let Some(id) = r.prompt_id.clone() {
                by_id.insert(id, r);
            }
        }
        let slots: Vec<Option<ResultPayload>> =
            prompts.iter().map(|p| by_id.remove(&p.id)).collect();
        if !by_id.is_empty() {
            warn!(provider = %provider, dropped = by_id.len(), "results echo unknown prompt ids");
        }
        slots
    } else {
        if results.len() > prompts.len() {
            warn!(
                provider = %provider,
                expected = prompts.len(),
                got = results.len(),
                "dropping surplus results"
            );
        }
        let mut iter = results.into_iter();
        prompts.iter().map(|_| iter.next()).collect()
    };

    let mut answered = Vec::with_capacity(prompts.len());
    let mut missing = Vec::new();
    for (prompt, slot) in prompts.iter().zip(by_position.iter_mut()) {
        match slot.take() {
            Some(payload) => answered.push(payload.into_result(prompt.id.clone(), provider)),
            None => missing.push(prompt.id.clone()),
        }
    }
    (answered, missing)
}

/// Fold a gateway payload into a [`BatchReport`], deriving any aggregate the
/// provider left out from the per-prompt results.
pub(crate) fn build_report(
    provider: ProviderKind,
    prompts: &[Prompt],
    payload: BatchPayload,
) -> BatchReport {
    let BatchPayload {
        overall_score,
        key_findings,
        optimizer_tips,
        competitor_summary,
        competitor_insights,
        model_results,
        ..
    } = payload;

    let (results, missing) = associate(provider, prompts, model_results);

    let overall_score = match overall_score {
        Some(s) if s.is_finite() => s.clamp(0.0, 100.0),
        _ => scoring::visibility_score(&results, prompts.len()),
    };
    let key_findings = match key_findings {
        Some(f) if !f.is_empty() => f,
        _ => scoring::default_findings(&results, prompts.len()),
    };
    let competitor_summary =
        competitor_summary.unwrap_or_else(|| scoring::competitor_summary(&results));
    let competitor_insights = competitor_insights.unwrap_or_else(|| {
        let text: HashMap<&PromptId, &str> =
            prompts.iter().map(|p| (&p.id, p.text.as_str())).collect();
        let pairs: Vec<(&str, &EvaluationResult)> = results
            .iter()
            .map(|r| (text.get(&r.prompt_id).copied().unwrap_or_default(), r))
            .collect();
        scoring::competitor_insights(&pairs)
    });

    BatchReport {
        provider,
        overall_score,
        key_findings,
        optimizer_tips: optimizer_tips.unwrap_or_default(),
        competitor_summary,
        competitor_insights,
        per_prompt_results: results,
        missing,
    }
}
