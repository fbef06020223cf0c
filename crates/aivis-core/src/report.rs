//! Provider-level and composite audit reports.

use serde::{Deserialize, Serialize};

use crate::{EvaluationResult, PromptId, ProviderKind};

/// Aggregated view of one competitor across a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorInsight {
    pub name: String,
    #[serde(default)]
    pub mentions: u32,
    #[serde(default)]
    pub avg_rank: Option<f64>,
    #[serde(default)]
    pub prompts_appeared: Vec<String>,
    #[serde(default)]
    pub visibility_reason: String,
}

/// The complete outcome of one provider batch.
///
/// Published whole or not at all: a failed batch never yields a `BatchReport`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub provider: ProviderKind,
    /// In `[0, 100]`.
    pub overall_score: f64,
    pub key_findings: Vec<String>,
    pub optimizer_tips: Vec<String>,
    pub competitor_summary: Vec<String>,
    pub competitor_insights: Vec<CompetitorInsight>,
    /// Aligned with the batch's prompt list, minus any trailing prompts in `missing`.
    pub per_prompt_results: Vec<EvaluationResult>,
    /// Prompts the provider returned no result for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<PromptId>,
}

impl BatchReport {
    /// True when the provider answered fewer prompts than it was asked.
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Blended report across every provider batch that succeeded.
///
/// Built fresh on every aggregation; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeReport {
    /// Mean of the contributing batches' scores, one decimal place.
    pub overall_score: f64,
    pub is_composite: bool,
    pub provider_count: usize,
    /// Providers whose batches contributed, in dispatch order.
    pub providers: Vec<ProviderKind>,
    /// Provider whose findings, tips and competitor data were copied.
    pub source_batch: ProviderKind,
    pub key_findings: Vec<String>,
    pub optimizer_tips: Vec<String>,
    pub competitor_summary: Vec<String>,
    pub competitor_insights: Vec<CompetitorInsight>,
}
