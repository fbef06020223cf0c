//! Per-prompt evaluation results returned by a provider.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{PromptId, ProviderKind};

/// Tone of a model response towards the audited company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(alias = "positive", alias = "POSITIVE")]
    Positive,
    #[default]
    #[serde(alias = "neutral", alias = "NEUTRAL")]
    Neutral,
    #[serde(alias = "negative", alias = "NEGATIVE")]
    Negative,
    #[serde(other)]
    Unknown,
}

/// A cited source supporting a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Where a competitor appeared in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorRank {
    pub name: String,
    /// Position in the response's list, `None` if mentioned but not ranked.
    #[serde(default, deserialize_with = "positive_rank")]
    pub rank: Option<u32>,
    #[serde(default)]
    pub url_cited: bool,
}

/// The auditor's judgement of one response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub brand_present: bool,
    #[serde(default)]
    pub url_cited: bool,
    #[serde(default)]
    pub sentiment: Sentiment,
    /// In `[0, 1]`.
    pub accuracy_score: f64,
    /// `None` means the company was not mentioned.
    #[serde(default, deserialize_with = "positive_rank")]
    pub recommendation_rank: Option<u32>,
    #[serde(default)]
    pub competitor_ranks: Vec<CompetitorRank>,
}

/// Ranks come from model output; anything below 1 reads as not ranked.
fn positive_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|r| r.is_finite() && *r >= 1.0 && *r <= u32::MAX as f64)
        .map(|r| r.round() as u32))
}

/// The outcome of one (prompt, provider) unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub prompt_id: PromptId,
    pub provider: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub response_text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub evaluation: Evaluation,
}

/// Rank badge for a unit: `#N`, `Not ranked`, or `N/A` when there is no result.
pub fn rank_label(result: Option<&EvaluationResult>) -> String {
    match result {
        None => "N/A".to_string(),
        Some(r) => match r.evaluation.recommendation_rank {
            Some(rank) => format!("#{rank}"),
            None => "Not ranked".to_string(),
        },
    }
}
