//! Request and response bodies exchanged with the evaluation backend.
//!
//! Field names follow the backend (`prompt_text`, `model_results`, ...).
//! Aggregate fields on a batch response are optional; the dispatcher fills
//! gaps from the per-prompt results.

use aivis_core::{
    CompanyProfile, CompetitorInsight, Evaluation, EvaluationResult, Prompt, PromptId,
    ProviderKind, Source,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct WirePrompt<'a> {
    pub id: &'a str,
    pub prompt_text: &'a str,
    pub intent_category: &'a str,
}

impl<'a> From<&'a Prompt> for WirePrompt<'a> {
    fn from(p: &'a Prompt) -> Self {
        Self {
            id: p.id.as_str(),
            prompt_text: &p.text,
            intent_category: &p.intent_category,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchRequest<'a> {
    pub company_profile: &'a CompanyProfile,
    pub prompts: Vec<WirePrompt<'a>>,
    pub use_google_search: bool,
    pub provider: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SingleRequest<'a> {
    pub company_profile: &'a CompanyProfile,
    pub prompt: WirePrompt<'a>,
    pub use_google_search: bool,
    pub provider: &'a str,
}

/// One provider's answer to a whole batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchPayload {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub key_findings: Option<Vec<String>>,
    #[serde(default)]
    pub optimizer_tips: Option<Vec<String>>,
    #[serde(default)]
    pub competitor_summary: Option<Vec<String>>,
    #[serde(default)]
    pub competitor_insights: Option<Vec<CompetitorInsight>>,
    /// Ordered like the request's prompt list.
    #[serde(alias = "results")]
    pub model_results: Vec<ResultPayload>,
}

/// One provider's answer to one prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultPayload {
    /// Echo of the request prompt id, when the backend supports it.
    #[serde(default)]
    pub prompt_id: Option<PromptId>,
    #[serde(default)]
    pub model_name: Option<String>,
    pub response_text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub evaluation: Evaluation,
}

impl ResultPayload {
    /// Bind this payload to the unit it answers.
    pub fn into_result(self, prompt_id: PromptId, provider: ProviderKind) -> EvaluationResult {
        let mut evaluation = self.evaluation;
        evaluation.accuracy_score = if evaluation.accuracy_score.is_finite() {
            evaluation.accuracy_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        EvaluationResult {
            prompt_id,
            provider,
            model_name: self.model_name,
            response_text: self.response_text,
            sources: self.sources,
            evaluation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aivis_core::{IdentityAssigner, RawPrompt, SourceTag};

    const BACKEND_REPORT: &str = r#"{
        "company_name": "Acme",
        "overall_score": 64.5,
        "queries_tested": ["best crm"],
        "model_results": [{
            "model_name": "gemini-1.5-flash",
            "response_text": "Acme and Globex lead the market.",
            "evaluation": {
                "brand_present": true,
                "url_cited": false,
                "recommendation_rank": 1,
                "accuracy_score": 1.4,
                "sentiment": "Positive",
                "competitors_mentioned": ["Globex"],
                "competitor_ranks": [{"name": "Globex", "rank": 2, "url_cited": true}]
            },
            "sources": [{"title": "Acme", "url": "https://acme.io", "is_grounded": true}]
        }],
        "key_findings": ["Brand mention rate: 1/1"],
        "optimizer_tips": [],
        "competitor_summary": ["Globex: Appearances=1, Avg Rank=2"]
    }"#;

    #[test]
    fn decodes_backend_report() {
        let payload: BatchPayload = serde_json::from_str(BACKEND_REPORT).unwrap();
        assert_eq!(payload.overall_score, Some(64.5));
        assert_eq!(payload.model_results.len(), 1);
        assert!(payload.competitor_insights.is_none());

        let r = payload.model_results[0].clone();
        assert!(r.prompt_id.is_none());
        assert_eq!(r.sources[0].title.as_deref(), Some("Acme"));
        assert_eq!(r.evaluation.competitor_ranks[0].rank, Some(2));
    }

    #[test]
    fn missing_results_is_a_decode_error() {
        let err = serde_json::from_str::<BatchPayload>(r#"{"overall_score": 10}"#);
        assert!(err.is_err());
    }

    #[test]
    fn into_result_clamps_accuracy() {
        let payload: BatchPayload = serde_json::from_str(BACKEND_REPORT).unwrap();
        let r = payload.model_results[0]
            .clone()
            .into_result("p-1".into(), ProviderKind::Grounded);
        assert_eq!(r.evaluation.accuracy_score, 1.0);
        assert_eq!(r.prompt_id.as_str(), "p-1");
        assert_eq!(r.provider, ProviderKind::Grounded);
    }

    #[test]
    fn batch_request_encoding() {
        let assigner = IdentityAssigner::new();
        let prompts = assigner.assign_all(
            vec![RawPrompt::new("best crm", "Unbiased Discovery")],
            SourceTag::Generated,
        );
        let profile = CompanyProfile::new("Acme");
        let body = BatchRequest {
            company_profile: &profile,
            prompts: prompts.iter().map(WirePrompt::from).collect(),
            use_google_search: true,
            provider: "gemini",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["use_google_search"], true);
        assert_eq!(json["provider"], "gemini");
        assert_eq!(json["company_profile"]["company_name"], "Acme");
        assert_eq!(json["prompts"][0]["prompt_text"], "best crm");
        assert_eq!(json["prompts"][0]["id"], prompts[0].id.as_str());
    }
}
