//! Batch-level scoring used when a provider omits its own aggregates.
//!
//! The visibility score weights brand presence at 70 and description accuracy
//! at 30:
//!
//! ```text
//! score = mentions / prompts * 70 + mean(accuracy) * 30
//! ```
//!
//! rounded to two decimals. An empty batch scores 0.

use crate::{CompetitorInsight, EvaluationResult};

const PRESENCE_WEIGHT: f64 = 70.0;
const ACCURACY_WEIGHT: f64 = 30.0;

/// Visibility score in `[0, 100]` for `results` out of `prompt_count` prompts asked.
pub fn visibility_score(results: &[EvaluationResult], prompt_count: usize) -> f64 {
    if prompt_count == 0 {
        return 0.0;
    }
    let mentions = mention_count(results);
    let score = mentions as f64 / prompt_count as f64 * PRESENCE_WEIGHT
        + mean_accuracy(results) * ACCURACY_WEIGHT;
    (score.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

pub fn mention_count(results: &[EvaluationResult]) -> usize {
    results.iter().filter(|r| r.evaluation.brand_present).count()
}

/// Mean accuracy across results, 0 for none.
pub fn mean_accuracy(results: &[EvaluationResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results
        .iter()
        .map(|r| r.evaluation.accuracy_score)
        .sum::<f64>()
        / results.len() as f64
}

/// Per-competitor aggregation in first-seen order.
///
/// `pairs` holds the prompt text alongside each result so insights can list
/// where a competitor appeared.
pub fn competitor_insights(pairs: &[(&str, &EvaluationResult)]) -> Vec<CompetitorInsight> {
    let mut insights: Vec<CompetitorInsight> = Vec::new();
    let mut ranks: Vec<Vec<u32>> = Vec::new();

    for (prompt_text, result) in pairs {
        for comp in &result.evaluation.competitor_ranks {
            let idx = match insights.iter().position(|i| i.name == comp.name) {
                Some(idx) => idx,
                None => {
                    insights.push(CompetitorInsight {
                        name: comp.name.clone(),
                        mentions: 0,
                        avg_rank: None,
                        prompts_appeared: Vec::new(),
                        visibility_reason: String::new(),
                    });
                    ranks.push(Vec::new());
                    insights.len() - 1
                }
            };
            let insight = &mut insights[idx];
            insight.mentions += 1;
            if !insight.prompts_appeared.iter().any(|p| p == prompt_text) {
                insight.prompts_appeared.push((*prompt_text).to_string());
            }
            if let Some(rank) = comp.rank {
                ranks[idx].push(rank);
            }
        }
    }

    for (insight, r) in insights.iter_mut().zip(&ranks) {
        if !r.is_empty() {
            insight.avg_rank = Some(r.iter().map(|&x| x as f64).sum::<f64>() / r.len() as f64);
        }
    }
    insights
}

/// One line per competitor: `"{name}: Appearances={n}, Avg Rank={avg|N/A}"`.
///
/// Appearances count ranked mentions only.
pub fn competitor_summary(results: &[EvaluationResult]) -> Vec<String> {
    let mut order: Vec<(&str, Vec<u32>)> = Vec::new();
    for r in results {
        for comp in &r.evaluation.competitor_ranks {
            let idx = match order.iter().position(|(n, _)| *n == comp.name) {
                Some(idx) => idx,
                None => {
                    order.push((comp.name.as_str(), Vec::new()));
                    order.len() - 1
                }
            };
            if let Some(rank) = comp.rank {
                order[idx].1.push(rank);
            }
        }
    }

    order
        .into_iter()
        .map(|(name, ranks)| {
            let avg = if ranks.is_empty() {
                "N/A".to_string()
            } else {
                let mean = ranks.iter().map(|&x| x as f64).sum::<f64>() / ranks.len() as f64;
                float_text(mean)
            };
            format!("{name}: Appearances={}, Avg Rank={avg}", ranks.len())
        })
        .collect()
}

/// Shortest round-trip text, keeping a trailing `.0` on whole numbers (`2.0`, `1.3333333333333333`).
fn float_text(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

/// Findings to show when the provider did not write its own.
pub fn default_findings(results: &[EvaluationResult], prompt_count: usize) -> Vec<String> {
    let competitors = competitor_summary(results).len();
    vec![
        format!(
            "Brand mention rate: {}/{}",
            mention_count(results),
            prompt_count
        ),
        format!(
            "Average information accuracy: {:.1}%",
            mean_accuracy(results) * 100.0
        ),
        format!("Total competitors identified: {competitors}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompetitorRank, Evaluation, ProviderKind, Sentiment};

    fn result(brand: bool, accuracy: f64, competitors: &[(&str, Option<u32>)]) -> EvaluationResult {
        EvaluationResult {
            prompt_id: "p".into(),
            provider: ProviderKind::Standard,
            model_name: None,
            response_text: String::new(),
            sources: vec![],
            evaluation: Evaluation {
                brand_present: brand,
                url_cited: false,
                sentiment: Sentiment::Neutral,
                accuracy_score: accuracy,
                recommendation_rank: None,
                competitor_ranks: competitors
                    .iter()
                    .map(|(n, r)| CompetitorRank {
                        name: (*n).to_string(),
                        rank: *r,
                        url_cited: false,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn score_weights_presence_and_accuracy() {
        let results = vec![result(true, 1.0, &[]), result(false, 0.5, &[])];
        // 1/2 * 70 + 0.75 * 30 = 35 + 22.5
        assert_eq!(visibility_score(&results, 2), 57.5);
    }

    #[test]
    fn missing_results_count_against_presence() {
        let results = vec![result(true, 1.0, &[])];
        // 1/4 * 70 + 1.0 * 30
        assert_eq!(visibility_score(&results, 4), 47.5);
    }

    #[test]
    fn empty_batch_scores_zero() {
        assert_eq!(visibility_score(&[], 0), 0.0);
        assert_eq!(visibility_score(&[], 3), 0.0);
    }

    #[test]
    fn summary_lists_competitors_in_first_seen_order() {
        let results = vec![
            result(false, 0.0, &[("Globex", Some(1)), ("Initech", None)]),
            result(false, 0.0, &[("Globex", Some(2))]),
        ];
        assert_eq!(
            competitor_summary(&results),
            vec![
                "Globex: Appearances=2, Avg Rank=1.5".to_string(),
                "Initech: Appearances=0, Avg Rank=N/A".to_string(),
            ]
        );
    }

    #[test]
    fn summary_average_keeps_full_precision() {
        let results = vec![
            result(false, 0.0, &[("Globex", Some(1)), ("Initech", Some(2))]),
            result(false, 0.0, &[("Globex", Some(1)), ("Initech", Some(2))]),
            result(false, 0.0, &[("Globex", Some(2))]),
        ];
        assert_eq!(
            competitor_summary(&results),
            vec![
                "Globex: Appearances=3, Avg Rank=1.3333333333333333".to_string(),
                "Initech: Appearances=2, Avg Rank=2.0".to_string(),
            ]
        );
    }

    #[test]
    fn insights_track_prompts_and_mentions() {
        let a = result(false, 0.0, &[("Globex", Some(1))]);
        let b = result(false, 0.0, &[("Globex", None), ("Hooli", Some(3))]);
        let insights = competitor_insights(&[("crm for smb", &a), ("cheap crm", &b)]);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].name, "Globex");
        assert_eq!(insights[0].mentions, 2);
        assert_eq!(insights[0].avg_rank, Some(1.0));
        assert_eq!(insights[0].prompts_appeared, vec!["crm for smb", "cheap crm"]);
        assert_eq!(insights[1].avg_rank, Some(3.0));
    }

    #[test]
    fn default_findings_match_batch() {
        let results = vec![result(true, 0.8, &[("Globex", Some(1))]), result(false, 0.4, &[])];
        let findings = default_findings(&results, 2);
        assert_eq!(findings[0], "Brand mention rate: 1/2");
        assert_eq!(findings[1], "Average information accuracy: 60.0%");
        assert_eq!(findings[2], "Total competitors identified: 1");
    }
}
