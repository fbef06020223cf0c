//! Composite aggregation over the provider batches of one audit.

use tracing::debug;

use crate::{BatchReport, CompositeReport, ProviderKind};

/// Base-report preference for findings, tips and competitor data.
const BASE_PREFERENCE: [ProviderKind; 3] = [
    ProviderKind::Grounded,
    ProviderKind::Standard,
    ProviderKind::Alternate,
];

/// The successful batches of one audit, at most one per provider.
#[derive(Debug, Clone, Default)]
pub struct BatchSet {
    slots: [Option<BatchReport>; 3],
}

impl BatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch, replacing any earlier one from the same provider.
    pub fn insert(&mut self, report: BatchReport) {
        let idx = report.provider.index();
        self.slots[idx] = Some(report);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&BatchReport> {
        self.slots[kind.index()].as_ref()
    }

    /// Present batches in dispatch order.
    pub fn present(&self) -> impl Iterator<Item = &BatchReport> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.present().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<BatchReport> for BatchSet {
    fn from_iter<I: IntoIterator<Item = BatchReport>>(iter: I) -> Self {
        let mut set = Self::new();
        for report in iter {
            set.insert(report);
        }
        set
    }
}

/// Blend the present batches into a composite report.
///
/// Returns `None` when no batch succeeded. That is the "no report" state, which
/// callers must render differently from both "loading" and a zero score.
pub fn aggregate(batches: &BatchSet) -> Option<CompositeReport> {
    let present: Vec<&BatchReport> = batches.present().collect();
    if present.is_empty() {
        return None;
    }

    let mean = present.iter().map(|b| b.overall_score).sum::<f64>() / present.len() as f64;
    let overall_score = round1(mean);

    let base = BASE_PREFERENCE
        .iter()
        .find_map(|k| batches.get(*k))
        .unwrap_or(present[0]);

    debug!(
        providers = present.len(),
        base = %base.provider,
        score = overall_score,
        "aggregated composite report"
    );

    Some(CompositeReport {
        overall_score,
        is_composite: present.len() > 1,
        provider_count: present.len(),
        providers: present.iter().map(|b| b.provider).collect(),
        source_batch: base.provider,
        key_findings: base.key_findings.clone(),
        optimizer_tips: base.optimizer_tips.clone(),
        competitor_summary: base.competitor_summary.clone(),
        competitor_insights: base.competitor_insights.clone(),
    })
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(provider: ProviderKind, score: f64) -> BatchReport {
        BatchReport {
            provider,
            overall_score: score,
            key_findings: vec![format!("{provider} finding")],
            optimizer_tips: vec![format!("{provider} tip")],
            competitor_summary: vec![format!("{provider} competitors")],
            competitor_insights: vec![],
            per_prompt_results: vec![],
            missing: vec![],
        }
    }

    #[test]
    fn empty_set_yields_no_report() {
        assert!(aggregate(&BatchSet::new()).is_none());
    }

    #[test]
    fn two_of_three_average_only_successes() {
        let set: BatchSet = [
            batch(ProviderKind::Standard, 80.0),
            batch(ProviderKind::Alternate, 60.0),
        ]
        .into_iter()
        .collect();
        let report = aggregate(&set).unwrap();
        assert_eq!(report.overall_score, 70.0);
        assert_eq!(report.provider_count, 2);
        assert!(report.is_composite);
        assert_eq!(
            report.providers,
            vec![ProviderKind::Standard, ProviderKind::Alternate]
        );
    }

    #[test]
    fn single_batch_is_not_composite() {
        let set: BatchSet = [batch(ProviderKind::Alternate, 42.25)].into_iter().collect();
        let report = aggregate(&set).unwrap();
        assert!(!report.is_composite);
        assert_eq!(report.provider_count, 1);
        assert_eq!(report.overall_score, 42.3);
        assert_eq!(report.source_batch, ProviderKind::Alternate);
    }

    #[test]
    fn grounded_findings_pass_through_verbatim() {
        let mut grounded = batch(ProviderKind::Grounded, 90.0);
        grounded.key_findings = vec!["cited by 3 sources".into(), "rank 1 in 2/5".into()];
        let set: BatchSet = [
            batch(ProviderKind::Standard, 50.0),
            batch(ProviderKind::Alternate, 40.0),
            grounded.clone(),
        ]
        .into_iter()
        .collect();
        let report = aggregate(&set).unwrap();
        assert_eq!(report.key_findings, grounded.key_findings);
        assert_eq!(report.optimizer_tips, grounded.optimizer_tips);
        assert_eq!(report.source_batch, ProviderKind::Grounded);
        assert_eq!(report.overall_score, 60.0);
    }

    #[test]
    fn standard_is_preferred_over_alternate() {
        let set: BatchSet = [
            batch(ProviderKind::Alternate, 10.0),
            batch(ProviderKind::Standard, 20.0),
        ]
        .into_iter()
        .collect();
        let report = aggregate(&set).unwrap();
        assert_eq!(report.source_batch, ProviderKind::Standard);
        assert_eq!(report.key_findings, vec!["standard finding".to_string()]);
    }

    #[test]
    fn mean_rounds_to_one_decimal() {
        let set: BatchSet = [
            batch(ProviderKind::Standard, 70.0),
            batch(ProviderKind::Alternate, 70.0),
            batch(ProviderKind::Grounded, 71.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(aggregate(&set).unwrap().overall_score, 70.3);
    }

    #[test]
    fn later_insert_replaces_same_provider() {
        let mut set = BatchSet::new();
        set.insert(batch(ProviderKind::Standard, 10.0));
        set.insert(batch(ProviderKind::Standard, 30.0));
        assert_eq!(set.len(), 1);
        assert_eq!(aggregate(&set).unwrap().overall_score, 30.0);
    }
}
