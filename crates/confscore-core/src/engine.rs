//! Analysis pipeline.
//!
//! Composes the scorer, aggregator and group comparator:
//! participants → scored participants → descriptives → comparison table.

use std::time::Instant;

use anyhow::Result;
use uuid::Uuid;

use crate::aggregate::score_participant;
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::model::{Group, Metric, Participant, ScoredParticipant};
use crate::report::{AnalysisReport, ComparisonTable, DatasetSummary};
use crate::statistics::{compare_groups, describe, GroupSummary};

/// Runs analyses with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Score every participant. Stops at the first participant that cannot
    /// be scored.
    pub fn score_participants(
        &self,
        participants: &[Participant],
    ) -> Result<Vec<ScoredParticipant>, AnalysisError> {
        participants
            .iter()
            .map(|p| {
                score_participant(
                    p,
                    self.config.questions,
                    self.config.scheme,
                    self.config.aggregation,
                )
            })
            .collect()
    }

    /// Descriptives for every metric and group, metric-major.
    pub fn describe(&self, scored: &[ScoredParticipant]) -> Vec<GroupSummary> {
        Metric::ALL
            .iter()
            .flat_map(|metric| {
                Group::ALL.iter().map(move |&group| {
                    describe(metric.name(), group, &metric_values(scored, group, *metric))
                })
            })
            .collect()
    }

    /// Compare CG and EG on every metric.
    pub fn compare(&self, scored: &[ScoredParticipant]) -> Result<ComparisonTable, AnalysisError> {
        let rows = Metric::ALL
            .iter()
            .map(|&metric| {
                compare_groups(
                    metric.name(),
                    &metric_values(scored, Group::Control, metric),
                    &metric_values(scored, Group::Experimental, metric),
                    self.config.t_test,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ComparisonTable { rows })
    }

    /// Run the full pipeline on a dataset.
    pub fn run(&self, dataset: &Dataset) -> Result<AnalysisReport> {
        anyhow::ensure!(
            dataset.questions == self.config.questions,
            "dataset was loaded with {} questions but the analysis expects {}",
            dataset.questions,
            self.config.questions
        );

        let start = Instant::now();
        tracing::info!(
            source = %dataset.source,
            scheme = %self.config.scheme,
            aggregation = %self.config.aggregation,
            t_test = %self.config.t_test,
            "starting analysis"
        );

        let participants = self.score_participants(&dataset.participants)?;
        let descriptives = self.describe(&participants);
        let comparisons = self.compare(&participants)?;

        let report = AnalysisReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            dataset: DatasetSummary {
                source: dataset.source.clone(),
                participants: participants.len(),
                control: dataset.count(Group::Control),
                experimental: dataset.count(Group::Experimental),
                questions: dataset.questions,
            },
            settings: self.config.settings(),
            participants,
            descriptives,
            comparisons,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            participants = report.participants.len(),
            duration_ms = report.duration_ms,
            "analysis complete"
        );

        Ok(report)
    }
}

/// Values of one metric for the participants of one group, in input order.
pub fn metric_values(scored: &[ScoredParticipant], group: Group, metric: Metric) -> Vec<f64> {
    scored
        .iter()
        .filter(|p| p.group == group)
        .map(|p| metric.value(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Response;

    fn participant(id: &str, group: Group, n_correct: usize, confidence: u8) -> Participant {
        let responses = (0..20)
            .map(|i| Response::new(u8::from(i < n_correct), confidence).unwrap())
            .collect();
        Participant::new(id, group, responses)
    }

    fn dataset(participants: Vec<Participant>) -> Dataset {
        Dataset {
            source: "test".into(),
            questions: 20,
            participants,
        }
    }

    #[test]
    fn run_produces_three_rows_in_order() {
        let ds = dataset(vec![
            participant("c1", Group::Control, 18, 6),
            participant("c2", Group::Control, 16, 5),
            participant("c3", Group::Control, 17, 7),
            participant("e1", Group::Experimental, 10, 4),
            participant("e2", Group::Experimental, 12, 3),
            participant("e3", Group::Experimental, 9, 5),
        ]);
        let report = AnalysisEngine::default().run(&ds).unwrap();
        let metrics: Vec<_> = report.comparisons.rows.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(metrics, vec!["accuracy", "abs_total", "cws_total"]);
        assert_eq!(report.dataset.control, 3);
        assert_eq!(report.descriptives.len(), 6);
        let acc = report.comparisons.get("accuracy").unwrap();
        assert!(acc.mean_cg > acc.mean_eg);
        assert!(acc.t_statistic > 0.0);
        assert!(acc.p_value_one_tailed < 0.05);
    }

    #[test]
    fn identical_groups_give_undefined_t() {
        let ds = dataset(
            ["c1", "c2", "c3"]
                .iter()
                .map(|id| participant(id, Group::Control, 15, 6))
                .chain(
                    ["e1", "e2", "e3"]
                        .iter()
                        .map(|id| participant(id, Group::Experimental, 15, 6)),
                )
                .collect(),
        );
        let report = AnalysisEngine::default().run(&ds).unwrap();
        for row in &report.comparisons.rows {
            assert!(!row.is_defined(), "{} should be undefined", row.metric);
            assert!(row.p_value_one_tailed.is_nan());
            assert_eq!(row.cohens_d, 0.0);
            assert_eq!(row.mean_cg, row.mean_eg);
        }
    }

    #[test]
    fn single_participant_group_is_insufficient() {
        let ds = dataset(vec![
            participant("c1", Group::Control, 18, 6),
            participant("c2", Group::Control, 16, 5),
            participant("e1", Group::Experimental, 10, 4),
        ]);
        let err = AnalysisEngine::default().run(&ds).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InsufficientSample {
                group: Group::Experimental,
                n: 1,
                ..
            })
        ));
    }

    #[test]
    fn incomplete_participant_fails_run() {
        let mut short = participant("c2", Group::Control, 16, 5);
        short.responses.pop();
        let ds = dataset(vec![participant("c1", Group::Control, 18, 6), short]);
        let err = AnalysisEngine::default().run(&ds).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::IncompleteRecord { found: 19, .. })
        ));
    }

    #[test]
    fn question_count_mismatch_is_rejected() {
        let mut ds = dataset(vec![]);
        ds.questions = 10;
        assert!(AnalysisEngine::default().run(&ds).is_err());
    }

    #[test]
    fn repeated_runs_render_identical_tables() {
        let ds = dataset(vec![
            participant("c1", Group::Control, 18, 6),
            participant("c2", Group::Control, 11, 2),
            participant("e1", Group::Experimental, 10, 4),
            participant("e2", Group::Experimental, 14, 7),
        ]);
        let engine = AnalysisEngine::default();
        let a = engine.run(&ds).unwrap();
        let b = engine.run(&ds).unwrap();
        assert_eq!(a.comparisons.to_tsv(), b.comparisons.to_tsv());
        assert_eq!(a.comparisons.to_markdown(), b.comparisons.to_markdown());
    }
}
