//! Analysis report types with JSON persistence and table rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AnalysisSettings;
use crate::model::ScoredParticipant;
use crate::statistics::{ComparisonResult, GroupSummary};

/// A complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the input dataset.
    pub dataset: DatasetSummary,
    /// Settings the numbers were computed with.
    pub settings: AnalysisSettings,
    /// Per-participant metrics.
    pub participants: Vec<ScoredParticipant>,
    /// n / mean / sd / se per metric and group.
    pub descriptives: Vec<GroupSummary>,
    /// One row per metric.
    pub comparisons: ComparisonTable,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a dataset (without the rows).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub source: String,
    pub participants: usize,
    pub control: usize,
    pub experimental: usize,
    pub questions: usize,
}

impl AnalysisReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AnalysisReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// The group comparison summary, one row per metric in a fixed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub rows: Vec<ComparisonResult>,
}

impl ComparisonTable {
    /// Look up the row for a metric label.
    pub fn get(&self, metric: &str) -> Option<&ComparisonResult> {
        self.rows.iter().find(|r| r.metric == metric)
    }

    /// Returns true if any row has an undefined t-statistic.
    pub fn has_undefined(&self) -> bool {
        self.rows.iter().any(|r| !r.is_defined())
    }

    /// Format the table as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("| Metric | CG mean | EG mean | t | p (one-tailed) | d |\n");
        md.push_str("|--------|---------|---------|---|----------------|---|\n");
        for r in &self.rows {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                r.metric,
                format_stat(r.mean_cg),
                format_stat(r.mean_eg),
                format_stat(r.t_statistic),
                format_p(r.p_value_one_tailed),
                format_stat(r.cohens_d),
            ));
        }
        if self.has_undefined() {
            md.push_str(
                "\nundefined: both groups have zero variance and equal means, so t and p do not exist.\n",
            );
        }
        md
    }

    /// Format the table as tab-separated values with full precision.
    pub fn to_tsv(&self) -> String {
        let mut out = String::from("metric\tcg_mean\teg_mean\tt\tp_one_tailed\tcohens_d\n");
        for r in &self.rows {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                r.metric, r.mean_cg, r.mean_eg, r.t_statistic, r.p_value_one_tailed, r.cohens_d
            ));
        }
        out
    }
}

/// Four-decimal rendering that names undefined and infinite values.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "undefined".to_string()
    } else if value.is_infinite() {
        let label = if value > 0.0 { "inf" } else { "-inf" };
        label.to_string()
    } else {
        format!("{value:.4}")
    }
}

/// Like [`format_stat`], switching to scientific notation for tiny p-values.
pub fn format_p(value: f64) -> String {
    if value.is_finite() && value > 0.0 && value < 1e-4 {
        format!("{value:.2e}")
    } else {
        format_stat(value)
    }
}
