//! The `confscore analyze` command.

use std::path::PathBuf;

use anyhow::Result;

use confscore_core::config::{load_config_from, AnalysisConfig};
use confscore_core::dataset::{load_dataset, validate_dataset};
use confscore_core::engine::AnalysisEngine;
use confscore_core::report::{format_p, format_stat, AnalysisReport};
use confscore_report::html::write_html_report;
use confscore_report::table::{write_participants_csv, write_summary_csv};

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub scheme: Option<String>,
    pub aggregation: Option<String>,
    pub t_test: Option<String>,
    pub questions: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, config: &mut AnalysisConfig) -> Result<()> {
        if let Some(s) = &self.scheme {
            config.scheme = s.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        if let Some(a) = &self.aggregation {
            config.aggregation = a.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        if let Some(t) = &self.t_test {
            config.t_test = t.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        if let Some(q) = self.questions {
            config.questions = q;
        }
        config.validate()
    }
}

/// Load the config and layer CLI overrides on top.
pub fn resolve_config(config_path: Option<PathBuf>, overrides: &Overrides) -> Result<AnalysisConfig> {
    let mut config = load_config_from(config_path.as_deref())?;
    overrides.apply(&mut config)?;
    Ok(config)
}

pub struct AnalyzeArgs {
    pub data: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
    pub output: Option<PathBuf>,
    pub format: String,
}

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let config = resolve_config(args.config, &args.overrides)?;
    let output = args.output.unwrap_or_else(|| config.output_dir.clone());

    let formats = parse_formats(&args.format)?;

    let dataset = load_dataset(&args.data, config.questions)?;
    for w in validate_dataset(&dataset) {
        tracing::warn!(participant = ?w.participant, "{}", w.message);
    }

    eprintln!(
        "confscore v{}: {} participants x {} questions ({} scoring, {} aggregation, {} t-test)",
        env!("CARGO_PKG_VERSION"),
        dataset.participants.len(),
        dataset.questions,
        config.scheme,
        config.aggregation,
        config.t_test
    );

    let engine = AnalysisEngine::new(config);
    let report = engine.run(&dataset)?;

    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for fmt in &formats {
        match fmt.as_str() {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "csv" => {
                let scores = output.join(format!("participants-{timestamp}.csv"));
                write_participants_csv(&report.participants, &scores)?;
                let summary = output.join(format!("summary-{timestamp}.csv"));
                write_summary_csv(&report.comparisons, &summary)?;
                eprintln!("CSV scores: {}", scores.display());
                eprintln!("CSV summary: {}", summary.display());
            }
            _ => {
                let path = output.join(format!("summary-{timestamp}.md"));
                std::fs::write(&path, report.comparisons.to_markdown())?;
                eprintln!("Markdown summary: {}", path.display());
            }
        }
    }

    Ok(())
}

const ALL_FORMATS: [&str; 4] = ["json", "html", "csv", "markdown"];

/// Parse a comma-separated format list. `all` expands in place, `md` is an
/// alias for `markdown`, and each format appears once in first-seen order.
fn parse_formats(list: &str) -> Result<Vec<String>> {
    let mut formats: Vec<String> = Vec::new();
    for raw in list.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let expanded: Vec<&str> = match raw {
            "all" => ALL_FORMATS.to_vec(),
            "md" => vec!["markdown"],
            f if ALL_FORMATS.contains(&f) => vec![f],
            other => anyhow::bail!(
                "unknown output format: '{other}' (expected json, html, csv, markdown or all)"
            ),
        };
        for f in expanded {
            if !formats.iter().any(|seen| seen == f) {
                formats.push(f.to_string());
            }
        }
    }
    anyhow::ensure!(!formats.is_empty(), "no output format given");
    Ok(formats)
}

fn print_summary(report: &AnalysisReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Metric",
        "CG mean (sd)",
        "EG mean (sd)",
        "t",
        "df",
        "p (one-tailed)",
        "d",
    ]);

    for row in &report.comparisons.rows {
        table.add_row(vec![
            Cell::new(&row.metric),
            Cell::new(format!("{} ({})", format_stat(row.mean_cg), format_stat(row.sd_cg))),
            Cell::new(format!("{} ({})", format_stat(row.mean_eg), format_stat(row.sd_eg))),
            Cell::new(format_stat(row.t_statistic)),
            Cell::new(format_stat(row.df)),
            Cell::new(format_p(row.p_value_one_tailed)),
            Cell::new(format_stat(row.cohens_d)),
        ]);
    }

    println!("{table}");
    println!(
        "n(CG) = {}, n(EG) = {}, H1: CG > EG",
        report.dataset.control, report.dataset.experimental
    );
    if report.comparisons.has_undefined() {
        println!("Note: t is undefined where both groups have zero variance and equal means.");
    }
}
