//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use confscore_core::model::Group;
use confscore_core::report::{format_p, format_stat, AnalysisReport, ComparisonTable};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an analysis report.
pub fn generate_html(report: &AnalysisReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>confscore report: {}</title>\n",
        html_escape(&report.dataset.source)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>confscore report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Dataset: <strong>{}</strong> | {} participants (CG {}, EG {}) | {} questions | {}</p>\n",
        html_escape(&report.dataset.source),
        report.dataset.participants,
        report.dataset.control,
        report.dataset.experimental,
        report.dataset.questions,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Scheme: {} | aggregation: {} | t-test: {} (one-tailed, H1: CG &gt; EG)</p>\n",
        report.settings.scheme, report.settings.aggregation, report.settings.t_test
    ));
    html.push_str("</header>\n");

    // Comparison summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Group comparison</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Metric</th><th>CG mean</th><th>EG mean</th><th>t</th><th>df</th><th>p (one-tailed)</th><th>Cohen's d</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for r in &report.comparisons.rows {
        let class = if r.is_defined() { "" } else { " class=\"undefined\"" };
        html.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&r.metric),
            format_stat(r.mean_cg),
            format_stat(r.mean_eg),
            format_stat(r.t_statistic),
            format_stat(r.df),
            format_p(r.p_value_one_tailed),
            format_stat(r.cohens_d),
        ));
    }
    html.push_str("</tbody></table>\n");
    if report.comparisons.has_undefined() {
        html.push_str("<p class=\"meta\">Rows marked undefined have zero variance in both groups and equal means.</p>\n");
    }

    if !report.comparisons.rows.is_empty() {
        html.push_str(&generate_bar_chart(&report.comparisons));
    }

    // Descriptives
    html.push_str("<h2>Descriptives</h2>\n");
    html.push_str("<table class=\"descriptives\">\n");
    html.push_str("<thead><tr><th>Metric</th><th>Group</th><th>n</th><th>Mean</th><th>SD</th><th>SE</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for d in &report.descriptives {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&d.metric),
            d.group,
            d.n,
            format_stat(d.mean),
            format_stat(d.sd),
            format_stat(d.se),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-participant results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Participants</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Participant</th><th onclick=\"sortTable(1)\">Group</th><th onclick=\"sortTable(2)\">Correct</th><th onclick=\"sortTable(3)\">Accuracy</th><th onclick=\"sortTable(4)\">Mean conf</th><th onclick=\"sortTable(5)\">ABS</th><th onclick=\"sortTable(6)\">CWS</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for p in &report.participants {
        let class = match p.group {
            Group::Control => "cg",
            Group::Experimental => "eg",
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}/{}</td><td>{:.3}</td><td>{:.2}</td><td>{:.4}</td><td>{:.4}</td></tr>\n",
            class,
            html_escape(&p.id),
            p.group,
            p.total_correct,
            p.items.len(),
            p.accuracy,
            p.mean_confidence,
            p.abs_total,
            p.cws_total,
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Paired CG/EG bars per metric. Each metric is scaled to its own largest
/// absolute mean since the metrics live on different ranges.
fn generate_bar_chart(table: &ComparisonTable) -> String {
    let bar_height = 20;
    let pair_gap = 16;
    let max_width = 400;
    let padding = 10;
    let label_width = 140;

    let total_height = table.rows.len() * (2 * bar_height + pair_gap) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 80,
        total_height
    );

    for (i, row) in table.rows.iter().enumerate() {
        let top = i * (2 * bar_height + pair_gap) + padding;
        let scale = row.mean_cg.abs().max(row.mean_eg.abs());

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            top + bar_height,
            html_escape(&row.metric)
        ));

        for (j, (value, color)) in [(row.mean_cg, "#3b82f6"), (row.mean_eg, "#f97316")]
            .iter()
            .enumerate()
        {
            let y = top + j * bar_height;
            let width = if scale > 0.0 && value.is_finite() {
                (value.abs() / scale * max_width as f64) as usize
            } else {
                0
            };
            let opacity = if *value < 0.0 { "0.5" } else { "1" };
            svg.push_str(&format!(
                "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" fill-opacity=\"{}\" rx=\"3\"/>\n",
                label_width,
                y + 1,
                width,
                bar_height - 2,
                color,
                opacity
            ));
            svg.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{} {}</text>\n",
                label_width + width + 8,
                y + bar_height / 2,
                if j == 0 { "CG" } else { "EG" },
                format_stat(*value)
            ));
        }
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --cg: #dbeafe; --eg: #ffedd5; --undef: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --cg: #1e3a8a; --eg: #7c2d12; --undef: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.cg { background: var(--cg); }
.eg { background: var(--eg); }
.undefined { background: var(--undef); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = isNaN(na) || isNaN(nb) ? va.localeCompare(vb) : na - nb;
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
