//! The `confscore score` command.

use std::path::PathBuf;

use anyhow::Result;

use confscore_core::dataset::load_dataset;
use confscore_core::engine::AnalysisEngine;
use confscore_report::table::write_participants_csv;

use super::analyze::{resolve_config, Overrides};

pub fn execute(
    data: PathBuf,
    output: PathBuf,
    config_path: Option<PathBuf>,
    overrides: Overrides,
) -> Result<()> {
    let config = resolve_config(config_path, &overrides)?;
    let dataset = load_dataset(&data, config.questions)?;

    let engine = AnalysisEngine::new(config);
    let scored = engine.score_participants(&dataset.participants)?;

    write_participants_csv(&scored, &output)?;
    println!(
        "Scored {} participants ({} scoring) -> {}",
        scored.len(),
        engine.config().scheme,
        output.display()
    );

    Ok(())
}
