//! The `confscore validate` command.

use std::path::PathBuf;

use anyhow::Result;

use confscore_core::dataset::{load_dataset, validate_dataset};
use confscore_core::model::Group;

use super::analyze::{resolve_config, Overrides};

pub fn execute(data: PathBuf, config_path: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = resolve_config(config_path, &overrides)?;
    let dataset = load_dataset(&data, config.questions)?;

    println!(
        "Dataset: {} ({} participants: {} CG, {} EG; {} questions)",
        dataset.source,
        dataset.participants.len(),
        dataset.count(Group::Control),
        dataset.count(Group::Experimental),
        dataset.questions
    );

    let warnings = validate_dataset(&dataset);
    for w in &warnings {
        let prefix = w
            .participant
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Dataset valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
