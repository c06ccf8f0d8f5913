//! Analysis configuration.
//!
//! The scoring scheme, aggregation and t-test variant change the numbers in
//! every output table, so they are explicit settings recorded in each report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregation;
use crate::model::DEFAULT_QUESTIONS;
use crate::scoring::ScoringScheme;
use crate::statistics::TTest;

/// Top-level confscore configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Questions per participant.
    #[serde(default = "default_questions")]
    pub questions: usize,
    /// ABS/CWS formula pair.
    #[serde(default)]
    pub scheme: ScoringScheme,
    /// Per-participant reduction of item scores.
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Two-sample t-test variant.
    #[serde(default)]
    pub t_test: TTest,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_questions() -> usize {
    DEFAULT_QUESTIONS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./confscore-results")
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            questions: default_questions(),
            scheme: ScoringScheme::default(),
            aggregation: Aggregation::default(),
            t_test: TTest::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl AnalysisConfig {
    /// The settings that affect numeric output.
    pub fn settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            questions: self.questions,
            scheme: self.scheme,
            aggregation: self.aggregation,
            t_test: self.t_test,
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.questions >= 1, "questions must be at least 1");
        Ok(())
    }
}

/// Settings echoed into every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub questions: usize,
    pub scheme: ScoringScheme,
    pub aggregation: Aggregation,
    pub t_test: TTest,
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `confscore.toml` in the current directory
/// 2. `~/.config/confscore/config.toml`
///
/// Environment variable overrides: `CONFSCORE_SCHEME`,
/// `CONFSCORE_AGGREGATION`, `CONFSCORE_T_TEST`.
pub fn load_config() -> Result<AnalysisConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AnalysisConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("confscore.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<AnalysisConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => AnalysisConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

/// Apply `CONFSCORE_*` overrides using `lookup` to read variables.
fn apply_env_overrides(
    config: &mut AnalysisConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(v) = lookup("CONFSCORE_SCHEME") {
        config.scheme = v
            .parse()
            .map_err(|e: String| anyhow::anyhow!("CONFSCORE_SCHEME: {e}"))?;
    }
    if let Some(v) = lookup("CONFSCORE_AGGREGATION") {
        config.aggregation = v
            .parse()
            .map_err(|e: String| anyhow::anyhow!("CONFSCORE_AGGREGATION: {e}"))?;
    }
    if let Some(v) = lookup("CONFSCORE_T_TEST") {
        config.t_test = v
            .parse()
            .map_err(|e: String| anyhow::anyhow!("CONFSCORE_T_TEST: {e}"))?;
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("confscore"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.questions, 20);
        assert_eq!(config.scheme, ScoringScheme::Signed);
        assert_eq!(config.aggregation, Aggregation::Mean);
        assert_eq!(config.t_test, TTest::Welch);
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
scheme = "brier"
aggregation = "sum"
"#;
        let config: AnalysisConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scheme, ScoringScheme::Brier);
        assert_eq!(config.aggregation, Aggregation::Sum);
        assert_eq!(config.t_test, TTest::Welch);
        assert_eq!(config.questions, 20);
    }

    #[test]
    fn parse_rejects_unknown_variant() {
        let result = toml::from_str::<AnalysisConfig>(r#"t_test = "paired""#);
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("CONFSCORE_T_TEST", "student"), ("CONFSCORE_SCHEME", "Brier")]);
        let mut config = AnalysisConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.t_test, TTest::Student);
        assert_eq!(config.scheme, ScoringScheme::Brier);
        assert_eq!(config.aggregation, Aggregation::Mean);
    }

    #[test]
    fn env_override_rejects_garbage() {
        let mut config = AnalysisConfig::default();
        let err = apply_env_overrides(&mut config, |k| {
            (k == "CONFSCORE_AGGREGATION").then(|| "median".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("CONFSCORE_AGGREGATION"));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confscore.toml");
        std::fs::write(&path, "questions = 10\nt_test = \"student\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.questions, 10);
        assert_eq!(config.settings().questions, 10);
    }

    #[test]
    fn load_missing_file_fails() {
        let result = load_config_from(Some(Path::new("/no/such/confscore.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn zero_questions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "questions = 0\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}
