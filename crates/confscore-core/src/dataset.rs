//! CSV dataset loader.
//!
//! Reads the cleaned study table: one row per participant with a `group`
//! column and `correct_i` / `conf_i` columns for each question. An optional
//! `participant` column names the row; other columns are ignored.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::AnalysisError;
use crate::model::{Group, Participant, Response};
use crate::statistics::MIN_GROUP_SIZE;

/// A loaded study table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Where the rows came from (file path or a caller-supplied label).
    pub source: String,
    /// Questions per participant.
    pub questions: usize,
    pub participants: Vec<Participant>,
}

impl Dataset {
    /// Participants of one group, in file order.
    pub fn group(&self, group: Group) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| p.group == group)
    }

    pub fn count(&self, group: Group) -> usize {
        self.group(group).count()
    }
}

/// Load a dataset from a CSV file.
pub fn load_dataset(path: &Path, questions: usize) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open dataset: {}", path.display()))?;
    parse_dataset(file, questions, &path.display().to_string())
        .with_context(|| format!("failed to load dataset: {}", path.display()))
}

/// Parse a CSV string into a dataset (useful for testing).
pub fn parse_dataset_str(content: &str, questions: usize) -> Result<Dataset> {
    parse_dataset(content.as_bytes(), questions, "<memory>")
}

/// Parse CSV from any reader.
pub fn parse_dataset<R: Read>(reader: R, questions: usize, source: &str) -> Result<Dataset> {
    anyhow::ensure!(questions >= 1, "questions must be at least 1");

    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().context("failed to read CSV headers")?.clone();
    let columns = ColumnMap::resolve(&headers, questions)?;

    let mut participants = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let row = idx + 1;
        let record = record.with_context(|| format!("malformed CSV at row {row}"))?;
        participants.push(columns.participant(&record, row)?);
    }

    tracing::info!(
        source,
        participants = participants.len(),
        questions,
        "loaded dataset"
    );

    Ok(Dataset {
        source: source.to_string(),
        questions,
        participants,
    })
}

/// Column indices of the fields the loader needs.
struct ColumnMap {
    participant: Option<usize>,
    group: usize,
    /// `(correct_i, conf_i)` per question.
    questions: Vec<(usize, usize)>,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord, questions: usize) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();
        let find = |name: &str| -> Result<usize> {
            index
                .get(name)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("missing required column '{name}'"))
        };

        let questions = (1..=questions)
            .map(|i| Ok((find(&format!("correct_{i}"))?, find(&format!("conf_{i}"))?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            participant: index.get("participant").copied(),
            group: find("group")?,
            questions,
        })
    }

    fn participant(&self, record: &csv::StringRecord, row: usize) -> Result<Participant> {
        let field = |i: usize| record.get(i).unwrap_or("");

        let id = self
            .participant
            .map(field)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| row.to_string());

        let group: Group = field(self.group)
            .parse()
            .with_context(|| format!("row {row} (participant '{id}')"))?;

        let responses = self
            .questions
            .iter()
            .enumerate()
            .map(|(q, &(correct_col, conf_col))| -> Result<Option<Response>> {
                let question = q + 1;
                // Each present cell is checked even when its partner is blank.
                let correct = parse_cell(field(correct_col))
                    .and_then(|v| v.map(Response::check_correct).transpose())
                    .with_context(|| {
                        format!("row {row}, question {question}, column correct_{question}")
                    })?;
                let confidence = parse_cell(field(conf_col))
                    .and_then(|v| v.map(Response::check_confidence).transpose())
                    .with_context(|| {
                        format!("row {row}, question {question}, column conf_{question}")
                    })?;
                Ok(correct
                    .zip(confidence)
                    .map(|(correct, confidence)| Response {
                        correct,
                        confidence,
                    }))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Participant {
            id,
            group,
            responses,
        })
    }
}

/// Parse one numeric cell. Blank cells are `None`; integral floats such as
/// `1.0` are accepted.
fn parse_cell(raw: &str) -> Result<Option<u8>, AnalysisError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| AnalysisError::invalid(format!("'{raw}' is not a number")))?;
    if !value.is_finite() || value.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&value) {
        return Err(AnalysisError::invalid(format!(
            "'{raw}' is not a small non-negative integer"
        )));
    }
    Ok(Some(value as u8))
}

/// A non-fatal issue found in a dataset.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The participant ID (if applicable).
    pub participant: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a dataset for issues that will fail or weaken an analysis.
pub fn validate_dataset(dataset: &Dataset) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for p in &dataset.participants {
        if !seen_ids.insert(&p.id) {
            warnings.push(ValidationWarning {
                participant: Some(p.id.clone()),
                message: format!("duplicate participant ID: {}", p.id),
            });
        }
    }

    for p in &dataset.participants {
        let answered = p.answered();
        if answered < dataset.questions {
            let missing: Vec<String> = p
                .responses
                .iter()
                .enumerate()
                .filter(|(_, r)| r.is_none())
                .map(|(i, _)| (i + 1).to_string())
                .collect();
            warnings.push(ValidationWarning {
                participant: Some(p.id.clone()),
                message: format!(
                    "{answered}/{} responses present, missing question(s) {}",
                    dataset.questions,
                    missing.join(", ")
                ),
            });
        }
    }

    for group in Group::ALL {
        let n = dataset.count(group);
        if n < MIN_GROUP_SIZE {
            warnings.push(ValidationWarning {
                participant: None,
                message: format!(
                    "group {group} has {n} participant(s), at least {MIN_GROUP_SIZE} are needed for a comparison"
                ),
            });
        }
    }

    warnings
}
