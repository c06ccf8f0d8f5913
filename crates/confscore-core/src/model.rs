//! Core data model types for confscore.
//!
//! Responses and participants come in from the dataset loader; scored
//! participants are produced by the aggregator and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Lowest confidence rating on the response scale.
pub const MIN_CONFIDENCE: u8 = 1;
/// Highest confidence rating on the response scale.
pub const MAX_CONFIDENCE: u8 = 7;
/// Number of questions in the study design.
pub const DEFAULT_QUESTIONS: usize = 20;

/// The two compared cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Group {
    /// Control group.
    #[serde(rename = "CG")]
    Control,
    /// Experimental group.
    #[serde(rename = "EG")]
    Experimental,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::Control, Group::Experimental];

    /// Short label used in tables and CSV files.
    pub fn label(&self) -> &'static str {
        match self {
            Group::Control => "CG",
            Group::Experimental => "EG",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Group {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cg" | "control" => Ok(Group::Control),
            "eg" | "experimental" => Ok(Group::Experimental),
            other => Err(AnalysisError::invalid(format!(
                "unknown group label '{other}' (expected CG or EG)"
            ))),
        }
    }
}

/// One participant's answer to one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the answer was correct.
    pub correct: bool,
    /// Self-reported confidence, 1..=7.
    pub confidence: u8,
}

impl Response {
    /// Build a response from raw 0/1 correctness and a 1..=7 confidence.
    pub fn new(correct: u8, confidence: u8) -> Result<Self, AnalysisError> {
        Ok(Self {
            correct: Self::check_correct(correct)?,
            confidence: Self::check_confidence(confidence)?,
        })
    }

    /// Validate a raw correctness value on its own.
    pub fn check_correct(correct: u8) -> Result<bool, AnalysisError> {
        match correct {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(AnalysisError::invalid(format!(
                "correctness must be 0 or 1, got {other}"
            ))),
        }
    }

    /// Validate a raw confidence rating on its own.
    pub fn check_confidence(confidence: u8) -> Result<u8, AnalysisError> {
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence) {
            return Err(AnalysisError::invalid(format!(
                "confidence must be between {MIN_CONFIDENCE} and {MAX_CONFIDENCE}, got {confidence}"
            )));
        }
        Ok(confidence)
    }
}

/// A study participant and their response slots, one per question.
///
/// A slot is `None` when the source cell was blank; the aggregator rejects
/// such participants rather than imputing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub group: Group,
    pub responses: Vec<Option<Response>>,
}

impl Participant {
    /// Build a participant whose responses are all present.
    pub fn new(id: impl Into<String>, group: Group, responses: Vec<Response>) -> Self {
        Self {
            id: id.into(),
            group,
            responses: responses.into_iter().map(Some).collect(),
        }
    }

    /// Number of non-empty response slots.
    pub fn answered(&self) -> usize {
        self.responses.iter().flatten().count()
    }
}

/// Scores for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    /// 1-based question index.
    pub question: usize,
    pub correct: bool,
    pub confidence: u8,
    /// Confidence mapped onto 0..=1.
    pub probability: f64,
    pub abs: f64,
    pub cws: f64,
}

/// Participant-level metrics derived from all item scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredParticipant {
    pub id: String,
    pub group: Group,
    pub total_correct: u32,
    /// Proportion correct, 0..=1.
    pub accuracy: f64,
    pub mean_confidence: f64,
    pub abs_total: f64,
    pub cws_total: f64,
    /// Per-question scores, in question order.
    pub items: Vec<ItemScore>,
}

/// The participant-level metrics compared between groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    AbsTotal,
    CwsTotal,
}

impl Metric {
    /// Metrics in summary-table order.
    pub const ALL: [Metric; 3] = [Metric::Accuracy, Metric::AbsTotal, Metric::CwsTotal];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::AbsTotal => "abs_total",
            Metric::CwsTotal => "cws_total",
        }
    }

    /// Read this metric off a scored participant.
    pub fn value(&self, participant: &ScoredParticipant) -> f64 {
        match self {
            Metric::Accuracy => participant.accuracy,
            Metric::AbsTotal => participant.abs_total,
            Metric::CwsTotal => participant.cws_total,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accuracy" => Ok(Metric::Accuracy),
            "abs" | "abs_total" => Ok(Metric::AbsTotal),
            "cws" | "cws_total" => Ok(Metric::CwsTotal),
            other => Err(AnalysisError::invalid(format!("unknown metric: {other}"))),
        }
    }
}

/// Serde helpers for statistics that may legitimately be NaN or infinite.
///
/// JSON has no literal for these, so they are written as the strings
/// `"NaN"`, `"inf"` and `"-inf"`.
pub(crate) mod non_finite {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(serde::de::Error::custom(format!(
                    "expected a number, NaN, inf or -inf, got '{other}'"
                ))),
            },
        }
    }
}
