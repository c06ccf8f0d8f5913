//! Participant-level aggregation of item scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::model::{ItemScore, Participant, ScoredParticipant};
use crate::scoring::ScoringScheme;

/// How per-item ABS/CWS scores are reduced to one participant value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Mean over items; keeps ABS and CWS on the per-item scale.
    #[default]
    Mean,
    /// Sum over items.
    Sum,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Mean => write!(f, "mean"),
            Aggregation::Sum => write!(f, "sum"),
        }
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Aggregation::Mean),
            "sum" | "total" => Ok(Aggregation::Sum),
            other => Err(format!("unknown aggregation: {other}")),
        }
    }
}

impl Aggregation {
    fn reduce(&self, values: impl Iterator<Item = f64>, n: usize) -> f64 {
        let total: f64 = values.sum();
        match self {
            Aggregation::Mean => total / n as f64,
            Aggregation::Sum => total,
        }
    }
}

/// Score every response of a participant and reduce to participant metrics.
///
/// The participant must carry exactly `questions` response slots, all
/// filled. Missing responses fail with [`AnalysisError::IncompleteRecord`].
pub fn score_participant(
    participant: &Participant,
    questions: usize,
    scheme: ScoringScheme,
    aggregation: Aggregation,
) -> Result<ScoredParticipant, AnalysisError> {
    if questions == 0 {
        return Err(AnalysisError::invalid("question count must be at least 1"));
    }
    if participant.responses.len() > questions {
        return Err(AnalysisError::invalid(format!(
            "participant '{}' has {} responses, expected exactly {questions}",
            participant.id,
            participant.responses.len()
        )));
    }
    let answered = participant.answered();
    if answered < questions {
        return Err(AnalysisError::IncompleteRecord {
            participant: participant.id.clone(),
            expected: questions,
            found: answered,
        });
    }

    let items: Vec<ItemScore> = participant
        .responses
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, response)| scheme.score_item(i + 1, response))
        .collect();

    let total_correct = items.iter().filter(|item| item.correct).count() as u32;
    let n = items.len() as f64;
    let mean_confidence = items
        .iter()
        .map(|item| f64::from(item.confidence))
        .sum::<f64>()
        / n;

    let scored = ScoredParticipant {
        id: participant.id.clone(),
        group: participant.group,
        total_correct,
        accuracy: f64::from(total_correct) / n,
        mean_confidence,
        abs_total: aggregation.reduce(items.iter().map(|item| item.abs), items.len()),
        cws_total: aggregation.reduce(items.iter().map(|item| item.cws), items.len()),
        items,
    };

    tracing::debug!(
        participant = %scored.id,
        group = %scored.group,
        accuracy = scored.accuracy,
        abs_total = scored.abs_total,
        cws_total = scored.cws_total,
        "scored participant"
    );

    Ok(scored)
}
