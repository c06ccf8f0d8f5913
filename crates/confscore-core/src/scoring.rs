//! Per-item confidence-weighted scoring.
//!
//! Two schemes are available. `Signed` rewards a correct answer and penalizes
//! a wrong one in proportion to confidence. `Brier` uses the augmented Brier
//! score for ABS and a banded CWS in which every correct answer outscores
//! every wrong one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::model::{ItemScore, Response, MAX_CONFIDENCE, MIN_CONFIDENCE};

/// Which pair of ABS/CWS formulas to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringScheme {
    /// ABS = ±w, CWS = ±c.
    #[default]
    Signed,
    /// ABS = 1 - (p - y)² + 0.5y, CWS = 0.6 + 0.4p if correct else 0.4 - 0.4p.
    Brier,
}

impl fmt::Display for ScoringScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringScheme::Signed => write!(f, "signed"),
            ScoringScheme::Brier => write!(f, "brier"),
        }
    }
}

impl FromStr for ScoringScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "signed" => Ok(ScoringScheme::Signed),
            "brier" | "augmented-brier" => Ok(ScoringScheme::Brier),
            other => Err(format!("unknown scoring scheme: {other}")),
        }
    }
}

/// Map a 1..=7 confidence rating onto a 0..=1 weight: `(c - 1) / 6`.
pub fn confidence_weight(confidence: u8) -> f64 {
    f64::from(confidence.saturating_sub(MIN_CONFIDENCE)) / f64::from(MAX_CONFIDENCE - MIN_CONFIDENCE)
}

impl ScoringScheme {
    /// ABS score for one response.
    pub fn abs_score(&self, response: &Response) -> f64 {
        let w = confidence_weight(response.confidence);
        match self {
            ScoringScheme::Signed => {
                if response.correct {
                    w
                } else {
                    // 0.0 - w keeps c = 1 at +0.0 rather than -0.0
                    0.0 - w
                }
            }
            ScoringScheme::Brier => {
                let y = if response.correct { 1.0 } else { 0.0 };
                (1.0 - (w - y).powi(2)) + 0.5 * y
            }
        }
    }

    /// CWS score for one response.
    pub fn cws_score(&self, response: &Response) -> f64 {
        match self {
            ScoringScheme::Signed => {
                let c = f64::from(response.confidence);
                if response.correct {
                    c
                } else {
                    -c
                }
            }
            ScoringScheme::Brier => {
                let p = confidence_weight(response.confidence);
                if response.correct {
                    0.6 + 0.4 * p
                } else {
                    0.4 - 0.4 * p
                }
            }
        }
    }

    /// Score one validated response at a 1-based question index.
    pub fn score_item(&self, question: usize, response: &Response) -> ItemScore {
        ItemScore {
            question,
            correct: response.correct,
            confidence: response.confidence,
            probability: confidence_weight(response.confidence),
            abs: self.abs_score(response),
            cws: self.cws_score(response),
        }
    }
}

/// Score a raw (correct, confidence) pair, validating both values first.
///
/// Returns `(abs_score, cws_score)`.
pub fn score(
    scheme: ScoringScheme,
    correct: u8,
    confidence: u8,
) -> Result<(f64, f64), AnalysisError> {
    let response = Response::new(correct, confidence)?;
    Ok((scheme.abs_score(&response), scheme.cws_score(&response)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(correct: u8, confidence: u8) -> Response {
        Response::new(correct, confidence).unwrap()
    }

    #[test]
    fn weight_endpoints() {
        assert_eq!(confidence_weight(1), 0.0);
        assert_eq!(confidence_weight(7), 1.0);
        assert!((confidence_weight(4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn signed_abs_monotonic() {
        let s = ScoringScheme::Signed;
        for c in 1..7u8 {
            assert!(s.abs_score(&r(1, c + 1)) >= s.abs_score(&r(1, c)));
            assert!(s.abs_score(&r(0, c + 1)) <= s.abs_score(&r(0, c)));
        }
        assert_eq!(s.abs_score(&r(1, 1)), 0.0);
        assert_eq!(s.abs_score(&r(1, 7)), 1.0);
        assert_eq!(s.abs_score(&r(0, 7)), -1.0);
    }

    #[test]
    fn signed_cws_is_signed_confidence() {
        let s = ScoringScheme::Signed;
        for c in 1..=7u8 {
            assert_eq!(s.cws_score(&r(1, c)), f64::from(c));
            assert_eq!(s.cws_score(&r(0, c)), -f64::from(c));
        }
    }

    #[test]
    fn brier_matches_reference_values() {
        let s = ScoringScheme::Brier;
        // Confident correct: 1 - 0 + 0.5
        assert!((s.abs_score(&r(1, 7)) - 1.5).abs() < 1e-12);
        // Guessed correct: 1 - 1 + 0.5
        assert!((s.abs_score(&r(1, 1)) - 0.5).abs() < 1e-12);
        // Unconfident wrong: 1 - 0
        assert!((s.abs_score(&r(0, 1)) - 1.0).abs() < 1e-12);
        // Confident wrong: 1 - 1
        assert!(s.abs_score(&r(0, 7)).abs() < 1e-12);

        assert!((s.cws_score(&r(1, 7)) - 1.0).abs() < 1e-12);
        assert!((s.cws_score(&r(1, 1)) - 0.6).abs() < 1e-12);
        assert!((s.cws_score(&r(0, 1)) - 0.4).abs() < 1e-12);
        assert!(s.cws_score(&r(0, 7)).abs() < 1e-12);
    }

    #[test]
    fn brier_cws_keeps_ordering() {
        let s = ScoringScheme::Brier;
        let worst_correct = (1..=7).map(|c| s.cws_score(&r(1, c))).fold(f64::INFINITY, f64::min);
        let best_wrong = (1..=7).map(|c| s.cws_score(&r(0, c))).fold(f64::NEG_INFINITY, f64::max);
        assert!(worst_correct > best_wrong);
    }

    #[test]
    fn brier_abs_rewards_calibration() {
        let s = ScoringScheme::Brier;
        // A lucky guess scores below an honest "don't know".
        assert!(s.abs_score(&r(1, 1)) < s.abs_score(&r(0, 1)));
        // Monotone within each correctness class.
        for c in 1..7u8 {
            assert!(s.abs_score(&r(1, c + 1)) >= s.abs_score(&r(1, c)));
            assert!(s.abs_score(&r(0, c + 1)) <= s.abs_score(&r(0, c)));
        }
    }

    #[test]
    fn score_rejects_out_of_range() {
        assert!(matches!(
            score(ScoringScheme::Signed, 1, 0),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            score(ScoringScheme::Signed, 1, 8),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            score(ScoringScheme::Signed, 3, 4),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert_eq!(score(ScoringScheme::Signed, 0, 4).unwrap(), (-0.5, -4.0));
    }

    #[test]
    fn scheme_display_and_parse() {
        assert_eq!(ScoringScheme::default(), ScoringScheme::Signed);
        assert_eq!("Brier".parse::<ScoringScheme>().unwrap(), ScoringScheme::Brier);
        assert_eq!(ScoringScheme::Brier.to_string(), "brier");
        assert!("linear".parse::<ScoringScheme>().is_err());
    }
}
