//! Group descriptives, one-tailed t-tests and effect sizes.
//!
//! The comparison tests H1: mean(CG) > mean(EG). Welch's unequal-variance
//! test is the default; Student's pooled test is available for parity with
//! older analyses. Cohen's d always uses the pooled standard deviation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::AnalysisError;
use crate::model::{non_finite, Group};

/// Minimum participants per group for a variance estimate.
pub const MIN_GROUP_SIZE: usize = 2;

/// Relative tolerance below which a spread or a mean difference counts as
/// zero. Means of repeated values are not always bit-exact.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

fn negligible(x: f64, cg: &[f64], eg: &[f64]) -> bool {
    let scale = mean(cg).abs().max(mean(eg).abs()).max(1.0);
    x.abs() <= DEGENERATE_TOLERANCE * scale
}

/// Two-sample t-test variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TTest {
    /// Unequal variances, Welch–Satterthwaite degrees of freedom.
    #[default]
    Welch,
    /// Pooled variance, n1 + n2 - 2 degrees of freedom.
    Student,
}

impl fmt::Display for TTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TTest::Welch => write!(f, "welch"),
            TTest::Student => write!(f, "student"),
        }
    }
}

impl FromStr for TTest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "welch" => Ok(TTest::Welch),
            "student" | "pooled" => Ok(TTest::Student),
            other => Err(format!("unknown t-test variant: {other}")),
        }
    }
}

/// Descriptive statistics for one metric in one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub metric: String,
    pub group: Group,
    pub n: usize,
    #[serde(with = "non_finite")]
    pub mean: f64,
    /// Sample standard deviation (ddof = 1).
    #[serde(with = "non_finite")]
    pub sd: f64,
    /// Standard error of the mean.
    #[serde(with = "non_finite")]
    pub se: f64,
}

/// Outcome of comparing CG and EG on one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub metric: String,
    pub test: TTest,
    pub n_cg: usize,
    pub n_eg: usize,
    pub mean_cg: f64,
    pub mean_eg: f64,
    pub sd_cg: f64,
    pub sd_eg: f64,
    #[serde(with = "non_finite")]
    pub t_statistic: f64,
    #[serde(with = "non_finite")]
    pub df: f64,
    /// P(T >= t) under H0, for H1: mean(CG) > mean(EG).
    #[serde(with = "non_finite")]
    pub p_value_one_tailed: f64,
    #[serde(with = "non_finite")]
    pub p_value_two_tailed: f64,
    #[serde(with = "non_finite")]
    pub cohens_d: f64,
}

impl ComparisonResult {
    /// `false` when the t-statistic is undefined (both variances zero and
    /// equal means).
    pub fn is_defined(&self) -> bool {
        !self.t_statistic.is_nan()
    }
}

/// t-statistic, degrees of freedom and p-values of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTestOutcome {
    pub t: f64,
    pub df: f64,
    pub p_one_tailed: f64,
    pub p_two_tailed: f64,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with Bessel's correction. NaN for fewer than 2 values.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

pub fn sample_sd(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Descriptives for one group's values of a metric.
pub fn describe(metric: &str, group: Group, values: &[f64]) -> GroupSummary {
    let n = values.len();
    let sd = sample_sd(values);
    GroupSummary {
        metric: metric.to_string(),
        group,
        n,
        mean: mean(values),
        sd,
        se: if n > 0 { sd / (n as f64).sqrt() } else { f64::NAN },
    }
}

/// Pooled standard deviation of two samples.
pub fn pooled_sd(cg: &[f64], eg: &[f64]) -> f64 {
    let (n1, n2) = (cg.len() as f64, eg.len() as f64);
    let pooled_var = ((n1 - 1.0) * sample_variance(cg) + (n2 - 1.0) * sample_variance(eg))
        / (n1 + n2 - 2.0);
    pooled_var.sqrt()
}

/// Cohen's d: (mean(CG) - mean(EG)) / pooled SD.
///
/// With a zero pooled SD the result is 0 for equal means and ±∞ otherwise.
pub fn cohens_d(cg: &[f64], eg: &[f64]) -> f64 {
    let diff = mean(cg) - mean(eg);
    let sd = pooled_sd(cg, eg);
    if negligible(sd, cg, eg) {
        if negligible(diff, cg, eg) {
            0.0
        } else {
            f64::INFINITY.copysign(diff)
        }
    } else {
        diff / sd
    }
}

/// Two-sample t-test of H1: mean(CG) > mean(EG).
///
/// A zero standard error with equal means leaves t, df and both p-values
/// NaN. A zero standard error with different means gives t = ±∞.
pub fn t_test(cg: &[f64], eg: &[f64], test: TTest) -> TTestOutcome {
    let (n1, n2) = (cg.len() as f64, eg.len() as f64);
    let (v1, v2) = (sample_variance(cg), sample_variance(eg));
    let diff = mean(cg) - mean(eg);

    let (se, df) = match test {
        TTest::Welch => {
            let a = v1 / n1;
            let b = v2 / n2;
            let df = (a + b).powi(2) / (a.powi(2) / (n1 - 1.0) + b.powi(2) / (n2 - 1.0));
            ((a + b).sqrt(), df)
        }
        TTest::Student => {
            let df = n1 + n2 - 2.0;
            let pooled_var = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
            ((pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
    };

    if negligible(se, cg, eg) {
        if negligible(diff, cg, eg) {
            return TTestOutcome {
                t: f64::NAN,
                df: f64::NAN,
                p_one_tailed: f64::NAN,
                p_two_tailed: f64::NAN,
            };
        }
        return TTestOutcome {
            t: f64::INFINITY.copysign(diff),
            df,
            p_one_tailed: if diff > 0.0 { 0.0 } else { 1.0 },
            p_two_tailed: 0.0,
        };
    }

    let t = diff / se;
    let (p_one_tailed, p_two_tailed) = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (dist.sf(t), (2.0 * dist.sf(t.abs())).min(1.0)),
        Err(e) => {
            tracing::warn!("cannot build t distribution with df={df}: {e}");
            (f64::NAN, f64::NAN)
        }
    };

    TTestOutcome {
        t,
        df,
        p_one_tailed,
        p_two_tailed,
    }
}

/// Compare CG and EG on one metric.
///
/// Fails with [`AnalysisError::InsufficientSample`] if either group has
/// fewer than [`MIN_GROUP_SIZE`] values.
pub fn compare_groups(
    metric: &str,
    cg: &[f64],
    eg: &[f64],
    test: TTest,
) -> Result<ComparisonResult, AnalysisError> {
    for (group, values) in [(Group::Control, cg), (Group::Experimental, eg)] {
        if values.len() < MIN_GROUP_SIZE {
            return Err(AnalysisError::InsufficientSample {
                metric: metric.to_string(),
                group,
                n: values.len(),
            });
        }
    }

    let outcome = t_test(cg, eg, test);
    let result = ComparisonResult {
        metric: metric.to_string(),
        test,
        n_cg: cg.len(),
        n_eg: eg.len(),
        mean_cg: mean(cg),
        mean_eg: mean(eg),
        sd_cg: sample_sd(cg),
        sd_eg: sample_sd(eg),
        t_statistic: outcome.t,
        df: outcome.df,
        p_value_one_tailed: outcome.p_one_tailed,
        p_value_two_tailed: outcome.p_two_tailed,
        cohens_d: cohens_d(cg, eg),
    };

    if result.is_defined() {
        tracing::debug!(
            metric,
            t = result.t_statistic,
            p = result.p_value_one_tailed,
            d = result.cohens_d,
            "compared groups"
        );
    } else {
        tracing::warn!("{metric}: both groups have zero variance and equal means, t is undefined");
    }

    Ok(result)
}
