//! Scoring strategies.
//!
//! A scorer turns a parsed result artifact into a single number the external
//! optimizer can rank runs by. Lower is better by the default scorer's
//! convention, matching what the optimizer minimizes.

use crate::result::ResultArtifact;
use crate::Result;
use crate::{DEFAULT_SERIES_COLUMN, DEFAULT_SERIES_GROUP};

/// Common trait for all scoring strategies.
pub trait Scorer {
    /// Computes the score for a finished run.
    fn score(&self, results: &ResultArtifact) -> Result<f64>;
}

impl<F> Scorer for F
where
    F: Fn(&ResultArtifact) -> Result<f64>,
{
    fn score(&self, results: &ResultArtifact) -> Result<f64> {
        self(results)
    }
}

/// Negates the last element of a named yearly series.
///
/// With the default column this reproduces the usual calibration objective:
/// the more final biomass the simulation ends with, the lower (better) the
/// score.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTailScorer {
    group: String,
    column: String,
}

impl SeriesTailScorer {
    pub fn new(group: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            column: column.into(),
        }
    }
}

impl Default for SeriesTailScorer {
    fn default() -> Self {
        Self::new(DEFAULT_SERIES_GROUP, DEFAULT_SERIES_COLUMN)
    }
}

impl Scorer for SeriesTailScorer {
    fn score(&self, results: &ResultArtifact) -> Result<f64> {
        Ok(-results.last(&self.group, &self.column)?)
    }
}

/// Always returns the same score, regardless of result content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedScorer(pub f64);

impl Scorer for FixedScorer {
    fn score(&self, _results: &ResultArtifact) -> Result<f64> {
        Ok(self.0)
    }
}

/// Sum of squared deviations of column tails from target values.
///
/// Used when calibrating against observed data: each named column's final
/// value is compared to its target and the squared errors are summed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationScorer {
    group: String,
    targets: Vec<(String, f64)>,
}

impl DeviationScorer {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            targets: Vec::new(),
        }
    }

    pub fn target(mut self, column: impl Into<String>, value: f64) -> Self {
        self.targets.push((column.into(), value));
        self
    }
}

impl Scorer for DeviationScorer {
    fn score(&self, results: &ResultArtifact) -> Result<f64> {
        let mut total = 0.0;
        for (column, target) in &self.targets {
            let observed = results.last(&self.group, column)?;
            let deviation = observed - target;
            total += deviation * deviation;
        }
        Ok(total)
    }
}
