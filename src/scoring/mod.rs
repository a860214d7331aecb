//! Reflection scoring.
//!
//! Scoring sits behind [`ScoringStrategy`] so the keyword heuristic can be
//! replaced without touching aggregation.

pub mod heuristic;
pub mod likert;

pub use heuristic::{score_categories, HeuristicConfig, KeywordHeuristic};
pub use likert::likert_rgi;

use crate::analysis::rgi_from_categories;
use crate::error::{RelateError, Result};
use crate::models::{CategoryScores, CategoryWeights, Reflection, ReflectionInput};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Turns a submitted questionnaire into per-category scores on 0-100.
///
/// Implementations must be deterministic.
pub trait ScoringStrategy {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn score(&self, input: &ReflectionInput) -> CategoryScores;
}

/// Score an input and freeze it into a [`Reflection`].
pub fn build_reflection(
    strategy: &dyn ScoringStrategy,
    weights: &CategoryWeights,
    input: ReflectionInput,
    timestamp: DateTime<Utc>,
) -> Result<Reflection> {
    if !(1..=5).contains(&input.effort) {
        return Err(RelateError::InvalidEffort(input.effort));
    }

    let scores = strategy.score(&input);
    let rgi = rgi_from_categories(&scores, weights);
    debug!("Scored reflection with {} (RGI {:.1})", strategy.name(), rgi);

    Ok(Reflection::new(timestamp, input, scores, rgi))
}
