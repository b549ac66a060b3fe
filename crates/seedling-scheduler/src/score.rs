use crate::types::{SchedulingContext, ScoreResult};
use seedling_core::{Resource, Seed};
use tracing::debug;

/// Scoring function trait
pub trait ScoreFunction: Send + Sync {
    /// Score a seed for the given shoot (higher is better)
    fn score(&self, context: &SchedulingContext<'_>, seed: &Seed) -> ScoreResult;

    /// Whether a seed with this score may be chosen at all
    fn is_acceptable(&self, _result: &ScoreResult) -> bool {
        true
    }

    /// Name of the scoring function
    fn name(&self) -> &str;
}

/// 1 when the seed sits in the shoot's region, 0 otherwise.
/// Only exact matches are acceptable.
pub struct RegionMatch;

impl ScoreFunction for RegionMatch {
    fn score(&self, context: &SchedulingContext<'_>, seed: &Seed) -> ScoreResult {
        let score = usize::from(seed.region() == context.shoot.region());
        ScoreResult::new(seed.name(), score)
    }

    fn is_acceptable(&self, result: &ScoreResult) -> bool {
        result.score > 0
    }

    fn name(&self) -> &str {
        "RegionMatch"
    }
}

/// Length of the common prefix between seed and shoot region names
pub struct RegionPrefix;

impl ScoreFunction for RegionPrefix {
    fn score(&self, context: &SchedulingContext<'_>, seed: &Seed) -> ScoreResult {
        let score = common_prefix_len(seed.region(), context.shoot.region());

        debug!(
            "Seed {} region {} shares {} leading characters with {}",
            seed.name(),
            seed.region(),
            score,
            context.shoot.region()
        );

        ScoreResult::new(seed.name(), score)
    }

    fn name(&self) -> &str {
        "RegionPrefix"
    }
}

/// Number of leading characters two strings share
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Keep the acceptable results with the highest score, preserving input order
pub fn joint_best(scorer: &dyn ScoreFunction, results: Vec<ScoreResult>) -> Vec<ScoreResult> {
    let acceptable: Vec<ScoreResult> = results
        .into_iter()
        .filter(|r| scorer.is_acceptable(r))
        .collect();

    let Some(best) = acceptable.iter().map(|r| r.score).max() else {
        return Vec::new();
    };

    acceptable.into_iter().filter(|r| r.score == best).collect()
}
