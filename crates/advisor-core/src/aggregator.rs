// ABOUTME: RecommendationAggregator owns the accumulated recommendation set for a run.
// ABOUTME: Validates and union-merges per-chunk accepted names; membership only ever grows.

use std::collections::BTreeSet;

use crate::error::AdvisorError;

/// Longest course name the aggregator will accept. Anything longer is a
/// model artifact, not a title.
const MAX_NAME_LEN: usize = 200;

/// Owns the run's recommendation set. The set is mutated only through
/// [`update`](Self::update) and its size is monotonically non-decreasing
/// across iterations.
#[derive(Debug, Default)]
pub struct RecommendationAggregator {
    recommendations: BTreeSet<String>,
}

impl RecommendationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a chunk's accepted names into the recommendation set.
    ///
    /// An empty `new_names` is a hard `InvalidInput` error — an upstream
    /// stage returning nothing should surface, not vanish. Malformed names
    /// are dropped with a warning; re-adding a present name is a no-op, so
    /// the operation is idempotent.
    pub fn update(&mut self, new_names: &BTreeSet<String>) -> Result<usize, AdvisorError> {
        if new_names.is_empty() {
            return Err(AdvisorError::InvalidInput(
                "aggregator update called with an empty name set".to_string(),
            ));
        }

        let mut added = 0;
        for name in new_names {
            if !is_plausible_title(name) {
                tracing::warn!(name = %name, "dropping malformed course name");
                continue;
            }
            if self.recommendations.insert(name.trim().to_string()) {
                added += 1;
            }
        }

        tracing::debug!(
            added,
            total = self.recommendations.len(),
            "aggregator merged chunk"
        );
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn recommendations(&self) -> &BTreeSet<String> {
        &self.recommendations
    }

    /// Consume the aggregator and hand the set to the caller.
    pub fn into_recommendations(self) -> BTreeSet<String> {
        self.recommendations
    }
}

/// A name passes if it looks like an academic course title: non-blank,
/// a single line, bounded length, and containing at least one letter.
fn is_plausible_title(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed.len() <= MAX_NAME_LEN
        && !trimmed.contains('\n')
        && trimmed.chars().any(|c| c.is_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn update_merges_new_names() {
        let mut agg = RecommendationAggregator::new();
        let added = agg.update(&names(&["Corporate Finance", "Labor Law"])).unwrap();
        assert_eq!(added, 2);
        assert_eq!(agg.len(), 2);
        assert!(agg.recommendations().contains("Labor Law"));
    }

    #[test]
    fn update_with_empty_set_is_invalid_input() {
        let mut agg = RecommendationAggregator::new();
        let err = agg.update(&BTreeSet::new()).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidInput(_)));
    }

    #[test]
    fn update_is_idempotent() {
        let mut agg = RecommendationAggregator::new();
        let chunk = names(&["Corporate Finance", "Labor Law"]);

        agg.update(&chunk).unwrap();
        let first = agg.recommendations().clone();
        let added = agg.update(&chunk).unwrap();

        assert_eq!(added, 0, "re-adding present names is a no-op");
        assert_eq!(agg.recommendations(), &first);
    }

    #[test]
    fn malformed_names_are_dropped_not_fatal() {
        let mut agg = RecommendationAggregator::new();
        let mixed = names(&["Corporate Finance", "   ", "12345", "multi\nline"]);

        let added = agg.update(&mixed).unwrap();
        assert_eq!(added, 1);
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn oversized_names_are_dropped() {
        let mut agg = RecommendationAggregator::new();
        let long = "a".repeat(MAX_NAME_LEN + 1);
        let mut chunk = names(&["Short Course"]);
        chunk.insert(long);

        agg.update(&chunk).unwrap();
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn membership_never_shrinks() {
        let mut agg = RecommendationAggregator::new();
        agg.update(&names(&["A Course"])).unwrap();
        let before = agg.len();

        agg.update(&names(&["Another Course"])).unwrap();
        assert!(agg.len() >= before);

        // An invalid update leaves the set untouched.
        let _ = agg.update(&BTreeSet::new());
        assert_eq!(agg.len(), 2);
    }

    #[test]
    fn into_recommendations_hands_over_the_set() {
        let mut agg = RecommendationAggregator::new();
        agg.update(&names(&["A Course"])).unwrap();
        let set = agg.into_recommendations();
        assert_eq!(set, names(&["A Course"]));
    }
}
