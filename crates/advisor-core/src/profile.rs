// ABOUTME: Defines PreferenceProfile, the student's stated preferences for one run.
// ABOUTME: Ten fields in five preferred/disliked pairs; blank input normalizes to a sentinel.

use serde::{Deserialize, Serialize};

/// Sentinel stored in any profile field the student left blank.
pub const NO_PREFERENCE: &str = "NO PREFERENCE";

/// The student's stated preferences across five dimensions, each a
/// preferred/disliked pair: ECTS credit load, topics, delivery mode,
/// assessment type, and free-form extras. Created once per run from the
/// survey or a profile file; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub preferred_ects: String,
    pub disliked_ects: String,
    pub preferred_topics: String,
    pub disliked_topics: String,
    pub preferred_delivery: String,
    pub disliked_delivery: String,
    pub preferred_assessment: String,
    pub disliked_assessment: String,
    pub extra_preferences: String,
    pub extra_constraints: String,
}

impl PreferenceProfile {
    /// Build a profile from raw survey answers, normalizing each blank
    /// answer to [`NO_PREFERENCE`].
    #[allow(clippy::too_many_arguments)]
    pub fn from_answers(
        preferred_ects: &str,
        disliked_ects: &str,
        preferred_topics: &str,
        disliked_topics: &str,
        preferred_delivery: &str,
        disliked_delivery: &str,
        preferred_assessment: &str,
        disliked_assessment: &str,
        extra_preferences: &str,
        extra_constraints: &str,
    ) -> Self {
        Self {
            preferred_ects: normalize(preferred_ects),
            disliked_ects: normalize(disliked_ects),
            preferred_topics: normalize(preferred_topics),
            disliked_topics: normalize(disliked_topics),
            preferred_delivery: normalize(preferred_delivery),
            disliked_delivery: normalize(disliked_delivery),
            preferred_assessment: normalize(preferred_assessment),
            disliked_assessment: normalize(disliked_assessment),
            extra_preferences: normalize(extra_preferences),
            extra_constraints: normalize(extra_constraints),
        }
    }

    /// A profile with every field set to the sentinel. Matches everything.
    pub fn unconstrained() -> Self {
        Self::from_answers("", "", "", "", "", "", "", "", "", "")
    }

    /// True if the student expressed any topic preference at all. The name
    /// filter is a no-op judgment without one.
    pub fn has_topic_preference(&self) -> bool {
        self.preferred_topics != NO_PREFERENCE || self.disliked_topics != NO_PREFERENCE
    }

    /// Render the profile as labeled lines for embedding into a stage prompt.
    pub fn prompt_block(&self) -> String {
        format!(
            "Preferred ECTS load: {}\n\
             Disliked ECTS load: {}\n\
             Preferred topics: {}\n\
             Disliked topics: {}\n\
             Preferred delivery mode: {}\n\
             Disliked delivery mode: {}\n\
             Preferred assessment type: {}\n\
             Disliked assessment type: {}\n\
             Extra preferences: {}\n\
             Extra constraints: {}",
            self.preferred_ects,
            self.disliked_ects,
            self.preferred_topics,
            self.disliked_topics,
            self.preferred_delivery,
            self.disliked_delivery,
            self.preferred_assessment,
            self.disliked_assessment,
            self.extra_preferences,
            self.extra_constraints,
        )
    }
}

fn normalize(answer: &str) -> String {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        NO_PREFERENCE.to_string()
    } else {
        trimmed.to_string()
    }
}
