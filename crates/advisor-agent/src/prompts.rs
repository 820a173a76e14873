// ABOUTME: PromptSet holds the system prompts for every stage as configuration data.
// ABOUTME: Ships usable defaults and supports overriding from a YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::runtime::StageError;

/// Retain-by-default pre-selection over course titles only. The filter must
/// lean toward keeping: it compensates for nothing, the selector behind it
/// is the strict one.
const DEFAULT_FILTER_PROMPT: &str = "\
You pre-select academic courses for a student, judging by COURSE NAME ONLY. \
Do not consider ECTS credits, delivery mode, or anything beyond the title.\n\
Remove a course ONLY when its name unambiguously matches a disliked topic, \
or unambiguously fails to relate to any preferred topic. Keep every course \
you are not certain about.\n\
Reply with strict JSON, no commentary: {\"accepted\": [\"<name>\", ...]} \
using the exact input names.";

/// Restrictive final selection over full metadata. Opposite bias from the
/// filter: any doubt rejects.
const DEFAULT_SELECTOR_PROMPT: &str = "\
You make the final selection of academic courses for a student using the \
FULL course metadata. Check every preference dimension: topic, ECTS credit \
load, delivery mode, assessment type, and the extra preferences and \
constraints. Accept a course only when it satisfies ALL of them; reject on \
the slightest doubt or when a required metadata field is missing.\n\
Reply with strict JSON, no commentary: {\"accepted\": [\"<name>\", ...]} \
using the exact input names.";

const DEFAULT_RANKER_PROMPT: &str = "\
You are an objective academic advisor scoring how well one course matches a \
student's preferences. Consider every preference dimension present in the \
course metadata.\n\
Reply with strict JSON, no commentary: \
{\"course\": \"<name>\", \"score\": <0-100>} where 0 means no match and 100 \
a perfect match.";

/// System prompts for the three stage kinds. Prompt text is configuration,
/// not code: the defaults ship in the binary and a YAML file can replace
/// any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSet {
    pub filter: String,
    pub selector: String,
    pub ranker: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER_PROMPT.to_string(),
            selector: DEFAULT_SELECTOR_PROMPT.to_string(),
            ranker: DEFAULT_RANKER_PROMPT.to_string(),
        }
    }
}

impl PromptSet {
    /// Load a prompt set from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, StageError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StageError::InvalidInput(format!("cannot read prompt file: {}", e)))?;
        serde_yaml::from_str(&raw)
            .map_err(|e| StageError::InvalidInput(format!("cannot parse prompt file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_state_the_stage_policies() {
        let prompts = PromptSet::default();
        assert!(prompts.filter.contains("COURSE NAME ONLY"));
        assert!(prompts.filter.contains("Keep every course"));
        assert!(prompts.selector.contains("ALL"));
        assert!(prompts.ranker.contains("0-100"));
    }

    #[test]
    fn defaults_demand_strict_json() {
        let prompts = PromptSet::default();
        for prompt in [&prompts.filter, &prompts.selector, &prompts.ranker] {
            assert!(prompt.contains("strict JSON"), "prompt lacks schema demand");
        }
    }

    #[test]
    fn yaml_file_overrides_only_named_prompts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "filter: \"Custom filter prompt.\"").unwrap();

        let prompts = PromptSet::from_yaml_file(file.path()).unwrap();
        assert_eq!(prompts.filter, "Custom filter prompt.");
        assert_eq!(prompts.selector, PromptSet::default().selector);
    }

    #[test]
    fn unreadable_file_is_invalid_input() {
        let result = PromptSet::from_yaml_file(Path::new("/nonexistent/prompts.yaml"));
        assert!(matches!(result, Err(StageError::InvalidInput(_))));
    }
}
