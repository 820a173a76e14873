// ABOUTME: The Stage trait and its two pipeline implementations: name filter and metadata selector.
// ABOUTME: Stages build prompts, call the model runtime, and strictly validate the JSON verdict.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use advisor_core::{PreferenceProfile, StageInput, StageVerdict};

use crate::prompts::PromptSet;
use crate::runtime::{ModelRuntime, StageError};

/// One filtering/selection step evaluating candidates against the profile.
/// Implementations differ in what part of the course data they consult and
/// in their acceptance bias.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Judge the input against the profile and return the accepted subset.
    async fn evaluate(
        &self,
        input: &StageInput,
        profile: &PreferenceProfile,
    ) -> Result<StageVerdict, StageError>;

    /// Stage name for logging and display.
    fn name(&self) -> &'static str;
}

/// Expected reply schema for filter/selector stages.
#[derive(Debug, Deserialize)]
struct VerdictReply {
    accepted: Vec<String>,
}

/// Parse a model reply into a verdict, enforcing `verdict ⊆ input`.
///
/// Models like to wrap JSON in fenced code blocks, so fences are stripped
/// before parsing; anything that still fails the schema is a
/// `MalformedResponse`. Accepted names not present in the input are dropped
/// with a warning rather than trusted.
fn parse_verdict(
    stage: &str,
    reply: &str,
    input_names: &BTreeSet<String>,
) -> Result<StageVerdict, StageError> {
    let body = strip_code_fences(reply);

    let parsed: VerdictReply = serde_json::from_str(body).map_err(|e| {
        StageError::MalformedResponse(format!("{stage} reply is not a verdict object: {e}"))
    })?;

    let mut accepted = BTreeSet::new();
    for name in parsed.accepted {
        if input_names.contains(&name) {
            accepted.insert(name);
        } else {
            tracing::warn!(stage, name = %name, "model accepted a name not in the input, dropping");
        }
    }

    Ok(StageVerdict::new(accepted))
}

/// Strip a leading/trailing markdown code fence, with or without a language tag.
pub(crate) fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Coarse pass over course titles only. Retain-by-default: ambiguous names
/// are kept, so recall is preserved at the cost of precision. The selector
/// behind it compensates with the opposite bias.
pub struct NameFilterStage {
    runtime: Arc<dyn ModelRuntime>,
    prompts: PromptSet,
}

impl NameFilterStage {
    pub fn new(runtime: Arc<dyn ModelRuntime>, prompts: PromptSet) -> Self {
        Self { runtime, prompts }
    }

    fn build_user_prompt(names: &BTreeSet<String>, profile: &PreferenceProfile) -> String {
        let list: Vec<String> = names.iter().map(|n| format!("- {n}")).collect();
        format!(
            "STUDENT PREFERENCES (judge against the topic fields only):\n{}\n\n\
             COURSE NAMES:\n{}",
            profile.prompt_block(),
            list.join("\n")
        )
    }
}

#[async_trait]
impl Stage for NameFilterStage {
    async fn evaluate(
        &self,
        input: &StageInput,
        profile: &PreferenceProfile,
    ) -> Result<StageVerdict, StageError> {
        let StageInput::Names(names) = input else {
            return Err(StageError::InvalidInput(
                "name filter expects a set of course names".to_string(),
            ));
        };
        if names.is_empty() {
            return Err(StageError::InvalidInput(
                "name filter called with an empty name set".to_string(),
            ));
        }

        // Without any topic preference there is nothing to filter on;
        // retain-by-default means everything passes.
        if !profile.has_topic_preference() {
            tracing::debug!("no topic preference stated, keeping all names");
            return Ok(StageVerdict::new(names.clone()));
        }

        let user_prompt = Self::build_user_prompt(names, profile);
        let reply = self.runtime.complete(&self.prompts.filter, &user_prompt).await?;
        let verdict = parse_verdict(self.name(), &reply, names)?;

        tracing::info!(
            input = names.len(),
            accepted = verdict.accepted.len(),
            "name filter verdict"
        );
        Ok(verdict)
    }

    fn name(&self) -> &'static str {
        "name_filter"
    }
}

/// Fine pass over full course metadata. Restrictive-by-default: any failing
/// dimension, missing field, or ambiguity rejects.
pub struct MetadataSelectorStage {
    runtime: Arc<dyn ModelRuntime>,
    prompts: PromptSet,
}

impl MetadataSelectorStage {
    pub fn new(runtime: Arc<dyn ModelRuntime>, prompts: PromptSet) -> Self {
        Self { runtime, prompts }
    }
}

#[async_trait]
impl Stage for MetadataSelectorStage {
    async fn evaluate(
        &self,
        input: &StageInput,
        profile: &PreferenceProfile,
    ) -> Result<StageVerdict, StageError> {
        let StageInput::Records(records) = input else {
            return Err(StageError::InvalidInput(
                "metadata selector expects resolved course records".to_string(),
            ));
        };
        if records.is_empty() {
            return Err(StageError::InvalidInput(
                "metadata selector called with an empty record set".to_string(),
            ));
        }

        let metadata = serde_json::to_string_pretty(records)
            .map_err(|e| StageError::InvalidInput(format!("unserializable records: {e}")))?;
        let user_prompt = format!(
            "STUDENT PREFERENCES (all dimensions apply):\n{}\n\n\
             COURSE METADATA:\n{}",
            profile.prompt_block(),
            metadata
        );

        let reply = self
            .runtime
            .complete(&self.prompts.selector, &user_prompt)
            .await?;
        let input_names = input.names();
        let verdict = parse_verdict(self.name(), &reply, &input_names)?;

        tracing::info!(
            input = records.len(),
            accepted = verdict.accepted.len(),
            "metadata selector verdict"
        );
        Ok(verdict)
    }

    fn name(&self) -> &'static str {
        "metadata_selector"
    }
}
