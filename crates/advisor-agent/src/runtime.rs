// ABOUTME: Defines the ModelRuntime trait that all LLM provider adapters implement.
// ABOUTME: Also defines StageError, the failure taxonomy for LLM-backed stage calls.

use async_trait::async_trait;

use advisor_core::AdvisorError;

/// Errors from LLM-backed stage execution. Domain-level lookup failures
/// surface through the wrapped [`AdvisorError`].
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("provider error: {0}")]
    Provider(String),

    /// Model output did not match the stage's reply schema.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Advisor(#[from] AdvisorError),
}

/// Trait that all LLM provider adapters implement. Each provider (Gemini,
/// OpenAI, the test stub) sends one prompt pair to its model-serving
/// endpoint and returns the raw text of the reply. Stages own prompt
/// construction and reply parsing; the runtime is transport only.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Send one completion request and return the model's text reply.
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
    -> Result<String, StageError>;

    /// Provider name for logging and display (e.g. "gemini", "openai").
    fn provider_name(&self) -> &str;

    /// Model identifier being used (e.g. "gemini-2.0-flash").
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_display() {
        let errors = vec![
            StageError::Provider("connection timeout".to_string()),
            StageError::MalformedResponse("not JSON".to_string()),
            StageError::RateLimited,
            StageError::InvalidInput("empty input set".to_string()),
        ];

        for err in &errors {
            assert!(!err.to_string().is_empty());
        }

        assert!(
            StageError::MalformedResponse("missing accepted array".to_string())
                .to_string()
                .contains("missing accepted array")
        );
    }

    #[test]
    fn advisor_errors_convert_transparently() {
        let err: StageError = AdvisorError::NotFound { requested: 3 }.into();
        assert!(err.to_string().contains("requested 3"));
    }
}
