// ABOUTME: Factory function for creating ModelRuntime instances by provider name.
// ABOUTME: Resolves provider + optional model into a configured Arc<dyn ModelRuntime>.

use std::env;
use std::sync::Arc;

use crate::providers::{GeminiRuntime, OpenAIRuntime};
use crate::runtime::{ModelRuntime, StageError};

/// Create a model runtime for the given provider name.
///
/// The model is resolved from:
/// 1. The explicit `model` parameter (if Some)
/// 2. A provider-specific environment variable (e.g. GEMINI_MODEL)
/// 3. A sensible default for that provider
pub fn create_model_runtime(
    provider: &str,
    model: Option<&str>,
) -> Result<Arc<dyn ModelRuntime>, StageError> {
    match provider {
        "gemini" => {
            let mut runtime = GeminiRuntime::from_env()?;
            if let Some(model) = model {
                runtime = GeminiRuntime::new(
                    env::var("GEMINI_API_KEY")
                        .map_err(|_| StageError::Provider("GEMINI_API_KEY not set".to_string()))?,
                    env::var("GEMINI_BASE_URL").unwrap_or_else(|_| {
                        "https://generativelanguage.googleapis.com".to_string()
                    }),
                    model.to_string(),
                );
            }
            Ok(Arc::new(runtime))
        }
        "openai" => {
            let mut runtime = OpenAIRuntime::from_env()?;
            if let Some(model) = model {
                runtime = OpenAIRuntime::new(
                    env::var("OPENAI_API_KEY")
                        .map_err(|_| StageError::Provider("OPENAI_API_KEY not set".to_string()))?,
                    env::var("OPENAI_BASE_URL")
                        .unwrap_or_else(|_| "https://api.openai.com".to_string()),
                    model.to_string(),
                );
            }
            Ok(Arc::new(runtime))
        }
        unknown => Err(StageError::Provider(format!(
            "unsupported LLM provider: {}",
            unknown
        ))),
    }
}
