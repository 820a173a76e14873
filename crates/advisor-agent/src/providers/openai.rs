// ABOUTME: OpenAI API adapter implementing the ModelRuntime trait.
// ABOUTME: Sends prompt pairs to the Chat Completions API and extracts the reply text.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::runtime::{ModelRuntime, StageError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 4096;

/// OpenAI runtime adapter. Calls the Chat Completions API with a system
/// message and a single user message, returning the first choice's content.
pub struct OpenAIRuntime {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIRuntime {
    /// Create a new OpenAIRuntime reading configuration from environment variables.
    /// Required: `OPENAI_API_KEY`
    /// Optional: `OPENAI_BASE_URL` (defaults to https://api.openai.com)
    /// Optional: `OPENAI_MODEL` (defaults to gpt-4o)
    pub fn from_env() -> Result<Self, StageError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| StageError::Provider("OPENAI_API_KEY not set".to_string()))?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, base_url, model))
    }

    /// Create a new OpenAIRuntime with explicit configuration.
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    /// Build the JSON request body for the Chat Completions API.
    pub fn build_request_body(&self, system_prompt: &str, user_prompt: &str) -> Value {
        json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": 0.0,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ]
        })
    }

    /// Parse a Chat Completions response into the reply text.
    pub fn parse_response(response_body: &Value) -> Result<String, StageError> {
        let choices = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                StageError::MalformedResponse("missing choices array in response".to_string())
            })?;

        let choice = choices
            .first()
            .ok_or_else(|| StageError::MalformedResponse("empty choices array".to_string()))?;

        let content = choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                StageError::MalformedResponse("missing message content in choice".to_string())
            })?;

        if content.is_empty() {
            return Err(StageError::MalformedResponse(
                "empty message content".to_string(),
            ));
        }

        Ok(content.to_string())
    }
}

#[async_trait]
impl ModelRuntime for OpenAIRuntime {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, StageError> {
        let body = self.build_request_body(system_prompt, user_prompt);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| StageError::Provider(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(StageError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(StageError::Provider(
                "Unauthorized: check OPENAI_API_KEY".to_string(),
            ));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StageError::Provider(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| StageError::MalformedResponse(format!("failed to parse JSON: {}", e)))?;

        Self::parse_response(&response_body)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_runtime_creation() {
        let runtime = OpenAIRuntime::new(
            "test-key".to_string(),
            DEFAULT_BASE_URL.to_string(),
            DEFAULT_MODEL.to_string(),
        );

        assert_eq!(runtime.provider_name(), "openai");
        assert_eq!(runtime.model_name(), "gpt-4o");
    }

    #[test]
    fn openai_builds_request_body() {
        let runtime = OpenAIRuntime::new(
            "test-key".to_string(),
            DEFAULT_BASE_URL.to_string(),
            DEFAULT_MODEL.to_string(),
        );

        let body = runtime.build_request_body("System prompt.", "User prompt.");

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"].as_u64(), Some(4096));
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "User prompt.");
    }

    #[test]
    fn openai_parses_text_response() {
        let response = json!({
            "choices": [
                {
                    "message": {
                        "role": "assistant",
                        "content": "{\"accepted\": []}"
                    },
                    "finish_reason": "stop"
                }
            ]
        });

        let text = OpenAIRuntime::parse_response(&response).unwrap();
        assert_eq!(text, "{\"accepted\": []}");
    }

    #[test]
    fn openai_rejects_missing_choices() {
        let result = OpenAIRuntime::parse_response(&json!({}));
        assert!(matches!(result, Err(StageError::MalformedResponse(_))));
    }

    #[test]
    fn openai_rejects_empty_content() {
        let response = json!({
            "choices": [
                {"message": {"role": "assistant", "content": ""}, "finish_reason": "stop"}
            ]
        });
        let result = OpenAIRuntime::parse_response(&response);
        assert!(matches!(result, Err(StageError::MalformedResponse(_))));
    }
}
