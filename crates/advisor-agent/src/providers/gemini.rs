// ABOUTME: Google Gemini API adapter implementing the ModelRuntime trait.
// ABOUTME: Sends prompt pairs to the generateContent API and extracts the text reply.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::runtime::{ModelRuntime, StageError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const MAX_TOKENS: u32 = 4096;

/// Google Gemini runtime adapter. Calls the generateContent API with a
/// system instruction and a single user turn, returning the text parts of
/// the first candidate.
pub struct GeminiRuntime {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiRuntime {
    /// Create a new GeminiRuntime reading configuration from environment variables.
    /// Required: `GEMINI_API_KEY`
    /// Optional: `GEMINI_BASE_URL` (defaults to https://generativelanguage.googleapis.com)
    /// Optional: `GEMINI_MODEL` (defaults to gemini-2.0-flash)
    pub fn from_env() -> Result<Self, StageError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| StageError::Provider("GEMINI_API_KEY not set".to_string()))?;

        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, base_url, model))
    }

    /// Create a new GeminiRuntime with explicit configuration.
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    /// Build the JSON request body for the Gemini generateContent API.
    pub fn build_request_body(system_prompt: &str, user_prompt: &str) -> Value {
        json!({
            "system_instruction": {
                "parts": [{"text": system_prompt}]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": user_prompt}]
                }
            ],
            "generation_config": {
                "max_output_tokens": MAX_TOKENS,
                "temperature": 0.0
            }
        })
    }

    /// Parse a Gemini generateContent response into the reply text.
    pub fn parse_response(response_body: &Value) -> Result<String, StageError> {
        let candidates = response_body
            .get("candidates")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                StageError::MalformedResponse("missing candidates array in response".to_string())
            })?;

        let candidate = candidates.first().ok_or_else(|| {
            StageError::MalformedResponse("empty candidates array".to_string())
        })?;

        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| {
                StageError::MalformedResponse("missing parts array in candidate".to_string())
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(StageError::MalformedResponse(
                "no text parts in response".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl ModelRuntime for GeminiRuntime {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, StageError> {
        let body = Self::build_request_body(system_prompt, user_prompt);
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
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
                "Unauthorized: check GEMINI_API_KEY".to_string(),
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
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
