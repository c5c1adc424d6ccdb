//! OpenAI chat completion provider.
//!
//! Direct integration with the OpenAI Chat Completions API via `reqwest`.
//! Used when a persona is bound to an `openai/...` model and
//! `OPENAI_API_KEY` is available.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llms::base_llm::{BaseLLM, BaseLLMState, LLMMessage};
use crate::utilities::errors::LLMError;

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// OpenAI native completion implementation.
///
/// # Example
///
/// ```ignore
/// let provider = OpenAICompletion::new("gpt-4o-mini", None, None);
/// let reply = provider.acall(messages).await?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAICompletion {
    /// Shared base LLM state.
    #[serde(flatten)]
    pub state: BaseLLMState,

    /// Organization ID for multi-tenant access.
    pub organization: Option<String>,
    /// Maximum tokens in response.
    pub max_tokens: Option<u32>,
    /// Nucleus sampling parameter.
    pub top_p: Option<f64>,
}

impl OpenAICompletion {
    /// Create a new OpenAI completion provider.
    ///
    /// # Arguments
    ///
    /// * `model` - OpenAI model name (e.g., "gpt-4o-mini").
    /// * `api_key` - Optional API key (defaults to OPENAI_API_KEY env var).
    /// * `base_url` - Optional custom base URL.
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        let api_key = api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());

        let mut state = BaseLLMState::new("openai", model);
        state.api_key = api_key;
        state.base_url = base_url;

        Self {
            state,
            organization: std::env::var("OPENAI_ORGANIZATION").ok(),
            max_tokens: None,
            top_p: None,
        }
    }

    /// Get the API base URL.
    pub fn api_base_url(&self) -> String {
        self.state
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string())
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let mut body = serde_json::json!({
            "model": self.state.model,
            "messages": messages,
        });

        if let Some(temp) = self.state.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(top_p) = self.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        body
    }

    /// Parse a Chat Completions API response.
    pub fn parse_completions_response(&self, response: &Value) -> Result<String, LLMError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| self.state.missing_content("choices[0].message"))?;

        if let Some(usage) = response.get("usage") {
            log::debug!(
                "OpenAI token usage: prompt={}, completion={}, total={}",
                usage.get("prompt_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("completion_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("total_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
            );
        }

        message
            .get("content")
            .and_then(|c| c.as_str())
            .map(String::from)
            .ok_or_else(|| self.state.missing_content("message content"))
    }
}

#[async_trait]
impl BaseLLM for OpenAICompletion {
    fn model(&self) -> &str {
        &self.state.model
    }

    fn provider(&self) -> &str {
        "openai"
    }

    fn temperature(&self) -> Option<f64> {
        self.state.temperature
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LLMError> {
        log::debug!(
            "OpenAICompletion.acall: model={}, messages={}",
            self.state.model,
            messages.len(),
        );

        let api_key = self
            .state
            .api_key
            .as_ref()
            .ok_or_else(|| LLMError::MissingApiKey {
                provider: "OpenAI".into(),
                env_var: "OPENAI_API_KEY".into(),
            })?;

        let body = self.build_request_body(&messages);
        let endpoint = format!("{}/chat/completions", self.api_base_url());
        let client = self.state.http_client()?;

        let mut request = client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key));

        if let Some(ref org) = self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| self.state.transport_error(e))?;

        let text = self.state.read_success_body(response).await?;
        let json = self.state.parse_json(&text)?;
        self.parse_completions_response(&json)
    }
}
