//! Google Gemini completion provider.
//!
//! Integration with the Gemini `generateContent` REST API. Gemini keeps the
//! system instruction outside the turn list and calls the assistant role
//! `model`, so messages are reshaped before sending.
//!
//! # Authentication
//!
//! Uses GEMINI_API_KEY or GOOGLE_API_KEY env var, passed as the `key` query
//! parameter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llms::base_llm::{BaseLLM, BaseLLMState, LLMMessage, MessageRole};
use crate::utilities::errors::LLMError;

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini completion implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiCompletion {
    /// Shared base LLM state.
    #[serde(flatten)]
    pub state: BaseLLMState,

    /// Maximum output tokens.
    pub max_output_tokens: Option<u32>,
    /// Nucleus sampling parameter.
    pub top_p: Option<f64>,
}

impl GeminiCompletion {
    /// Create a new Gemini completion provider.
    ///
    /// # Arguments
    ///
    /// * `model` - Gemini model name (e.g., "gemini-1.5-flash").
    /// * `api_key` - Optional API key (defaults to GEMINI_API_KEY or GOOGLE_API_KEY env var).
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok());

        let mut state = BaseLLMState::new("gemini", model);
        state.api_key = api_key;

        Self {
            state,
            max_output_tokens: None,
            top_p: None,
        }
    }

    /// Get the API endpoint URL.
    pub fn api_endpoint(&self) -> String {
        let base = self
            .state
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_URL)
            .trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.state.model)
    }

    /// Build generation config for the Gemini API.
    pub fn generation_config(&self) -> Value {
        let mut config = serde_json::Map::new();
        if let Some(temp) = self.state.temperature {
            config.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = self.max_output_tokens {
            config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(top_p) = self.top_p {
            config.insert("topP".to_string(), serde_json::json!(top_p));
        }
        Value::Object(config)
    }

    /// Split messages into the system instruction and Gemini `contents`.
    pub fn format_messages(&self, messages: &[LLMMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut contents: Vec<Value> = Vec::new();

        for msg in messages {
            let role = match msg.role {
                MessageRole::System => {
                    system_parts.push(&msg.content);
                    continue;
                }
                MessageRole::Assistant => "model",
                MessageRole::User => "user",
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": msg.content }],
            }));
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, contents)
    }

    /// Build the complete request body.
    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let (system, contents) = self.format_messages(messages);

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": self.generation_config(),
        });

        if let Some(system_text) = system {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system_text }]
            });
        }

        body
    }

    /// Parse a Gemini API response into reply text.
    pub fn parse_response(&self, response: &Value) -> Result<String, LLMError> {
        if let Some(error) = response.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown Gemini API error");
            return Err(LLMError::InvalidResponse {
                provider: self.state.provider.clone(),
                message: msg.to_string(),
            });
        }

        let parts = response
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| self.state.missing_content("candidates[0].content.parts"))?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if let Some(usage) = response.get("usageMetadata") {
            log::debug!("Gemini usage: {}", usage);
        }

        Ok(text)
    }
}

#[async_trait]
impl BaseLLM for GeminiCompletion {
    fn model(&self) -> &str {
        &self.state.model
    }

    fn provider(&self) -> &str {
        "gemini"
    }

    fn temperature(&self) -> Option<f64> {
        self.state.temperature
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LLMError> {
        log::debug!(
            "GeminiCompletion.acall: model={}, messages={}",
            self.state.model,
            messages.len(),
        );

        let api_key = self
            .state
            .api_key
            .as_ref()
            .ok_or_else(|| LLMError::MissingApiKey {
                provider: "Gemini".into(),
                env_var: "GEMINI_API_KEY".into(),
            })?;

        let body = self.build_request_body(&messages);
        let client = self.state.http_client()?;

        let response = client
            .post(self.api_endpoint())
            .header("content-type", "application/json")
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| self.state.transport_error(e))?;

        let text = self.state.read_success_body(response).await?;
        let json = self.state.parse_json(&text)?;
        self.parse_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_messages_extracts_system() {
        let provider = GeminiCompletion::new("gemini-1.5-flash", Some("key".into()));
        let (system, contents) = provider.format_messages(&[
            LLMMessage::system("You are Malik."),
            LLMMessage::assistant("Let's start with your Full Name."),
            LLMMessage::user("Alice Smith"),
        ]);

        assert_eq!(system.as_deref(), Some("You are Malik."));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0]["role"], "model");
        assert_eq!(contents[1]["role"], "user");
        assert_eq!(contents[1]["parts"][0]["text"], "Alice Smith");
    }

    #[test]
    fn test_build_request_body() {
        let provider = GeminiCompletion::new("gemini-1.5-flash", Some("key".into()));
        let body = provider.build_request_body(&[
            LLMMessage::system("You are Malik."),
            LLMMessage::user("hello"),
        ]);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are Malik.");
        assert_eq!(body["generationConfig"]["temperature"], 0.7);
        assert!(provider.api_endpoint().ends_with("/models/gemini-1.5-flash:generateContent"));
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let provider = GeminiCompletion::new("gemini-1.5-flash", Some("key".into()));
        let response = serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Thank you. " }, { "text": "Email address?" }] }
            }]
        });
        assert_eq!(
            provider.parse_response(&response).unwrap(),
            "Thank you. Email address?"
        );

        let error = serde_json::json!({ "error": { "code": 400, "message": "API key not valid" } });
        assert!(provider
            .parse_response(&error)
            .unwrap_err()
            .to_string()
            .contains("API key not valid"));
    }
}
