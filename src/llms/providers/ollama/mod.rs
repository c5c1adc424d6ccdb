//! Ollama chat provider.
//!
//! Talks to a locally-running Ollama server through its native chat
//! endpoint. This is the default provider for every persona, so its
//! connection failures are the ones the session reports as
//! "model unreachable".
//!
//! Default API endpoint: `http://localhost:11434/api/chat`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llms::base_llm::{BaseLLM, BaseLLMState, LLMMessage};
use crate::utilities::errors::LLMError;

/// Default Ollama server URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama chat completion implementation.
///
/// Environment variables:
/// - `OLLAMA_BASE_URL` / `OLLAMA_HOST`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaCompletion {
    /// Shared base LLM state.
    #[serde(flatten)]
    pub state: BaseLLMState,
    /// How long Ollama keeps the model loaded after the call (e.g. "5m").
    pub keep_alive: Option<String>,
}

impl OllamaCompletion {
    /// Create a new Ollama provider.
    ///
    /// # Arguments
    ///
    /// * `model` - Ollama model tag (e.g., "llama3.2").
    /// * `base_url` - Optional server URL (defaults to `OLLAMA_BASE_URL`,
    ///   then `OLLAMA_HOST`, then `http://localhost:11434`).
    pub fn new(model: impl Into<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .or_else(|| std::env::var("OLLAMA_BASE_URL").ok())
            .or_else(|| std::env::var("OLLAMA_HOST").ok());

        let mut state = BaseLLMState::new("ollama", model);
        state.base_url = base_url;

        Self {
            state,
            keep_alive: None,
        }
    }

    /// Get the chat endpoint URL.
    pub fn api_endpoint(&self) -> String {
        let base = self
            .state
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_OLLAMA_URL)
            .trim_end_matches('/');
        // OLLAMA_HOST is commonly given as bare host:port
        if base.contains("://") {
            format!("{}/api/chat", base)
        } else {
            format!("http://{}/api/chat", base)
        }
    }

    /// Build the request body for `/api/chat`.
    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let mut body = serde_json::json!({
            "model": self.state.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = self.state.temperature {
            body["options"] = serde_json::json!({ "temperature": temp });
        }
        if let Some(ref keep_alive) = self.keep_alive {
            body["keep_alive"] = serde_json::json!(keep_alive);
        }

        body
    }

    /// Extract the reply text from an `/api/chat` response.
    pub fn parse_response(&self, response: &Value) -> Result<String, LLMError> {
        if let Some(error) = response.get("error").and_then(|e| e.as_str()) {
            return Err(LLMError::InvalidResponse {
                provider: self.state.provider.clone(),
                message: error.to_string(),
            });
        }

        if let Some(count) = response.get("eval_count").and_then(|v| v.as_i64()) {
            log::debug!(
                "Ollama token usage: prompt={}, completion={}",
                response
                    .get("prompt_eval_count")
                    .and_then(|v| v.as_i64())
                    .unwrap_or(0),
                count
            );
        }

        response
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(String::from)
            .ok_or_else(|| self.state.missing_content("message.content"))
    }
}

#[async_trait]
impl BaseLLM for OllamaCompletion {
    fn model(&self) -> &str {
        &self.state.model
    }

    fn provider(&self) -> &str {
        "ollama"
    }

    fn temperature(&self) -> Option<f64> {
        self.state.temperature
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LLMError> {
        log::debug!(
            "OllamaCompletion.acall: model={}, messages={}",
            self.state.model,
            messages.len(),
        );

        let body = self.build_request_body(&messages);
        let client = self.state.http_client()?;

        let response = client
            .post(self.api_endpoint())
            .header("Content-Type", "application/json")
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
    fn test_endpoint_trims_trailing_slash() {
        let provider = OllamaCompletion::new("llama3.2", Some("http://gpu-box:11434/".into()));
        assert_eq!(provider.api_endpoint(), "http://gpu-box:11434/api/chat");

        let bare = OllamaCompletion::new("llama3.2", Some("127.0.0.1:11434".into()));
        assert_eq!(bare.api_endpoint(), "http://127.0.0.1:11434/api/chat");
    }

    #[test]
    fn test_build_request_body() {
        let provider = OllamaCompletion::new("llama3.2", Some(DEFAULT_OLLAMA_URL.into()));
        let messages = vec![
            LLMMessage::system("You are Lani."),
            LLMMessage::user("Alice Smith"),
        ];
        let body = provider.build_request_body(&messages);

        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Alice Smith");
        assert_eq!(body["options"]["temperature"], 0.7);
    }

    #[test]
    fn test_parse_response() {
        let provider = OllamaCompletion::new("llama3.2", None);
        let response = serde_json::json!({
            "model": "llama3.2",
            "message": { "role": "assistant", "content": "Thanks, Alice. What is your email?" },
            "done": true,
            "eval_count": 12,
        });
        assert_eq!(
            provider.parse_response(&response).unwrap(),
            "Thanks, Alice. What is your email?"
        );

        let error = serde_json::json!({ "error": "model 'llama9' not found" });
        let err = provider.parse_response(&error).unwrap_err();
        assert!(err.to_string().contains("llama9"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        // Port 1 on loopback has no listener.
        let provider = OllamaCompletion::new("llama3.2", Some("http://127.0.0.1:1".into()));
        let err = provider
            .acall(vec![LLMMessage::user("hello")])
            .await
            .unwrap_err();
        assert!(err.is_unreachable(), "unexpected error: {err:?}");
    }
}
