//! Base LLM trait for the screening assistant.
//!
//! Defines the message contract shared by every model provider and the
//! [`BaseLLM`] trait the conversation session calls once per turn. A call
//! receives an ordered message list whose first element is the persona's
//! system instruction, followed by the session history and the new user
//! message, and yields the assistant's reply text.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utilities::errors::LLMError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default sampling temperature for screening conversations.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Persona instruction, injected at call time only.
    System,
    /// The candidate.
    User,
    /// The model (or the session's fixed greeting and closing lines).
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in an LLM conversation.
///
/// Messages are immutable once created; a session only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// Base trait for model capabilities.
///
/// Implementations must not retry: a failed call is reported once and the
/// session converts it into a fallback reply.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Get the model identifier/name.
    fn model(&self) -> &str;

    /// Get the provider name.
    fn provider(&self) -> &str;

    /// Get the optional temperature setting.
    fn temperature(&self) -> Option<f64> {
        None
    }

    /// Generate a reply for an ordered message list.
    ///
    /// # Arguments
    ///
    /// * `messages` - System instruction first, then history in order, then
    ///   the new user message.
    ///
    /// # Returns
    ///
    /// The assistant's reply text.
    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LLMError>;
}

// ---------------------------------------------------------------------------
// BaseLLMState - shared state for provider implementations
// ---------------------------------------------------------------------------

/// Shared state for provider implementations.
///
/// Concrete providers embed this and delegate the common accessors to it.
#[derive(Clone, Serialize, Deserialize)]
pub struct BaseLLMState {
    /// The model identifier/name, without provider prefix.
    pub model: String,
    /// Optional temperature setting for response generation.
    pub temperature: Option<f64>,
    /// Optional API key.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Optional base URL for the API.
    pub base_url: Option<String>,
    /// Provider name (e.g., "ollama", "openai").
    pub provider: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl BaseLLMState {
    /// Create a new `BaseLLMState` for a provider/model pair.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: Some(DEFAULT_TEMPERATURE),
            api_key: None,
            base_url: None,
            provider: provider.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Build an HTTP client honoring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, LLMError> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(LLMError::Http)
    }

    /// Map a transport error using this provider's name and timeout.
    pub fn transport_error(&self, err: reqwest::Error) -> LLMError {
        LLMError::from_reqwest(&self.provider, self.timeout_secs, err)
    }

    /// Read the response body and fail on non-success statuses.
    pub async fn read_success_body(&self, response: reqwest::Response) -> Result<String, LLMError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(LLMError::Api {
                provider: self.provider.clone(),
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }
        Ok(text)
    }

    /// Parse a JSON body, keeping a truncated copy of it on failure.
    pub fn parse_json(&self, body: &str) -> Result<serde_json::Value, LLMError> {
        serde_json::from_str(body).map_err(|e| LLMError::InvalidResponse {
            provider: self.provider.clone(),
            message: format!(
                "{} - Body: {}",
                e,
                body.chars().take(500).collect::<String>()
            ),
        })
    }

    /// Error for a payload that parsed but carried no reply text.
    pub fn missing_content(&self, what: &str) -> LLMError {
        LLMError::InvalidResponse {
            provider: self.provider.clone(),
            message: format!("no {} in response", what),
        }
    }
}

impl fmt::Debug for BaseLLMState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseLLMState")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("provider", &self.provider)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_serde() {
        let msg = LLMMessage::assistant("Hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "Hello");

        let parsed: LLMMessage =
            serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(parsed, LLMMessage::user("hi"));
    }

    #[test]
    fn test_state_debug_hides_api_key() {
        let mut state = BaseLLMState::new("openai", "gpt-4o-mini");
        state.api_key = Some("sk-secret".into());
        let dbg = format!("{:?}", state);
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("***"));
    }

    #[test]
    fn test_parse_json_error_is_invalid_response() {
        let state = BaseLLMState::new("ollama", "llama3.2");
        let err = state.parse_json("not json").unwrap_err();
        assert!(matches!(err, LLMError::InvalidResponse { .. }));
        assert!(!err.is_unreachable());
    }
}
