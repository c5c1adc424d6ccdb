//! Main LLM struct for the screening assistant.
//!
//! This module contains the top-level [`LLM`] struct that wraps a model
//! string such as `ollama/llama3.2` together with call configuration, infers
//! which provider serves it and routes each call to the matching
//! implementation in [`crate::llms::providers`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llms::base_llm::{BaseLLM, LLMMessage, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS};
use crate::llms::providers::gemini::GeminiCompletion;
use crate::llms::providers::ollama::OllamaCompletion;
use crate::llms::providers::openai::OpenAICompletion;
use crate::utilities::errors::LLMError;

/// Supported providers.
pub const SUPPORTED_PROVIDERS: &[&str] = &["ollama", "openai", "gemini"];

/// Main LLM struct.
///
/// Wraps a model identifier with the configuration needed to call it.
/// Provider instances are built per call, so an `LLM` is cheap to clone and
/// carries no connection state.
#[derive(Clone, Serialize, Deserialize)]
pub struct LLM {
    /// Model identifier, optionally provider-prefixed (e.g., "ollama/llama3.2").
    pub model: String,
    /// Explicit provider override (e.g., "ollama", "openai").
    pub provider: Option<String>,
    /// Temperature parameter for generation.
    pub temperature: Option<f64>,
    /// Timeout for API calls in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API endpoint.
    pub base_url: Option<String>,
    /// API key for authentication.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl LLM {
    /// Create a new LLM with a model identifier.
    ///
    /// # Arguments
    ///
    /// * `model` - Model identifier (e.g., "ollama/llama3.2", "gpt-4o-mini").
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            provider: None,
            temperature: Some(DEFAULT_TEMPERATURE),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: None,
            api_key: None,
        }
    }

    /// Create a new LLM with an explicit provider.
    pub fn with_provider(model: impl Into<String>, provider: impl Into<String>) -> Self {
        let mut llm = Self::new(model);
        llm.provider = Some(provider.into());
        llm
    }

    // --- Builder methods ---

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    // --- Provider inference ---

    /// Infer the provider from the model name.
    ///
    /// Checks the explicit provider, then the model string prefix, then
    /// falls back to model name patterns. Anything unrecognized is assumed
    /// to be a local Ollama model tag.
    pub fn infer_provider(&self) -> String {
        if let Some(ref provider) = self.provider {
            return provider.to_lowercase();
        }

        let model_lower = self.model.to_lowercase();

        if let Some((prefix, _)) = model_lower.split_once('/') {
            match prefix {
                "ollama" | "ollama_chat" => return "ollama".to_string(),
                "openai" => return "openai".to_string(),
                "google" | "gemini" => return "gemini".to_string(),
                _ => {}
            }
        }

        if model_lower.starts_with("gpt-")
            || model_lower.starts_with("o1")
            || model_lower.starts_with("o3")
            || model_lower.starts_with("o4")
        {
            return "openai".to_string();
        }
        if model_lower.starts_with("gemini-") || model_lower.starts_with("gemma-") {
            return "gemini".to_string();
        }

        "ollama".to_string()
    }

    /// The model name with any known provider prefix removed.
    pub fn model_name(&self) -> &str {
        match self.model.split_once('/') {
            Some((prefix, rest))
                if matches!(
                    prefix.to_lowercase().as_str(),
                    "ollama" | "ollama_chat" | "openai" | "google" | "gemini"
                ) =>
            {
                rest
            }
            _ => &self.model,
        }
    }

    /// Build the provider implementation for this model.
    pub fn build_provider(&self) -> Result<Box<dyn BaseLLM>, LLMError> {
        let provider = self.infer_provider();
        let model = self.model_name().to_string();

        match provider.as_str() {
            "ollama" => {
                let mut completion = OllamaCompletion::new(model, self.base_url.clone());
                completion.state.temperature = self.temperature;
                completion.state.timeout_secs = self.timeout_secs;
                Ok(Box::new(completion))
            }
            "openai" => {
                let mut completion =
                    OpenAICompletion::new(model, self.api_key.clone(), self.base_url.clone());
                completion.state.temperature = self.temperature;
                completion.state.timeout_secs = self.timeout_secs;
                Ok(Box::new(completion))
            }
            "gemini" => {
                let mut completion = GeminiCompletion::new(model, self.api_key.clone());
                completion.state.base_url = self.base_url.clone();
                completion.state.temperature = self.temperature;
                completion.state.timeout_secs = self.timeout_secs;
                Ok(Box::new(completion))
            }
            other => Err(LLMError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl Default for LLM {
    fn default() -> Self {
        Self::new("ollama/llama3.2")
    }
}

impl std::fmt::Debug for LLM {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLM")
            .field("model", &self.model)
            .field("provider", &self.infer_provider())
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl std::fmt::Display for LLM {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.infer_provider(), self.model_name())
    }
}

#[async_trait]
impl BaseLLM for LLM {
    fn model(&self) -> &str {
        self.model_name()
    }

    fn provider(&self) -> &str {
        // Only names build_provider can construct.
        match self.infer_provider().as_str() {
            "openai" => "openai",
            "gemini" => "gemini",
            "ollama" => "ollama",
            _ => "unknown",
        }
    }

    fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LLMError> {
        let provider = self.build_provider()?;
        log::debug!(
            "LLM.acall: model={}, provider={}, {} messages",
            provider.model(),
            provider.provider(),
            messages.len(),
        );
        provider.acall(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_new() {
        let llm = LLM::new("ollama/llama3.2");
        assert_eq!(llm.model, "ollama/llama3.2");
        assert_eq!(llm.temperature, Some(0.7));
        assert_eq!(llm.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_builder_pattern() {
        let llm = LLM::new("gpt-4o-mini")
            .temperature(0.2)
            .timeout(15)
            .base_url("http://proxy.local/v1")
            .api_key("sk-test");
        assert_eq!(llm.temperature, Some(0.2));
        assert_eq!(llm.timeout_secs, 15);
        assert_eq!(llm.base_url.as_deref(), Some("http://proxy.local/v1"));
        assert_eq!(llm.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_infer_provider_from_prefix() {
        assert_eq!(LLM::new("ollama/llama3.2").infer_provider(), "ollama");
        assert_eq!(LLM::new("openai/gpt-4o-mini").infer_provider(), "openai");
        assert_eq!(LLM::new("gemini/gemini-1.5-flash").infer_provider(), "gemini");
        assert_eq!(LLM::new("google/gemini-1.5-flash").infer_provider(), "gemini");
    }

    #[test]
    fn test_infer_provider_from_model_name() {
        assert_eq!(LLM::new("gpt-4o-mini").infer_provider(), "openai");
        assert_eq!(LLM::new("o3-mini").infer_provider(), "openai");
        assert_eq!(LLM::new("gemini-1.5-flash").infer_provider(), "gemini");
        assert_eq!(LLM::new("llama3.2").infer_provider(), "ollama");
        assert_eq!(LLM::new("mistral").infer_provider(), "ollama");
    }

    #[test]
    fn test_explicit_provider_wins() {
        let llm = LLM::with_provider("gpt-4o-mini", "Ollama");
        assert_eq!(llm.infer_provider(), "ollama");
    }

    #[test]
    fn test_model_name_strips_known_prefix() {
        assert_eq!(LLM::new("ollama/llama3.2").model_name(), "llama3.2");
        assert_eq!(LLM::new("gpt-4o-mini").model_name(), "gpt-4o-mini");
        // Namespaced Ollama tags keep their namespace.
        assert_eq!(LLM::new("library/llama3.2").model_name(), "library/llama3.2");
    }

    #[test]
    fn test_build_provider() {
        let provider = LLM::new("ollama/llama3.2").build_provider().unwrap();
        assert_eq!(provider.provider(), "ollama");
        assert_eq!(provider.model(), "llama3.2");

        let err = LLM::with_provider("claude-3", "anthropic")
            .build_provider()
            .unwrap_err();
        assert!(matches!(err, LLMError::UnsupportedProvider(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(LLM::new("gpt-4o-mini").to_string(), "openai/gpt-4o-mini");
    }
}
