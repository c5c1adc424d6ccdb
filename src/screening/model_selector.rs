//! Persona to model selection.
//!
//! The session never decides which provider answers; it is handed a model
//! by a [`ModelSelector`]. The configured selector resolves bindings from
//! [`ScreeningConfig`], and tests or embedders can pin a single model.

use std::sync::Arc;

use crate::llms::base_llm::BaseLLM;
use crate::screening::persona::Persona;
use crate::utilities::config::ScreeningConfig;

/// Strategy choosing the model capability for a persona.
pub trait ModelSelector: Send + Sync + std::fmt::Debug {
    fn select(&self, persona: Persona) -> Arc<dyn BaseLLM>;
}

/// Selector driven by [`ScreeningConfig`] bindings and the process environment.
#[derive(Debug, Clone)]
pub struct ConfiguredModelSelector {
    config: ScreeningConfig,
}

impl ConfiguredModelSelector {
    pub fn new(config: ScreeningConfig) -> Self {
        Self { config }
    }
}

impl ModelSelector for ConfiguredModelSelector {
    fn select(&self, persona: Persona) -> Arc<dyn BaseLLM> {
        let llm = self
            .config
            .resolve_model(persona, |var| std::env::var(var).is_ok_and(|v| !v.is_empty()));
        log::info!("Persona {} served by {}", persona, llm);
        Arc::new(llm)
    }
}

/// Selector returning the same model for every persona.
#[derive(Debug, Clone)]
pub struct FixedModelSelector {
    model: Arc<dyn BaseLLM>,
}

impl FixedModelSelector {
    pub fn new(model: Arc<dyn BaseLLM>) -> Self {
        Self { model }
    }
}

impl ModelSelector for FixedModelSelector {
    fn select(&self, _persona: Persona) -> Arc<dyn BaseLLM> {
        Arc::clone(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLM;

    #[test]
    fn test_fixed_selector_ignores_persona() {
        let selector = FixedModelSelector::new(Arc::new(LLM::new("ollama/phi3")));
        for persona in Persona::ALL {
            let model = selector.select(persona);
            assert_eq!(model.model(), "phi3");
            assert_eq!(model.provider(), "ollama");
        }
    }

    #[test]
    fn test_configured_selector_default_persona() {
        let mut config = ScreeningConfig::default();
        config.default_model = "ollama/mistral".to_string();
        config.request_timeout_secs = 9;
        let selector = ConfiguredModelSelector::new(config);

        let model = selector.select(Persona::Lani);
        assert_eq!(model.model(), "mistral");
        assert_eq!(model.temperature(), Some(0.7));
    }
}
