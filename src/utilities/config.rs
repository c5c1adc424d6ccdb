//! Screening configuration.
//!
//! Loaded from an optional YAML file and then overridden by environment
//! variables. Every field has a default, so an empty file (or no file at
//! all) yields a working local setup: every persona on `ollama/llama3.2`
//! unless a hosted provider's key is present.
//!
//! ```yaml
//! data_dir: data
//! request_timeout_secs: 45
//! default_model: ollama/llama3.2
//! personas:
//!   malik: { model: gemini/gemini-1.5-flash, requires_env: GEMINI_API_KEY }
//!   clara: { model: openai/gpt-4o-mini, requires_env: OPENAI_API_KEY }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::LLM;
use crate::persistence::DEFAULT_RECORDS_FILE;
use crate::screening::persona::Persona;
use crate::utilities::errors::ConfigError;

/// Model binding for one persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaBinding {
    /// Model string, e.g. `openai/gpt-4o-mini`.
    pub model: String,
    /// Environment variable that must be set for the binding to apply.
    /// Without it the persona falls back to the default model.
    #[serde(default)]
    pub requires_env: Option<String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Directory holding the transcript log.
    pub data_dir: PathBuf,
    /// File name of the transcript log inside `data_dir`.
    pub records_file: String,
    /// Upper bound on a single model call.
    pub request_timeout_secs: u64,
    /// How long the HTTP server keeps an idle or ended session.
    pub session_ttl_secs: u64,
    pub temperature: f64,
    /// Model used by personas without an applicable binding.
    pub default_model: String,
    /// Base URL of the Ollama server.
    pub ollama_base_url: Option<String>,
    /// Persona name (case-insensitive) to model binding.
    pub personas: HashMap<String, PersonaBinding>,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        let mut personas = HashMap::new();
        personas.insert(
            "malik".to_string(),
            PersonaBinding {
                model: "gemini/gemini-1.5-flash".to_string(),
                requires_env: Some("GEMINI_API_KEY".to_string()),
            },
        );
        personas.insert(
            "clara".to_string(),
            PersonaBinding {
                model: "openai/gpt-4o-mini".to_string(),
                requires_env: Some("OPENAI_API_KEY".to_string()),
            },
        );

        Self {
            data_dir: PathBuf::from("data"),
            records_file: DEFAULT_RECORDS_FILE.to_string(),
            request_timeout_secs: 60,
            session_ttl_secs: 1800,
            temperature: 0.7,
            default_model: "ollama/llama3.2".to_string(),
            ollama_base_url: None,
            personas,
        }
    }
}

fn parse_secs(key: &str, value: String) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value,
    })
}

impl ScreeningConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: ScreeningConfig =
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
                path: origin.to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text, &path.display().to_string())
    }

    /// Load `TALENTSCOUT_CONFIG` (or `explicit`) if given, then apply
    /// environment overrides.
    pub fn from_env(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_var = std::env::var("TALENTSCOUT_CONFIG").ok().map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_var) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = lookup("TALENTSCOUT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(model) = lookup("TALENTSCOUT_MODEL") {
            self.default_model = model;
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.ollama_base_url = Some(url);
        }
        if let Some(value) = lookup("TALENTSCOUT_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_secs("TALENTSCOUT_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = lookup("TALENTSCOUT_SESSION_TTL_SECS") {
            self.session_ttl_secs = parse_secs("TALENTSCOUT_SESSION_TTL_SECS", value)?;
        }
        Ok(())
    }

    /// Reject persona keys that name no known persona.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in self.personas.keys() {
            key.parse::<Persona>()?;
        }
        Ok(())
    }

    /// Full path of the transcript log.
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(&self.records_file)
    }

    fn binding_for(&self, persona: Persona) -> Option<&PersonaBinding> {
        self.personas
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(persona.name()))
            .map(|(_, binding)| binding)
    }

    /// Resolve the model serving `persona`.
    ///
    /// `has_env` reports whether a binding's required variable is set.
    pub fn resolve_model(&self, persona: Persona, has_env: impl Fn(&str) -> bool) -> LLM {
        let model = match self.binding_for(persona) {
            Some(binding) => match binding.requires_env.as_deref() {
                Some(var) if !has_env(var) => {
                    log::debug!(
                        "{} binding {} skipped: {} not set",
                        persona,
                        binding.model,
                        var
                    );
                    self.default_model.as_str()
                }
                _ => binding.model.as_str(),
            },
            None => self.default_model.as_str(),
        };

        let mut llm = LLM::new(model)
            .temperature(self.temperature)
            .timeout(self.request_timeout_secs);
        if llm.infer_provider() == "ollama" {
            llm.base_url = self.ollama_base_url.clone();
        }
        llm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScreeningConfig::default();
        assert_eq!(config.records_path(), PathBuf::from("data/simulated_database.jsonl"));
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.session_ttl_secs, 1800);
        assert_eq!(config.default_model, "ollama/llama3.2");
    }

    #[test]
    fn test_resolve_model_uses_binding_when_key_present() {
        let config = ScreeningConfig::default();
        let llm = config.resolve_model(Persona::Malik, |var| var == "GEMINI_API_KEY");
        assert_eq!(llm.infer_provider(), "gemini");
        assert_eq!(llm.model_name(), "gemini-1.5-flash");
        assert_eq!(llm.timeout_secs, 60);
    }

    #[test]
    fn test_resolve_model_falls_back_without_key() {
        let config = ScreeningConfig::default();
        let llm = config.resolve_model(Persona::Clara, |_| false);
        assert_eq!(llm.to_string(), "ollama/llama3.2");

        let lani = config.resolve_model(Persona::Lani, |_| true);
        assert_eq!(lani.to_string(), "ollama/llama3.2");
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
request_timeout_secs: 15
ollama_base_url: http://gpu-box:11434
personas:
  Lani: { model: openai/gpt-4o-mini }
"#;
        let config = ScreeningConfig::from_yaml(yaml, "inline").unwrap();
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.records_file, DEFAULT_RECORDS_FILE);
        assert!(config.binding_for(Persona::Malik).is_none());

        let lani = config.resolve_model(Persona::Lani, |_| false);
        assert_eq!(lani.to_string(), "openai/gpt-4o-mini");
        let malik = config.resolve_model(Persona::Malik, |_| false);
        assert_eq!(malik.base_url.as_deref(), Some("http://gpu-box:11434"));
    }

    #[test]
    fn test_from_yaml_rejects_unknown_persona() {
        let yaml = "personas:\n  bob: { model: ollama/llama3.2 }\n";
        let err = ScreeningConfig::from_yaml(yaml, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPersona(name) if name == "bob"));
    }

    #[test]
    fn test_overrides() {
        let mut config = ScreeningConfig::default();
        config
            .apply_overrides(|key| match key {
                "TALENTSCOUT_DATA_DIR" => Some("/tmp/screening".into()),
                "TALENTSCOUT_TIMEOUT_SECS" => Some("5".into()),
                "TALENTSCOUT_SESSION_TTL_SECS" => Some(" 600 ".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/screening"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.session_ttl_secs, 600);

        let err = config
            .apply_overrides(|key| (key == "TALENTSCOUT_TIMEOUT_SECS").then(|| "soon".into()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScreeningConfig::load("/nonexistent/talentscout.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
