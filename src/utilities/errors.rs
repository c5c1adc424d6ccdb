//! Error types for the screening assistant.
//!
//! Model failures are recovered inside the conversation session and turned
//! into reply text, so [`LLMError`] carries enough structure for the session
//! to tell an unreachable model apart from any other failure.

use thiserror::Error;

/// Errors raised by a model capability call.
#[derive(Debug, Error)]
pub enum LLMError {
    /// The provider endpoint could not be reached (refused, DNS, connect).
    #[error("Connection to {provider} failed: {message}")]
    Connection { provider: String, message: String },

    /// The call did not finish within the configured turn timeout.
    #[error("{provider} call timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    /// A hosted provider was selected without its credential.
    #[error("{provider} API key not set. Set the {env_var} environment variable.")]
    MissingApiKey { provider: String, env_var: String },

    /// The provider answered with a non-success status.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider answered but the payload had no usable reply text.
    #[error("Invalid {provider} response: {message}")]
    InvalidResponse { provider: String, message: String },

    /// The model string names a provider this crate cannot call.
    #[error("Provider '{0}' not supported. Supported: ollama, openai, gemini")]
    UnsupportedProvider(String),

    /// Any other transport error.
    #[error(transparent)]
    Http(reqwest::Error),
}

impl LLMError {
    /// Map a transport error from `reqwest` into the taxonomy.
    pub fn from_reqwest(provider: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout {
                provider: provider.to_string(),
                seconds: timeout_secs,
            }
        } else if err.is_connect() {
            LLMError::Connection {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        } else {
            LLMError::Http(err)
        }
    }

    /// Whether the failure means the model could not be reached at all.
    ///
    /// Timeouts count as unreachable so they share the same fallback reply.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, LLMError::Connection { .. } | LLMError::Timeout { .. })
    }
}

/// Errors returned to the caller of a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Empty or whitespace-only input.
    #[error("Message must not be empty")]
    EmptyInput,

    /// The candidate already said goodbye.
    #[error("Session {0} has ended")]
    SessionEnded(String),
}

/// Errors from the transcript sink.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Transcript store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize transcript record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single violated rule on a candidate profile field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileValidationError {
    #[error("Field '{0}' must not be blank")]
    BlankField(&'static str),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("'{0}' is not a valid phone number")]
    InvalidPhone(String),

    #[error("Years of experience must not be negative (got {0})")]
    NegativeExperience(i32),

    #[error("Field '{0}' contains an empty entry")]
    EmptyListEntry(&'static str),
}

/// Errors while loading the screening configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unknown persona '{0}'. Expected one of: Lani, Malik, Clara")]
    UnknownPersona(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_classification() {
        let refused = LLMError::Connection {
            provider: "ollama".into(),
            message: "connection refused".into(),
        };
        let timeout = LLMError::Timeout {
            provider: "ollama".into(),
            seconds: 30,
        };
        let api = LLMError::Api {
            provider: "openai".into(),
            status: 401,
            body: "bad key".into(),
        };

        assert!(refused.is_unreachable());
        assert!(timeout.is_unreachable());
        assert!(!api.is_unreachable());
        assert!(!LLMError::UnsupportedProvider("foo".into()).is_unreachable());
    }

    #[test]
    fn test_error_messages() {
        let err = LLMError::MissingApiKey {
            provider: "OpenAI".into(),
            env_var: "OPENAI_API_KEY".into(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert_eq!(
            SessionError::SessionEnded("abc".into()).to_string(),
            "Session abc has ended"
        );
    }
}
