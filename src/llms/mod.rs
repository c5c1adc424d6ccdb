//! LLM system for the screening assistant.
//!
//! - [`base_llm`] - The message contract and the base trait for all providers
//! - [`providers`] - Provider implementations (Ollama, OpenAI, Gemini)

pub mod base_llm;
pub mod providers;

pub use base_llm::{BaseLLM, BaseLLMState, LLMMessage, MessageRole};
