//! LLM provider implementations.
//!
//! Each provider implements the [`BaseLLM`](crate::llms::base_llm::BaseLLM)
//! trait and handles authentication, request formatting and error mapping
//! specific to that provider.
//!
//! # Available Providers
//!
//! | Provider | Module | Model string |
//! |----------|--------|--------------|
//! | Ollama | [`ollama`] | `ollama/llama3.2` |
//! | OpenAI | [`openai`] | `openai/gpt-4o-mini` |
//! | Gemini | [`gemini`] | `gemini/gemini-1.5-flash` |

pub mod gemini;
pub mod ollama;
pub mod openai;
