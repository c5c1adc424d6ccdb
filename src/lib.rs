//! # TalentScout
//!
//! A conversational screening assistant for technology candidates.
//!
//! A candidate picks an interviewer persona and chats with it. The persona
//! collects a fixed set of profile details, then asks technical questions
//! about the candidate's stack. Each turn forwards the whole conversation to
//! a pluggable language model. When the candidate says goodbye the
//! transcript is appended, with an obscured session id, to a JSONL log.
//!
//! The crate owns the session protocol and leaves the edges replaceable:
//! model providers implement [`BaseLLM`], the transcript store implements
//! [`ConversationSink`](persistence::ConversationSink), and sentiment scores
//! come from a [`PolarityScorer`](sentiment::PolarityScorer).

pub mod llm;
pub mod llms;
pub mod persistence;
pub mod profile;
pub mod screening;
pub mod sentiment;
pub mod server;
pub mod utilities;

pub use llm::LLM;
pub use llms::base_llm::{BaseLLM, LLMMessage, MessageRole};
pub use persistence::{JsonlConversationStore, PersistedRecord};
pub use profile::CandidateProfile;
pub use screening::{Persona, ScreeningSession, Turn, TurnOutcome};
pub use sentiment::{analyze_sentiment, SentimentLabel, SentimentResult};
pub use utilities::config::ScreeningConfig;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
