//! Conversation session for one candidate.
//!
//! A session owns the ordered history of a single screening. History is
//! append-only: the persona greeting is recorded at creation, then each
//! turn appends the candidate's message and, when the model answered, its
//! reply. The persona's system instruction is never stored; it is prepended
//! to the history only when calling the model.
//!
//! ```text
//!            submit(other)
//!           ┌──────────┐
//!           ▼          │
//!        Active ───────┘
//!           │ submit(exit phrase)
//!           ▼
//!         Ended   (further submits are rejected)
//! ```
//!
//! Model failures never escape [`ScreeningSession::submit`]. The candidate's
//! message stays in history without a paired reply, and the caller gets a
//! fallback text describing the failure class instead.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llms::base_llm::{BaseLLM, LLMMessage, DEFAULT_TIMEOUT_SECS};
use crate::persistence::ConversationSink;
use crate::screening::persona::Persona;
use crate::utilities::errors::{LLMError, SessionError};

/// Phrases that end the screening (compared after trim + lowercase).
pub const EXIT_PHRASES: [&str; 5] = ["exit", "quit", "stop", "bye", "goodbye"];

/// Reply sent when the candidate ends the conversation.
pub const CLOSING_MESSAGE: &str = "Thank you for chatting with TalentScout. The conversation has ended. Our team will review your profile and get back to you. Have a great day!";

/// Reply sent when the model could not be reached or timed out.
pub const MODEL_UNREACHABLE_MESSAGE: &str = "It seems my local AI brain (Ollama) is not reachable. Please start the Ollama server, or configure a hosted model provider for this persona and try again.";

/// Whether `text` is exactly one of [`EXIT_PHRASES`], ignoring case and
/// surrounding whitespace.
pub fn is_exit_phrase(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    EXIT_PHRASES.contains(&normalized.as_str())
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Ended,
}

/// Failure class of a model call that was recovered into a fallback reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ModelUnreachable,
    ModelError,
}

impl FailureKind {
    /// Classify a model error and render the reply shown to the candidate.
    pub fn fallback_for(err: &LLMError) -> (FailureKind, String) {
        if err.is_unreachable() {
            (
                FailureKind::ModelUnreachable,
                MODEL_UNREACHABLE_MESSAGE.to_string(),
            )
        } else {
            (
                FailureKind::ModelError,
                format!("I'm sorry, I encountered an error: {}.", err),
            )
        }
    }
}

/// How a turn concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered and both messages were recorded.
    Reply,
    /// The model call failed; only the user message was recorded.
    Fallback(FailureKind),
    /// An exit phrase ended the session.
    Closed,
}

/// Result of one [`ScreeningSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Text to show the candidate.
    pub reply: String,
    pub outcome: TurnOutcome,
}

impl Turn {
    pub fn ended(&self) -> bool {
        self.outcome == TurnOutcome::Closed
    }
}

/// One candidate's screening dialogue.
#[derive(Debug)]
pub struct ScreeningSession {
    id: String,
    persona: Persona,
    history: Vec<LLMMessage>,
    state: SessionState,
    created_at: DateTime<Utc>,
    model: Arc<dyn BaseLLM>,
    sink: Arc<dyn ConversationSink>,
    turn_timeout: Duration,
}

impl ScreeningSession {
    /// Start a session for `persona`, recording its greeting.
    pub fn initialize(
        persona: Persona,
        model: Arc<dyn BaseLLM>,
        sink: Arc<dyn ConversationSink>,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        log::info!(
            "Session {} started with persona {} on {}/{}",
            id,
            persona,
            model.provider(),
            model.model()
        );

        Self {
            id,
            persona,
            history: vec![LLMMessage::assistant(persona.greeting())],
            state: SessionState::Active,
            created_at: Utc::now(),
            model,
            sink,
            turn_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Replace the generated session id.
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Bound each model call; expiry is treated like an unreachable model.
    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// Recorded messages, oldest first. Never contains the system instruction.
    pub fn history(&self) -> &[LLMMessage] {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.state == SessionState::Ended
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The opening greeting.
    pub fn greeting(&self) -> &str {
        self.persona.greeting()
    }

    /// Process one candidate message.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyInput`] for blank text and
    /// [`SessionError::SessionEnded`] after an exit phrase. Neither touches
    /// history. Model failures are not errors; see [`TurnOutcome::Fallback`].
    pub async fn submit(&mut self, user_text: &str) -> Result<Turn, SessionError> {
        if self.is_ended() {
            return Err(SessionError::SessionEnded(self.id.clone()));
        }
        if user_text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        if is_exit_phrase(user_text) {
            return Ok(self.close(user_text).await);
        }

        let messages = self.build_messages(user_text);
        let result = match tokio::time::timeout(self.turn_timeout, self.model.acall(messages)).await
        {
            Ok(result) => result,
            Err(_) => Err(LLMError::Timeout {
                provider: self.model.provider().to_string(),
                seconds: self.turn_timeout.as_secs(),
            }),
        };

        self.history.push(LLMMessage::user(user_text));

        match result {
            Ok(reply) => {
                self.history.push(LLMMessage::assistant(reply.clone()));
                log::debug!(
                    "Session {}: turn complete, history={}",
                    self.id,
                    self.history.len()
                );
                Ok(Turn {
                    reply,
                    outcome: TurnOutcome::Reply,
                })
            }
            Err(err) => {
                let (kind, reply) = FailureKind::fallback_for(&err);
                log::warn!("Session {}: model call failed ({:?}): {}", self.id, kind, err);
                Ok(Turn {
                    reply,
                    outcome: TurnOutcome::Fallback(kind),
                })
            }
        }
    }

    /// Messages sent to the model: instruction, history, then the new input.
    fn build_messages(&self, user_text: &str) -> Vec<LLMMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(LLMMessage::system(self.persona.system_prompt()));
        messages.extend(self.history.iter().cloned());
        messages.push(LLMMessage::user(user_text));
        messages
    }

    async fn close(&mut self, user_text: &str) -> Turn {
        self.history.push(LLMMessage::user(user_text));
        self.history.push(LLMMessage::assistant(CLOSING_MESSAGE));
        self.state = SessionState::Ended;

        // Sinks may block on file I/O, so keep them off the async workers.
        let sink = Arc::clone(&self.sink);
        let id = self.id.clone();
        let history = self.history.clone();
        let written = tokio::task::spawn_blocking(move || sink.append(&id, &history)).await;

        // The candidate still gets the closing line if the write fails.
        match written {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                log::warn!("Session {}: failed to persist transcript: {}", self.id, err)
            }
            Err(err) => log::warn!("Session {}: transcript writer panicked: {}", self.id, err),
        }
        log::info!(
            "Session {} ended after {} messages",
            self.id,
            self.history.len()
        );

        Turn {
            reply: CLOSING_MESSAGE.to_string(),
            outcome: TurnOutcome::Closed,
        }
    }
}
