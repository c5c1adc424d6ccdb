//! Candidate screening conversations.
//!
//! - [`persona`] - Interviewer personas, their instructions and greetings
//! - [`session`] - The turn-taking session and its exit/fallback handling
//! - [`model_selector`] - Strategy picking the model that serves a persona

pub mod model_selector;
pub mod persona;
pub mod session;

pub use model_selector::{ConfiguredModelSelector, FixedModelSelector, ModelSelector};
pub use persona::Persona;
pub use session::{
    is_exit_phrase, FailureKind, ScreeningSession, SessionState, Turn, TurnOutcome,
    CLOSING_MESSAGE, EXIT_PHRASES, MODEL_UNREACHABLE_MESSAGE,
};
