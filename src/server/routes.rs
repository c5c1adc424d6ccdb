//! Axum route handlers for the screening server.
//!
//! # Routes
//!
//! - `GET    /health`                 - Returns `{"status": "ok", "version": ...}`
//! - `GET    /personas`               - Available interviewer personas
//! - `POST   /sessions`               - Start a screening session
//! - `GET    /sessions/:id`           - Session transcript and state
//! - `DELETE /sessions/:id`           - Discard a session without persisting it
//! - `POST   /sessions/:id/messages`  - Submit one candidate message
//!
//! # Session lifetime
//!
//! A session stays in the live registry until its candidate says goodbye.
//! It is then replaced by a read-only transcript so `GET` keeps answering
//! and further messages get 409. Both live sessions idle for longer than
//! the session TTL and ended transcripts older than it are evicted by
//! [`AppState::evict_expired`], which [`AppState::spawn_sweeper`] runs
//! periodically. An evicted live session counts as abandoned and is not
//! persisted.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::llms::base_llm::LLMMessage;
use crate::persistence::{ConversationSink, JsonlConversationStore};
use crate::screening::{
    ConfiguredModelSelector, FailureKind, ModelSelector, Persona, ScreeningSession, TurnOutcome,
};
use crate::sentiment::{analyze_with, LexiconScorer, PolarityScorer, SentimentResult};
use crate::utilities::config::ScreeningConfig;
use crate::utilities::errors::SessionError;

/// Default time an idle or ended session is kept.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

/// Registry entry for a session that still takes messages.
pub struct LiveSession {
    session: Arc<Mutex<ScreeningSession>>,
    last_active: Instant,
}

/// Read-only transcript kept for a while after a session ended.
pub struct EndedSession {
    view: SessionView,
    ended_at: Instant,
}

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Sessions still taking messages, keyed by session id.
    pub sessions: Arc<DashMap<String, LiveSession>>,
    /// Transcripts of sessions closed by an exit phrase.
    pub ended_sessions: Arc<DashMap<String, EndedSession>>,
    /// Picks the model for a new session's persona.
    pub selector: Arc<dyn ModelSelector>,
    /// Receives transcripts of ended sessions.
    pub sink: Arc<dyn ConversationSink>,
    /// Scores candidate messages for the sentiment annotation.
    pub scorer: Arc<dyn PolarityScorer>,
    /// Upper bound on one model call.
    pub turn_timeout: Duration,
    /// Idle time after which a live session is dropped, and how long an
    /// ended transcript stays readable.
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(
        selector: Arc<dyn ModelSelector>,
        sink: Arc<dyn ConversationSink>,
        scorer: Arc<dyn PolarityScorer>,
        turn_timeout: Duration,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ended_sessions: Arc::new(DashMap::new()),
            selector,
            sink,
            scorer,
            turn_timeout,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// State wired from configuration: configured model selection, the
    /// JSONL transcript store and the lexicon scorer.
    pub fn from_config(config: &ScreeningConfig) -> Self {
        Self::new(
            Arc::new(ConfiguredModelSelector::new(config.clone())),
            Arc::new(JsonlConversationStore::new(config.records_path())),
            Arc::new(LexiconScorer),
            Duration::from_secs(config.request_timeout_secs),
        )
        .with_session_ttl(Duration::from_secs(config.session_ttl_secs))
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Live session by id, marking it active.
    fn live_session(&self, id: &str) -> Option<Arc<Mutex<ScreeningSession>>> {
        self.sessions.get_mut(id).map(|mut entry| {
            entry.last_active = Instant::now();
            Arc::clone(&entry.session)
        })
    }

    /// Error for an id that is not live: 409 if it ended, 404 otherwise.
    fn not_live(&self, id: &str) -> ApiError {
        if self.ended_sessions.contains_key(id) {
            api_error(
                StatusCode::CONFLICT,
                SessionError::SessionEnded(id.to_string()).to_string(),
            )
        } else {
            api_error(StatusCode::NOT_FOUND, format!("Session '{}' not found", id))
        }
    }

    /// Move an ended session out of the live registry.
    fn retire(&self, id: &str, view: SessionView) {
        self.sessions.remove(id);
        self.ended_sessions.insert(
            id.to_string(),
            EndedSession {
                view,
                ended_at: Instant::now(),
            },
        );
    }

    /// Drop live sessions idle for at least the TTL and ended transcripts
    /// older than it. Returns how many entries were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.session_ttl;
        let mut evicted = 0;

        self.sessions.retain(|id, live| {
            let keep = now.duration_since(live.last_active) < ttl;
            if !keep {
                tracing::info!(session_id = %id, "idle session abandoned");
                evicted += 1;
            }
            keep
        });
        self.ended_sessions.retain(|_, ended| {
            let keep = now.duration_since(ended.ended_at) < ttl;
            if !keep {
                evicted += 1;
            }
            keep
        });

        evicted
    }

    /// Run [`evict_expired`](Self::evict_expired) every quarter TTL
    /// (at least once a second) until the runtime shuts down.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = (self.session_ttl / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = state.evict_expired();
                if evicted > 0 {
                    tracing::debug!(evicted, "expired sessions evicted");
                }
            }
        })
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/personas", get(personas_handler))
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/:id",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/sessions/:id/messages", post(submit_message_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PersonaInfo {
    pub name: &'static str,
    pub style: &'static str,
    pub greeting: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub persona: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub persona: Persona,
    pub greeting: String,
}

fn default_sentiment() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub message: String,
    /// Annotate the candidate's message with its sentiment.
    #[serde(default = "default_sentiment")]
    pub sentiment: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitMessageResponse {
    pub reply: String,
    pub ended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub persona: Persona,
    pub ended: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub history: Vec<LLMMessage>,
}

impl From<&ScreeningSession> for SessionView {
    fn from(session: &ScreeningSession) -> Self {
        Self {
            session_id: session.id().to_string(),
            persona: session.persona(),
            ended: session.is_ended(),
            created_at: session.created_at(),
            history: session.history().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "talentscout",
    }))
}

/// GET /personas
async fn personas_handler() -> Json<Vec<PersonaInfo>> {
    Json(
        Persona::ALL
            .into_iter()
            .map(|persona| PersonaInfo {
                name: persona.name(),
                style: persona.style(),
                greeting: persona.greeting(),
            })
            .collect(),
    )
}

/// POST /sessions: start a screening.
///
/// An empty body selects Lani. A body that is present must be a valid
/// request naming a known persona, otherwise the answer is 400.
async fn create_session_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice::<CreateSessionRequest>(&body).map_err(|err| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", err),
            )
        })?
    };
    let persona = match request.persona.as_deref() {
        Some(name) => name
            .parse::<Persona>()
            .map_err(|err| api_error(StatusCode::BAD_REQUEST, err.to_string()))?,
        None => Persona::default(),
    };

    let model = state.selector.select(persona);
    let session = ScreeningSession::initialize(persona, model, Arc::clone(&state.sink))
        .with_turn_timeout(state.turn_timeout);

    let response = CreateSessionResponse {
        session_id: session.id().to_string(),
        persona,
        greeting: session.greeting().to_string(),
    };
    state.sessions.insert(
        response.session_id.clone(),
        LiveSession {
            session: Arc::new(Mutex::new(session)),
            last_active: Instant::now(),
        },
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /sessions/:id
async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    if let Some(session) = state.live_session(&id) {
        let session = session.lock().await;
        return Ok(Json(SessionView::from(&*session)));
    }
    state
        .ended_sessions
        .get(&id)
        .map(|ended| Json(ended.view.clone()))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Session '{}' not found", id)))
}

/// DELETE /sessions/:id: abandon a session. Nothing is persisted.
async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let live = state.sessions.remove(&id).is_some();
    let ended = state.ended_sessions.remove(&id).is_some();
    if live || ended {
        tracing::info!(session_id = %id, "session discarded");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Session '{}' not found", id),
        ))
    }
}

/// POST /sessions/:id/messages: one conversation turn.
///
/// Model failures still answer 200 with a fallback reply; only caller
/// mistakes map to error statuses.
async fn submit_message_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SubmitMessageRequest>,
) -> Result<Json<SubmitMessageResponse>, ApiError> {
    let session = state.live_session(&id).ok_or_else(|| state.not_live(&id))?;
    // Held across the model call so turns of one session never interleave.
    let mut session = session.lock().await;

    let turn = session.submit(&request.message).await.map_err(|err| match err {
        SessionError::EmptyInput => api_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        SessionError::SessionEnded(_) => api_error(StatusCode::CONFLICT, err.to_string()),
    })?;

    if turn.ended() {
        let view = SessionView::from(&*session);
        drop(session);
        state.retire(&id, view);
    }

    let sentiment = request
        .sentiment
        .then(|| analyze_with(state.scorer.as_ref(), &request.message));
    let fallback = match turn.outcome {
        TurnOutcome::Fallback(kind) => Some(kind),
        TurnOutcome::Reply | TurnOutcome::Closed => None,
    };

    Ok(Json(SubmitMessageResponse {
        ended: turn.ended(),
        reply: turn.reply,
        fallback,
        sentiment,
    }))
}
