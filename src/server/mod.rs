//! HTTP server for candidate screening.
//!
//! A thin adapter over [`ScreeningSession`](crate::screening::ScreeningSession):
//! each session lives in an in-memory registry behind its own async mutex,
//! so turns of one candidate run in order while different candidates are
//! served concurrently. Sessions leave the registry when the candidate
//! says goodbye or after sitting idle for the configured TTL.
//!
//! # Endpoints
//!
//! - `GET  /health`                - Liveness probe
//! - `POST /sessions`              - Start a screening
//! - `POST /sessions/:id/messages` - Submit a candidate message

pub mod routes;

pub use routes::{app_router, AppState};
