//! HTTP API v1 — session-based access to the onboarding assistant.
//!
//! Endpoints:
//!
//! - `POST /v1/sessions`                — Start a session
//! - `GET  /v1/sessions/{id}`           — Session gate state
//! - `POST /v1/sessions/{id}/password`  — Enter the shared password
//! - `PUT  /v1/sessions/{id}/profile`   — Submit name, unit and division
//! - `POST /v1/sessions/{id}/reset`     — Go back to the details form
//! - `POST /v1/sessions/{id}/clear`     — Empty the details form
//! - `GET  /v1/sessions/{id}/messages`  — Conversation so far
//! - `POST /v1/sessions/{id}/chat`      — Ask a question

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use buddy_agent::{OnboardingBuddy, RetrievedContext, TurnError};
use buddy_core::error::GateError;
use buddy_core::profile::UserProfile;
use buddy_session::{PasswordGate, SessionContext};

// ── State ─────────────────────────────────────────────────────────────────

/// Maximum number of in-memory sessions before the oldest are evicted.
const MAX_SESSIONS: usize = 1_000;

/// A live session and the moment it was opened.
///
/// The creation time sits outside the session lock so eviction never waits
/// on a turn in progress.
pub struct SessionSlot {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub context: Arc<Mutex<SessionContext>>,
}

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub buddy: Arc<OnboardingBuddy>,
    pub gate: Arc<PasswordGate>,
    /// Each session has its own lock so turns on one session run one at a time.
    pub sessions: RwLock<HashMap<String, SessionSlot>>,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl ApiV1State {
    pub fn new(buddy: Arc<OnboardingBuddy>, gate: Arc<PasswordGate>) -> Self {
        Self {
            buddy,
            gate,
            sessions: RwLock::new(HashMap::new()),
            start_time: chrono::Utc::now(),
        }
    }

    async fn session(&self, id: &str) -> Result<Arc<Mutex<SessionContext>>, ApiError> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|slot| slot.context.clone())
            .ok_or(ApiError::NotFound)
    }
}

pub type SharedApiState = Arc<ApiV1State>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/sessions/{id}", get(get_session_handler))
        .route("/sessions/{id}/password", post(password_handler))
        .route("/sessions/{id}/profile", put(profile_handler))
        .route("/sessions/{id}/reset", post(reset_handler))
        .route("/sessions/{id}/clear", post(clear_handler))
        .route("/sessions/{id}/messages", get(messages_handler))
        .route("/sessions/{id}/chat", post(chat_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum ApiError {
    NotFound,
    Gate(GateError),
}

impl From<GateError> for ApiError {
    fn from(e: GateError) -> Self {
        Self::Gate(e)
    }
}

impl From<TurnError> for ApiError {
    fn from(e: TurnError) -> Self {
        match e {
            TurnError::Gate(g) => Self::Gate(g),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Session not found".to_string()),
            ApiError::Gate(e) => {
                let status = match e {
                    GateError::IncorrectPassword => StatusCode::UNAUTHORIZED,
                    GateError::IncompleteProfile => StatusCode::UNPROCESSABLE_ENTITY,
                    GateError::Locked => StatusCode::FORBIDDEN,
                    GateError::ProfileSubmitted => StatusCode::CONFLICT,
                    GateError::EmptyQuestion => StatusCode::BAD_REQUEST,
                };
                (status, e.to_string())
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub id: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub password_in: bool,
    pub details_in: bool,
    pub chat_unlocked: bool,
    pub profile: UserProfile,
    pub message_count: usize,
}

impl From<&SessionContext> for SessionDto {
    fn from(s: &SessionContext) -> Self {
        Self {
            id: s.id.clone(),
            password_in: s.password_in,
            details_in: s.details_in,
            chat_unlocked: s.chat_unlocked(),
            profile: s.profile.clone(),
            message_count: s.memory.len(),
        }
    }
}

#[derive(Deserialize)]
struct PasswordRequest {
    password: String,
}

#[derive(Deserialize)]
struct ProfileRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    division: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageDto>,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Synthesised context the reply was grounded on (empty when none)
    pub context: String,
    pub sources: usize,
    pub notices: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    pub sessions: usize,
    pub index_built: bool,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn create_session_handler(
    State(state): State<SharedApiState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session = SessionContext::new();
    let id = session.id.clone();
    let created_at = session.memory.created_at;

    let mut sessions = state.sessions.write().await;

    // Evict the oldest session if at capacity, busy or not
    while sessions.len() >= MAX_SESSIONS {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, slot)| slot.created_at)
            .map(|(key, _)| key.clone());
        match oldest {
            Some(key) => {
                sessions.remove(&key);
                debug!(session = %key, "Evicted oldest session");
            }
            None => break,
        }
    }

    sessions.insert(
        id.clone(),
        SessionSlot {
            created_at,
            context: Arc::new(Mutex::new(session)),
        },
    );
    info!(session = %id, "Session created");

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            id,
            created_at: created_at.to_rfc3339(),
        }),
    )
}

async fn get_session_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>, ApiError> {
    let session = state.session(&id).await?;
    let session = session.lock().await;
    Ok(Json(SessionDto::from(&*session)))
}

async fn password_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    Json(payload): Json<PasswordRequest>,
) -> Result<Json<SessionDto>, ApiError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.password_check(&state.gate, &payload.password)?;
    Ok(Json(SessionDto::from(&*session)))
}

async fn profile_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<SessionDto>, ApiError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.set_profile(payload.name, payload.unit, payload.division)?;
    session.detail_check()?;
    Ok(Json(SessionDto::from(&*session)))
}

async fn reset_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>, ApiError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.detail_reset();
    Ok(Json(SessionDto::from(&*session)))
}

async fn clear_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>, ApiError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;
    session.detail_clear()?;
    Ok(Json(SessionDto::from(&*session)))
}

async fn messages_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let session = state.session(&id).await?;
    let session = session.lock().await;
    Ok(Json(MessageListResponse {
        messages: session
            .memory
            .messages
            .iter()
            .map(|m| MessageDto {
                id: m.id.clone(),
                role: m.role.to_string(),
                content: m.content.clone(),
                timestamp: m.timestamp.to_rfc3339(),
            })
            .collect(),
    }))
}

async fn chat_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session = state.session(&id).await?;
    let mut session = session.lock().await;

    let outcome = state.buddy.ask(&mut session, &payload.message).await?;
    let RetrievedContext { text, sources } = outcome.context;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        context: text,
        sources: sources.len(),
        notices: outcome.notices,
    }))
}

async fn status_handler(State(state): State<SharedApiState>) -> Json<StatusResponse> {
    let uptime = chrono::Utc::now() - state.start_time;
    Json(StatusResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_secs: uptime.num_seconds(),
        sessions: state.sessions.read().await.len(),
        index_built: state.buddy.knowledge().is_built(),
    })
}
