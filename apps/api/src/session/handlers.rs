//! Axum route handlers for the interview session API.

use axum::{
    extract::{Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::engine;
use crate::session::machine::{Answer, InterviewPhase, Session};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct ActiveQuestion {
    pub index: usize,
    pub question: String,
    /// Base64-encoded synthesized speech for the question.
    pub audio_content: String,
}

/// What a front end needs to render any phase of the flow.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub phase: InterviewPhase,
    pub progress_step: u8,
    pub question_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_question: Option<ActiveQuestion>,
    pub answers: Vec<Answer>,
}

impl SessionSnapshot {
    fn from_session(session: &Session) -> Self {
        let active_question = session.active_question().map(|q| ActiveQuestion {
            index: session.current_question,
            question: q.question.clone(),
            audio_content: BASE64.encode(&q.audio),
        });

        Self {
            id: session.id,
            phase: session.phase,
            progress_step: session.progress_step(),
            question_count: session.questions.len(),
            active_question,
            answers: session.answers.iter().flatten().cloned().collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interview
///
/// Accepts a résumé and creates a session in phase `idle`.
pub async fn handle_create(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let session = engine::create_session(&state.sessions, request.resume_text).await;
    Ok(Json(SessionSnapshot::from_session(&session)))
}

/// POST /api/v1/interview/:id/start
///
/// Generates both questions (sequentially, each with synthesized audio)
/// and activates question 1.
pub async fn handle_start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = engine::start_interview(&state.sessions, state.provider.as_ref(), id).await?;
    Ok(Json(SessionSnapshot::from_session(&session)))
}

/// GET /api/v1/interview/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state
        .sessions
        .snapshot(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
    Ok(Json(SessionSnapshot::from_session(&session)))
}

/// POST /api/v1/interview/:id/answer
///
/// Submits the transcript of a recorded answer for the active question.
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    if request.transcript.trim().is_empty() {
        return Err(AppError::Validation(
            "transcript cannot be empty".to_string(),
        ));
    }

    let session = engine::submit_answer(&state.sessions, id, request.transcript).await?;
    Ok(Json(SessionSnapshot::from_session(&session)))
}

/// POST /api/v1/interview/:id/end
///
/// Finalizes the interview: waits for the second transcript, runs the
/// combined feedback analysis, and publishes results.
pub async fn handle_end(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = engine::end_interview(&state.sessions, state.provider.as_ref(), id).await?;
    Ok(Json(SessionSnapshot::from_session(&session)))
}

/// POST /api/v1/interview/:id/restart
pub async fn handle_restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = engine::restart(&state.sessions, id).await?;
    Ok(Json(SessionSnapshot::from_session(&session)))
}
