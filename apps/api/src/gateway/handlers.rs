//! Axum route handlers for the provider gateway.
//!
//! Input validation happens here (400); provider-side failures map to a
//! generic 500 with detail logged, never surfaced.

use axum::extract::{Multipart, State};
use axum::Json;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::extract_pdf_text;
use crate::provider::AnswerPair;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionResponse {
    pub question: String,
    /// Base64-encoded synthesized speech for the question.
    pub audio_content: String,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeAnswerRequest {
    pub answers: Vec<AnswerPair>,
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeAnswerResponse {
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct PdfExtractResponse {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate-question
///
/// Generates one interview question from the résumé and synthesizes its
/// speech in the same operation.
pub async fn handle_generate_question(
    State(state): State<AppState>,
    Json(request): Json<GenerateQuestionRequest>,
) -> Result<Json<GenerateQuestionResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let generated = state.provider.generate_question(&request.resume_text).await?;

    Ok(Json(GenerateQuestionResponse {
        question: generated.question,
        audio_content: BASE64.encode(&generated.audio),
    }))
}

/// POST /api/v1/transcribe
///
/// Transcribes a recorded answer uploaded as the multipart `file` field.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, AppError> {
    let audio = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("Audio file is required".to_string()))?;

    let text = state.provider.transcribe(audio.to_vec()).await?;
    Ok(Json(TranscribeResponse { text }))
}

/// POST /api/v1/analyze-answer
///
/// Runs the single combined feedback analysis. Fails fast unless exactly
/// two answers are supplied.
pub async fn handle_analyze_answer(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeAnswerRequest>,
) -> Result<Json<AnalyzeAnswerResponse>, AppError> {
    let answers: [AnswerPair; 2] = request.answers.try_into().map_err(|rejected: Vec<_>| {
        AppError::Validation(format!(
            "exactly two answers are required, got {}",
            rejected.len()
        ))
    })?;

    let feedback = state
        .provider
        .analyze_answers(&answers, &request.resume_text)
        .await?;

    Ok(Json(AnalyzeAnswerResponse { feedback }))
}

/// POST /api/v1/pdf-extract
///
/// Extracts the text layer of a PDF uploaded as the multipart `file` field.
pub async fn handle_pdf_extract(
    mut multipart: Multipart,
) -> Result<Json<PdfExtractResponse>, AppError> {
    let data = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    // pdf-extract is synchronous and CPU-bound; keep it off the runtime.
    let text = tokio::task::spawn_blocking(move || extract_pdf_text(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    Ok(Json(PdfExtractResponse { text }))
}

/// Reads the `file` field from a multipart form, if present.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<Bytes>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("failed to read file field: {e}")))?;
            return Ok(Some(data));
        }
    }
    Ok(None)
}
