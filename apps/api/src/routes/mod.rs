pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::gateway::handlers as gateway;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Provider gateway
        .route(
            "/api/v1/generate-question",
            post(gateway::handle_generate_question),
        )
        .route("/api/v1/transcribe", post(gateway::handle_transcribe))
        .route(
            "/api/v1/analyze-answer",
            post(gateway::handle_analyze_answer),
        )
        .route("/api/v1/pdf-extract", post(gateway::handle_pdf_extract))
        // Interview session API
        .route("/api/v1/interview", post(session::handle_create))
        .route("/api/v1/interview/:id", get(session::handle_get))
        .route("/api/v1/interview/:id/start", post(session::handle_start))
        .route("/api/v1/interview/:id/answer", post(session::handle_answer))
        .route("/api/v1/interview/:id/end", post(session::handle_end))
        .route(
            "/api/v1/interview/:id/restart",
            post(session::handle_restart),
        )
        .with_state(state)
}
