//! Provider gateway — the single point of entry for all external AI calls.
//!
//! ARCHITECTURAL RULE: no other module may call the OpenAI API directly.
//! Question generation, speech synthesis, transcription, and feedback
//! analysis all go through the `InterviewProvider` trait, so tests can swap
//! in a scripted provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod openai;
pub mod prompts;

pub use openai::OpenAiClient;

/// A question/answer pair submitted for feedback analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerPair {
    pub question: String,
    pub answer: String,
}

/// A generated interview question together with its synthesized speech.
#[derive(Debug, Clone)]
pub struct QuestionAudio {
    pub question: String,
    /// Raw audio bytes as returned by the speech endpoint.
    pub audio: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider returned an empty response")]
    EmptyResponse,
}

/// External AI operations needed by the interview flow.
///
/// Each method performs exactly one outbound call — no retries, no caching.
#[async_trait]
pub trait InterviewProvider: Send + Sync {
    /// Generates one interview question from the résumé text and synthesizes
    /// speech for it.
    async fn generate_question(&self, resume_text: &str) -> Result<QuestionAudio, ProviderError>;

    /// Transcribes a recorded answer (WAV payload) to text.
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ProviderError>;

    /// Produces one combined feedback text for both answers.
    async fn analyze_answers(
        &self,
        answers: &[AnswerPair; 2],
        resume_text: &str,
    ) -> Result<String, ProviderError>;
}
