//! OpenAI-backed implementation of [`InterviewProvider`].
//!
//! Models are hardcoded to match the product behavior: `gpt-4` for text,
//! `tts-1` (voice `alloy`) for speech, `whisper-1` for transcription.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::prompts::{
    feedback_prompt, question_prompt, FEEDBACK_SYSTEM, QUESTION_SYSTEM,
};
use crate::provider::{AnswerPair, InterviewProvider, ProviderError, QuestionAudio};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CHAT_MODEL: &str = "gpt-4";
const SPEECH_MODEL: &str = "tts-1";
const SPEECH_VOICE: &str = "alloy";
const TRANSCRIPTION_MODEL: &str = "whisper-1";
const TRANSCRIPTION_LANGUAGE: &str = "en";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The OpenAI client used by all routes and the answer recorder.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// One chat-completion call. Returns the first choice's content.
    async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let request_body = ChatRequest {
            model: CHAT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let chat: ChatResponse = response.json().await?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        debug!("chat completion succeeded ({} chars)", content.len());
        Ok(content)
    }

    /// One speech-synthesis call. Returns the raw audio bytes.
    async fn speech(&self, input: &str) -> Result<Vec<u8>, ProviderError> {
        let request_body = SpeechRequest {
            model: SPEECH_MODEL,
            voice: SPEECH_VOICE,
            input,
        };

        let response = self
            .client
            .post(self.endpoint("audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let audio = response.bytes().await?.to_vec();

        if audio.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        debug!("speech synthesis succeeded ({} bytes)", audio.len());
        Ok(audio)
    }

    /// One transcription call (multipart WAV upload).
    async fn transcription(&self, audio: Vec<u8>) -> Result<String, ProviderError> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", TRANSCRIPTION_LANGUAGE);

        let response = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await?;
        let transcription: TranscriptionResponse = response.json().await?;

        debug!(
            "transcription succeeded ({} chars)",
            transcription.text.len()
        );
        Ok(transcription.text)
    }
}

/// Maps non-success responses to `ProviderError::Api`, extracting the
/// provider's error message when the body parses.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<OpenAiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(ProviderError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl InterviewProvider for OpenAiClient {
    async fn generate_question(&self, resume_text: &str) -> Result<QuestionAudio, ProviderError> {
        let question = self
            .chat(QUESTION_SYSTEM, &question_prompt(resume_text))
            .await?;
        let audio = self.speech(&question).await?;
        Ok(QuestionAudio { question, audio })
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ProviderError> {
        self.transcription(audio).await
    }

    async fn analyze_answers(
        &self,
        answers: &[AnswerPair; 2],
        resume_text: &str,
    ) -> Result<String, ProviderError> {
        self.chat(FEEDBACK_SYSTEM, &feedback_prompt(answers, resume_text))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = OpenAiClient::new("key".to_string(), "https://api.test/v1/".to_string());
        assert_eq!(
            client.endpoint("chat/completions"),
            "https://api.test/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_response_extracts_first_choice() {
        let json = r#"{
            "choices": [
                {"message": {"content": "Tell me about your Go experience."}},
                {"message": {"content": "ignored"}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap();
        assert_eq!(content, "Tell me about your Go experience.");
    }

    #[test]
    fn test_error_envelope_parses_provider_message() {
        let json = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let parsed: OpenAiErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.message, "Incorrect API key provided");
    }
}
