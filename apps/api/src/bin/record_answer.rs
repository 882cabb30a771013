//! Records one spoken answer from the default microphone and prints the
//! transcript. Recording stops automatically after one second of silence,
//! the same auto-stop the interview flow uses.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use api::audio::{AnswerRecorder, RecorderConfig};
use api::config::Config;
use api::provider::OpenAiClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if config.openai_api_key.is_empty() {
        eprintln!("warning: OPENAI_API_KEY is not set; transcription will fail");
    }

    let provider = Arc::new(OpenAiClient::new(
        config.openai_api_key,
        config.openai_base_url,
    ));
    let recorder = AnswerRecorder::new(RecorderConfig::default(), provider);

    println!("Recording from the default microphone.");
    println!("Speak your answer; recording stops after one second of silence.");

    let handle = recorder.start_from_mic()?;
    let transcript = handle.transcript().await?;

    println!("\nTranscript:\n{transcript}");
    Ok(())
}
