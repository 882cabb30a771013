//! The answer recorder: consumes captured frames, auto-stops on silence,
//! assembles the buffered audio into a WAV payload, hands it to the
//! transcription gateway, and delivers the transcript exactly once.
//!
//! The frame source is any `mpsc::Receiver<Vec<f32>>` — the microphone in
//! production, synthetic signals in tests. Transcription failures are
//! delivered through the same one-shot channel instead of being swallowed,
//! so the orchestration layer can react instead of stalling.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info};

use crate::audio::capture::{CaptureStop, MicCapture};
use crate::audio::silence::{SilenceDetector, SILENCE_THRESHOLD_DB, SILENCE_WINDOW};
use crate::audio::wav::{encode_wav, f32_to_i16};
use crate::provider::{InterviewProvider, ProviderError};

/// Observable phase of a recording session.
///
/// `Idle` is the pre-session state; a spawned session starts in
/// `Capturing` and ends in `Stopping` once the recording is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Capturing,
    Stopping,
}

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub sample_rate: u32,
    pub silence_threshold_db: f32,
    pub silence_window: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            silence_threshold_db: SILENCE_THRESHOLD_DB,
            silence_window: SILENCE_WINDOW,
        }
    }
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("microphone access failed: {0}")]
    MediaAccess(String),

    #[error("recording produced no audio")]
    EmptyRecording,

    #[error("failed to assemble WAV payload: {0}")]
    Encode(#[from] hound::Error),

    #[error("transcription failed: {0}")]
    Transcription(#[from] ProviderError),

    #[error("recorder stopped without delivering a transcript")]
    Closed,
}

/// Spawns recording sessions against a transcription gateway.
pub struct AnswerRecorder {
    config: RecorderConfig,
    transcriber: Arc<dyn InterviewProvider>,
}

impl AnswerRecorder {
    pub fn new(config: RecorderConfig, transcriber: Arc<dyn InterviewProvider>) -> Self {
        Self { config, transcriber }
    }

    /// Begins a capture session over an arbitrary frame source.
    pub fn start(&self, frames: mpsc::Receiver<Vec<f32>>) -> RecordingHandle {
        spawn_session(self.config.clone(), self.transcriber.clone(), frames, None)
    }

    /// Acquires the default microphone and begins a capture session at the
    /// device's native sample rate.
    pub fn start_from_mic(&self) -> Result<RecordingHandle, RecorderError> {
        let (tx, rx) = mpsc::channel(64);
        let capture = MicCapture::open(tx)?;

        let mut config = self.config.clone();
        config.sample_rate = capture.sample_rate();

        let mut handle = spawn_session(
            config,
            self.transcriber.clone(),
            rx,
            Some(capture.stop_signal()),
        );
        handle.capture = Some(capture);
        Ok(handle)
    }
}

/// Handle to one in-flight recording session.
pub struct RecordingHandle {
    state_rx: watch::Receiver<RecorderState>,
    stop_tx: Option<oneshot::Sender<()>>,
    transcript_rx: oneshot::Receiver<Result<String, RecorderError>>,
    capture: Option<MicCapture>,
}

impl RecordingHandle {
    pub fn state(&self) -> RecorderState {
        *self.state_rx.borrow()
    }

    /// Externally stops the capture session. Idempotent; the buffered audio
    /// is still finalized and transcribed.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop_tx.take() {
            let _ = stop.send(());
        }
        if let Some(mut capture) = self.capture.take() {
            capture.stop();
        }
    }

    /// Waits for the transcript. Resolves exactly once per session; a
    /// transcription failure is returned, not swallowed.
    pub async fn transcript(mut self) -> Result<String, RecorderError> {
        self.transcript_rx
            .await
            .unwrap_or(Err(RecorderError::Closed))
    }
}

fn spawn_session(
    config: RecorderConfig,
    transcriber: Arc<dyn InterviewProvider>,
    mut frames: mpsc::Receiver<Vec<f32>>,
    capture_stop: Option<CaptureStop>,
) -> RecordingHandle {
    let (state_tx, state_rx) = watch::channel(RecorderState::Capturing);
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let (transcript_tx, transcript_rx) = oneshot::channel();

    tokio::spawn(async move {
        let mut detector = SilenceDetector::new(
            config.sample_rate,
            config.silence_threshold_db,
            config.silence_window,
        );
        let mut samples: Vec<i16> = Vec::new();

        loop {
            tokio::select! {
                // Buffered frames are drained before a stop takes effect, so
                // audio captured up to the stop is not lost.
                biased;

                frame = frames.recv() => match frame {
                    Some(frame) => {
                        samples.extend(frame.iter().map(|&s| f32_to_i16(s)));
                        if detector.push_frame(&frame) {
                            info!("silence window elapsed, stopping recording");
                            break;
                        }
                    }
                    None => {
                        debug!("frame source closed, stopping recording");
                        break;
                    }
                },

                _ = &mut stop_rx => {
                    debug!("external stop, finalizing recording");
                    break;
                }
            }
        }

        // Release the device before the transcription round-trip.
        let _ = state_tx.send(RecorderState::Stopping);
        if let Some(stop) = capture_stop {
            stop.stop();
        }

        let result = finalize(samples, &config, transcriber.as_ref()).await;
        if let Err(e) = &result {
            error!("recording session failed: {e}");
        }
        let _ = transcript_tx.send(result);
    });

    RecordingHandle {
        state_rx,
        stop_tx: Some(stop_tx),
        transcript_rx,
        capture: None,
    }
}

async fn finalize(
    samples: Vec<i16>,
    config: &RecorderConfig,
    transcriber: &dyn InterviewProvider,
) -> Result<String, RecorderError> {
    if samples.is_empty() {
        return Err(RecorderError::EmptyRecording);
    }

    let wav = encode_wav(&samples, config.sample_rate)?;
    debug!(
        "assembled {} samples into a {}-byte WAV payload",
        samples.len(),
        wav.len()
    );

    let transcript = transcriber.transcribe(wav).await?;
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::provider::{AnswerPair, QuestionAudio};

    struct StubTranscriber {
        calls: AtomicUsize,
        last_payload_len: Mutex<usize>,
        fail: bool,
    }

    impl StubTranscriber {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_payload_len: Mutex::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl InterviewProvider for StubTranscriber {
        async fn generate_question(&self, _: &str) -> Result<QuestionAudio, ProviderError> {
            unreachable!("recorder never generates questions")
        }

        async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_payload_len.lock().unwrap() = audio.len();
            if self.fail {
                Err(ProviderError::EmptyResponse)
            } else {
                Ok("transcribed answer".to_string())
            }
        }

        async fn analyze_answers(
            &self,
            _: &[AnswerPair; 2],
            _: &str,
        ) -> Result<String, ProviderError> {
            unreachable!("recorder never analyzes answers")
        }
    }

    fn recorder(transcriber: Arc<StubTranscriber>) -> AnswerRecorder {
        AnswerRecorder::new(RecorderConfig::default(), transcriber)
    }

    fn quiet_frame() -> Vec<f32> {
        vec![0.005; 1_600] // 100 ms at 16 kHz, -46 dBFS
    }

    fn loud_frame() -> Vec<f32> {
        vec![0.5; 1_600]
    }

    #[tokio::test]
    async fn test_auto_stops_after_silence_window() {
        let stub = StubTranscriber::new(false);
        let (tx, rx) = mpsc::channel(64);
        let handle = recorder(stub.clone()).start(rx);

        for _ in 0..12 {
            tx.send(quiet_frame()).await.unwrap();
        }

        let transcript = handle.transcript().await.unwrap();
        assert_eq!(transcript, "transcribed answer");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert!(*stub.last_payload_len.lock().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_speech_resets_silence_window() {
        let stub = StubTranscriber::new(false);
        let (tx, rx) = mpsc::channel(64);
        let handle = recorder(stub.clone()).start(rx);

        // Nine quiet frames, speech, nine more: never a full silent second.
        for _ in 0..9 {
            tx.send(quiet_frame()).await.unwrap();
        }
        tx.send(loud_frame()).await.unwrap();
        for _ in 0..9 {
            tx.send(quiet_frame()).await.unwrap();
        }
        // Closing the source stops the session without the detector firing.
        drop(tx);

        let transcript = handle.transcript().await.unwrap();
        assert_eq!(transcript, "transcribed answer");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_external_stop_finalizes_buffered_audio() {
        let stub = StubTranscriber::new(false);
        let (tx, rx) = mpsc::channel(64);
        let mut handle = recorder(stub.clone()).start(rx);

        for _ in 0..3 {
            tx.send(loud_frame()).await.unwrap();
        }
        handle.stop();

        let transcript = handle.transcript().await.unwrap();
        assert_eq!(transcript, "transcribed answer");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transcription_failure_is_delivered_not_swallowed() {
        let stub = StubTranscriber::new(true);
        let (tx, rx) = mpsc::channel(64);
        let handle = recorder(stub.clone()).start(rx);

        for _ in 0..12 {
            tx.send(quiet_frame()).await.unwrap();
        }

        let err = handle.transcript().await.unwrap_err();
        assert!(matches!(err, RecorderError::Transcription(_)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_before_any_audio_reports_empty_recording() {
        let stub = StubTranscriber::new(false);
        let (_tx, rx) = mpsc::channel::<Vec<f32>>(64);
        let mut handle = recorder(stub.clone()).start(rx);

        handle.stop();

        let err = handle.transcript().await.unwrap_err();
        assert!(matches!(err, RecorderError::EmptyRecording));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_state_moves_from_capturing_to_stopping() {
        let stub = StubTranscriber::new(false);
        let (tx, rx) = mpsc::channel(64);
        let mut handle = recorder(stub).start(rx);

        assert_eq!(handle.state(), RecorderState::Capturing);

        tx.send(loud_frame()).await.unwrap();
        handle.stop();

        let mut state_rx = handle.state_rx.clone();
        state_rx
            .wait_for(|state| *state == RecorderState::Stopping)
            .await
            .unwrap();
        assert_eq!(handle.state(), RecorderState::Stopping);
    }
}
