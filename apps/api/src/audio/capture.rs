//! Microphone acquisition via cpal.
//!
//! cpal streams are not `Send`, so the stream lives on a dedicated thread
//! and is dropped there on every exit path — the device handle cannot leak
//! past the capture session. Mono f32 frames are forwarded over an mpsc
//! channel to whoever consumes them (normally the answer recorder).

use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::audio::recorder::RecorderError;

/// Stop signal for a running capture. Cloneable so the recorder task can
/// release the device as soon as it decides to stop.
#[derive(Clone)]
pub struct CaptureStop(std_mpsc::Sender<()>);

impl CaptureStop {
    pub fn stop(&self) {
        let _ = self.0.send(());
    }
}

/// An open microphone capture session.
pub struct MicCapture {
    stop: CaptureStop,
    thread: Option<JoinHandle<()>>,
    sample_rate: u32,
}

impl MicCapture {
    /// Opens the default input device and forwards frames on `tx` until
    /// stopped. Fails with `RecorderError::MediaAccess` when no device is
    /// available or the stream cannot be built.
    pub fn open(tx: mpsc::Sender<Vec<f32>>) -> Result<Self, RecorderError> {
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<u32, RecorderError>>();

        let thread = std::thread::spawn(move || capture_thread(tx, stop_rx, ready_tx));

        let sample_rate = ready_rx
            .recv()
            .map_err(|_| RecorderError::MediaAccess("capture thread exited during setup".into()))??;

        debug!("microphone capture opened at {sample_rate} Hz");
        Ok(Self {
            stop: CaptureStop(stop_tx),
            thread: Some(thread),
            sample_rate,
        })
    }

    /// Native sample rate of the opened stream.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn stop_signal(&self) -> CaptureStop {
        self.stop.clone()
    }

    /// Stops the stream and waits for the capture thread to release the
    /// device. Idempotent.
    pub fn stop(&mut self) {
        self.stop.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_thread(
    tx: mpsc::Sender<Vec<f32>>,
    stop_rx: std_mpsc::Receiver<()>,
    ready_tx: std_mpsc::Sender<Result<u32, RecorderError>>,
) {
    let stream = match build_stream(tx) {
        Ok((stream, sample_rate)) => {
            let _ = ready_tx.send(Ok(sample_rate));
            stream
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    // Block until a stop is requested or every stop handle is gone, then
    // drop the stream here so the device is released on this thread.
    let _ = stop_rx.recv();
    drop(stream);
    debug!("microphone capture stream closed");
}

fn build_stream(tx: mpsc::Sender<Vec<f32>>) -> Result<(cpal::Stream, u32), RecorderError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| RecorderError::MediaAccess("no input device available".into()))?;

    let supported = device
        .default_input_config()
        .map_err(|e| RecorderError::MediaAccess(format!("no supported input config: {e}")))?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let config: cpal::StreamConfig = supported.config();

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| forward(data, channels, &tx),
            |err| error!("input stream error: {err}"),
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> = data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                forward(&samples, channels, &tx);
            },
            |err| error!("input stream error: {err}"),
            None,
        ),
        other => {
            return Err(RecorderError::MediaAccess(format!(
                "unsupported input sample format: {other}"
            )))
        }
    }
    .map_err(|e| RecorderError::MediaAccess(format!("failed to build input stream: {e}")))?;

    stream
        .play()
        .map_err(|e| RecorderError::MediaAccess(format!("failed to start input stream: {e}")))?;

    Ok((stream, sample_rate))
}

/// Downmixes to mono and forwards one frame. Never blocks the audio
/// callback: a full or closed channel drops the frame.
fn forward(data: &[f32], channels: usize, tx: &mpsc::Sender<Vec<f32>>) {
    let frame: Vec<f32> = if channels <= 1 {
        data.to_vec()
    } else {
        data.chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    if tx.try_send(frame).is_err() {
        debug!("dropping captured frame: consumer is full or gone");
    }
}
