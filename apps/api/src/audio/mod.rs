// Answer capture pipeline: microphone frames in, transcript out.
// Silence detection auto-stops a recording; the assembled WAV is handed to
// the transcription gateway and the transcript delivered exactly once.

pub mod capture;
pub mod recorder;
pub mod silence;
pub mod wav;

pub use recorder::{AnswerRecorder, RecorderConfig, RecorderError, RecorderState, RecordingHandle};
pub use silence::SilenceDetector;
