//! Amplitude-based silence detection.
//!
//! Per incoming PCM frame the detector computes RMS amplitude, converts to
//! decibels, and compares against a fixed threshold. Once the signal stays
//! below threshold for a full window, the detector trips — exactly once per
//! capture session. The window is measured on the sample clock, so behavior
//! is deterministic for a given signal regardless of frame sizes.

use std::time::Duration;

/// Signal level below which a frame counts as silent.
pub const SILENCE_THRESHOLD_DB: f32 = -35.0;

/// Continuous sub-threshold duration that stops a recording.
pub const SILENCE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct SilenceDetector {
    threshold_db: f32,
    window_samples: usize,
    quiet_samples: usize,
    tripped: bool,
}

impl SilenceDetector {
    pub fn new(sample_rate: u32, threshold_db: f32, window: Duration) -> Self {
        let window_samples = (sample_rate as f64 * window.as_secs_f64()).ceil() as usize;
        Self {
            threshold_db,
            window_samples: window_samples.max(1),
            quiet_samples: 0,
            tripped: false,
        }
    }

    /// Feeds one frame of mono samples. Returns `true` exactly once, when
    /// accumulated silence first covers the window. A frame at or above
    /// threshold resets the accumulated count.
    pub fn push_frame(&mut self, frame: &[f32]) -> bool {
        if self.tripped || frame.is_empty() {
            return false;
        }

        if dbfs(rms(frame)) < self.threshold_db {
            self.quiet_samples += frame.len();
            if self.quiet_samples >= self.window_samples {
                self.tripped = true;
                return true;
            }
        } else {
            self.quiet_samples = 0;
        }

        false
    }

    /// Re-arms the detector for a new capture session.
    pub fn reset(&mut self) {
        self.quiet_samples = 0;
        self.tripped = false;
    }
}

/// Root-mean-square amplitude of a frame.
fn rms(frame: &[f32]) -> f32 {
    let sum_squares: f32 = frame.iter().map(|s| s * s).sum();
    (sum_squares / frame.len() as f32).sqrt()
}

/// Converts an amplitude to decibels relative to full scale.
/// A zero amplitude maps to negative infinity, below any threshold.
fn dbfs(amplitude: f32) -> f32 {
    20.0 * amplitude.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 16_000;
    const FRAME: usize = 1_600; // 100 ms at 16 kHz

    fn detector() -> SilenceDetector {
        SilenceDetector::new(SAMPLE_RATE, SILENCE_THRESHOLD_DB, SILENCE_WINDOW)
    }

    // 0.005 amplitude is -46 dBFS, 0.5 is -6 dBFS.
    fn quiet_frame() -> Vec<f32> {
        vec![0.005; FRAME]
    }

    fn loud_frame() -> Vec<f32> {
        vec![0.5; FRAME]
    }

    #[test]
    fn test_trips_after_one_second_of_silence() {
        let mut d = detector();
        for _ in 0..9 {
            assert!(!d.push_frame(&quiet_frame()));
        }
        // The tenth 100 ms frame completes the 1 s window.
        assert!(d.push_frame(&quiet_frame()));
    }

    #[test]
    fn test_trips_exactly_once() {
        let mut d = detector();
        let mut stops = 0;
        for _ in 0..30 {
            if d.push_frame(&quiet_frame()) {
                stops += 1;
            }
        }
        assert_eq!(stops, 1);
    }

    #[test]
    fn test_sound_before_window_elapses_resets_count() {
        let mut d = detector();
        for _ in 0..9 {
            assert!(!d.push_frame(&quiet_frame()));
        }
        assert!(!d.push_frame(&loud_frame()));
        // Counting starts over: nine more quiet frames are not enough.
        for _ in 0..9 {
            assert!(!d.push_frame(&quiet_frame()));
        }
        assert!(d.push_frame(&quiet_frame()));
    }

    #[test]
    fn test_continuous_speech_never_trips() {
        let mut d = detector();
        for _ in 0..100 {
            assert!(!d.push_frame(&loud_frame()));
        }
    }

    #[test]
    fn test_digital_silence_counts_as_silent() {
        let mut d = detector();
        for _ in 0..9 {
            assert!(!d.push_frame(&vec![0.0; FRAME]));
        }
        assert!(d.push_frame(&vec![0.0; FRAME]));
    }

    #[test]
    fn test_reset_rearms_detector() {
        let mut d = detector();
        for _ in 0..10 {
            d.push_frame(&quiet_frame());
        }
        d.reset();
        for _ in 0..9 {
            assert!(!d.push_frame(&quiet_frame()));
        }
        assert!(d.push_frame(&quiet_frame()));
    }

    #[test]
    fn test_window_independent_of_frame_size() {
        // Same signal chopped into uneven frames trips at the same point.
        let mut d = detector();
        let samples = vec![0.005f32; SAMPLE_RATE as usize];
        let (head, tail) = samples.split_at(700);
        assert!(!d.push_frame(head));
        assert!(d.push_frame(tail));
    }
}
