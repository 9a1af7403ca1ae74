use std::time::Duration;

use tracing::{debug, info};
use webrtc_vad::{SampleRate, Vad, VadMode};

use crate::config::Aggressiveness;
use crate::error::{Result, VadsplitError};

use super::TimelineEntry;

/// Per-frame speech classifier.
///
/// The pipeline constructs one explicitly and threads it through timeline
/// building; classifier state never lives in a global.
pub trait FrameClassifier {
    /// Classify one fixed-length PCM frame as speech or not.
    fn classify(&mut self, frame: &[i16], sample_rate: u32) -> Result<bool>;
}

/// Classifier backed by the WebRTC VAD.
///
/// The underlying `Vad` is `!Send`, so the classifier stays on the pipeline
/// thread.
pub struct WebRtcClassifier {
    vad: Vad,
    sample_rate: u32,
}

impl WebRtcClassifier {
    pub fn new(sample_rate: u32, aggressiveness: Aggressiveness) -> Result<Self> {
        let rate = match sample_rate {
            8_000 => SampleRate::Rate8kHz,
            16_000 => SampleRate::Rate16kHz,
            32_000 => SampleRate::Rate32kHz,
            48_000 => SampleRate::Rate48kHz,
            other => {
                return Err(VadsplitError::Classification(format!(
                    "Unsupported sample rate for WebRTC VAD: {other} Hz (use 8000, 16000, 32000, or 48000)"
                )))
            }
        };

        let mode = match aggressiveness {
            Aggressiveness::Quality => VadMode::Quality,
            Aggressiveness::LowBitrate => VadMode::LowBitrate,
            Aggressiveness::Aggressive => VadMode::Aggressive,
            Aggressiveness::VeryAggressive => VadMode::VeryAggressive,
        };

        debug!("WebRTC VAD: {} Hz, mode {}", sample_rate, aggressiveness);

        Ok(Self {
            vad: Vad::new_with_rate_and_mode(rate, mode),
            sample_rate,
        })
    }
}

impl FrameClassifier for WebRtcClassifier {
    fn classify(&mut self, frame: &[i16], sample_rate: u32) -> Result<bool> {
        if sample_rate != self.sample_rate {
            return Err(VadsplitError::Classification(format!(
                "Classifier configured for {} Hz, got frame at {} Hz",
                self.sample_rate, sample_rate
            )));
        }

        self.vad.is_voice_segment(frame).map_err(|_| {
            VadsplitError::Classification(format!(
                "WebRTC VAD rejected frame of {} samples at {} Hz (frames must be 10, 20, or 30 ms)",
                frame.len(),
                sample_rate
            ))
        })
    }
}

/// RMS-threshold classifier.
///
/// Cruder than the WebRTC model but has no frame-length restrictions, which
/// makes it the fallback for unusual sample rates or frame durations.
#[derive(Debug, Clone)]
pub struct EnergyClassifier {
    threshold: f32,
}

impl EnergyClassifier {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl FrameClassifier for EnergyClassifier {
    fn classify(&mut self, frame: &[i16], _sample_rate: u32) -> Result<bool> {
        Ok(calculate_rms(frame) >= self.threshold)
    }
}

/// RMS energy of a sample window, normalized to `[0, 1]`.
fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let normalized = s as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Convert float samples in `[-1, 1]` to the 16-bit PCM the classifier
/// expects. The `as` cast saturates out-of-range values.
fn pcm_to_i16(samples: &[f32], out: &mut Vec<i16>) {
    out.clear();
    out.extend(samples.iter().map(|&s| (s * 32768.0) as i16));
}

/// Walk the sample buffer in fixed frames and classify each one.
///
/// Returns one entry per full frame, ordered and contiguous. A trailing
/// frame shorter than `frame_length` is dropped, not padded, so up to
/// `frame_length - 1` samples of tail audio go unclassified.
pub fn build_timeline(
    samples: &[f32],
    sample_rate: u32,
    frame_duration_ms: u32,
    classifier: &mut dyn FrameClassifier,
) -> Result<Vec<TimelineEntry>> {
    let frame_length =
        (frame_duration_ms as f64 / 1000.0 * sample_rate as f64).round() as usize;

    if frame_length == 0 {
        return Err(VadsplitError::Config(format!(
            "Frame length rounds to zero samples ({frame_duration_ms} ms at {sample_rate} Hz)"
        )));
    }

    let mut timeline = Vec::with_capacity(samples.len() / frame_length);
    let mut frame_i16 = Vec::with_capacity(frame_length);
    let mut speech_frames = 0usize;

    let mut pos = 0;
    while pos + frame_length <= samples.len() {
        pcm_to_i16(&samples[pos..pos + frame_length], &mut frame_i16);
        let is_speech = classifier.classify(&frame_i16, sample_rate)?;
        if is_speech {
            speech_frames += 1;
        }

        timeline.push(TimelineEntry {
            start: Duration::from_secs_f64(pos as f64 / sample_rate as f64),
            end: Duration::from_secs_f64((pos + frame_length) as f64 / sample_rate as f64),
            is_speech,
        });

        pos += frame_length;
    }

    info!(
        "Classified {} frames ({} speech) of {} ms",
        timeline.len(),
        speech_frames,
        frame_duration_ms
    );

    Ok(timeline)
}
