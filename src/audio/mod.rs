pub mod chunk;
pub mod decode;
pub mod vad;
pub mod write;

pub use chunk::{aggregate_chunks, fixed_chunks};
pub use decode::{check_ffmpeg, check_ffprobe, extract_audio, get_media_duration, load_samples};
pub use vad::{build_timeline, EnergyClassifier, FrameClassifier, WebRtcClassifier};
pub use write::{write_chunks, WriteFailure, WriteReport, WrittenChunk};

use std::time::Duration;

/// Decoded mono PCM audio held in memory for the duration of one run.
///
/// Samples are floats in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Total duration of the buffer.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// One classified frame of the speech/silence timeline.
///
/// Entries are ordered and contiguous: each entry's `end` equals the next
/// entry's `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub start: Duration,
    pub end: Duration,
    pub is_speech: bool,
}

impl TimelineEntry {
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// A duration-bounded interval of the signal destined for transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub start: Duration,
    pub end: Duration,
}

impl Chunk {
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}
