use std::path::Path;
use std::process::Command;
use std::time::Duration;

use hound::WavReader;
use tracing::{debug, info};

use crate::error::{Result, VadsplitError};

use super::AudioBuffer;

/// Sample rate all input is resampled to. WebRTC VAD supports 8/16/32/48 kHz;
/// 16 kHz is the usual rate for speech models.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg").arg("-version").output().map_err(|e| {
        VadsplitError::Decode(format!(
            "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(VadsplitError::Decode("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Check if FFprobe is installed and accessible.
pub fn check_ffprobe() -> Result<()> {
    let output = Command::new("ffprobe").arg("-version").output().map_err(|e| {
        VadsplitError::Decode(format!(
            "FFprobe not found. Please install FFmpeg (includes FFprobe). Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(VadsplitError::Decode("FFprobe check failed".to_string()));
    }

    debug!("FFprobe is available");
    Ok(())
}

/// Get media duration using FFprobe.
pub fn get_media_duration(input: &Path) -> Result<Duration> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .map_err(|e| VadsplitError::Decode(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VadsplitError::Decode(format!("FFprobe failed: {stderr}")));
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    let duration_secs: f64 = duration_str.trim().parse().map_err(|e| {
        VadsplitError::Decode(format!(
            "Failed to parse duration '{}': {e}",
            duration_str.trim()
        ))
    })?;

    Ok(Duration::from_secs_f64(duration_secs))
}

/// Extract the audio track from a media file into a mono 16-bit PCM WAV
/// at [`TARGET_SAMPLE_RATE`].
pub fn extract_audio(input: &Path, output: &Path) -> Result<Duration> {
    check_ffmpeg()?;
    check_ffprobe()?;

    if !input.exists() {
        return Err(VadsplitError::FileNotFound(input.display().to_string()));
    }

    info!("Extracting audio from {}", input.display());

    let duration = get_media_duration(input)?;
    debug!("Input duration: {:?}", duration);

    let status = Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input)
        .args(["-vn", "-acodec", "pcm_s16le", "-ar"])
        .arg(TARGET_SAMPLE_RATE.to_string())
        .args(["-ac", "1"])
        .arg(output)
        .status()
        .map_err(|e| VadsplitError::Decode(format!("Failed to run FFmpeg: {e}")))?;

    if !status.success() {
        return Err(VadsplitError::Decode(
            "FFmpeg audio extraction failed".to_string(),
        ));
    }

    if !output.exists() {
        return Err(VadsplitError::Decode(
            "Output file was not created".to_string(),
        ));
    }

    info!("Audio extracted to {}", output.display());

    Ok(duration)
}

/// Load a WAV file into a float sample buffer.
///
/// Integer sources are normalized to `[-1, 1]`; float sources are taken
/// as-is. Multi-channel input is not expected here since extraction always
/// downmixes to mono.
pub fn load_samples(path: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::open(path)
        .map_err(|e| VadsplitError::Decode(format!("Failed to open WAV file: {e}")))?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;

    info!(
        "Loading audio: {} Hz, {} channels, {} bits",
        sample_rate, spec.channels, spec.bits_per_sample
    );

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .into_samples::<i16>()
            .map(|s| s.unwrap_or(0) as f32 / i16::MAX as f32)
            .collect(),
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.unwrap_or(0.0))
            .collect(),
    };

    debug!("Total samples: {}", samples.len());

    Ok(AudioBuffer {
        samples,
        sample_rate,
    })
}
