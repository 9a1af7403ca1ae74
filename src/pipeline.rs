use crate::audio::{
    aggregate_chunks, build_timeline, extract_audio, fixed_chunks, load_samples, write_chunks,
    AudioBuffer, Chunk, EnergyClassifier, FrameClassifier, WebRtcClassifier, WriteReport,
};
use crate::config::{ClassifierKind, Config};
use crate::error::{Result, VadsplitError};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info};

/// Options controlling one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Tile the signal into fixed intervals instead of following the VAD.
    pub fixed: bool,
    /// Show progress spinners.
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fixed: false,
            show_progress: true,
        }
    }
}

/// Statistics from one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub total_time: Duration,
    pub extraction_time: Duration,
    pub chunking_time: Duration,
    pub chunks_written: usize,
    pub chunks_failed: usize,
    pub audio_duration: Duration,
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    pub output_dir: PathBuf,
    pub report: WriteReport,
    pub stats: PipelineStats,
}

fn check_cancelled(cancelled: &AtomicBool) -> Result<()> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(VadsplitError::Cancelled);
    }
    Ok(())
}

fn spinner(multi: &Option<MultiProgress>, message: &str) -> Option<ProgressBar> {
    multi.as_ref().map(|mp| {
        let pb = mp.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    })
}

/// Split a media file into speech chunks on disk.
///
/// Stages: extract the audio track to a temp WAV, load it, derive the chunk
/// list (VAD or fixed tiling), and write one WAV per chunk into
/// `config.output_dir`.
pub fn split_media(input: &Path, config: &Config, options: &PipelineOptions) -> Result<PipelineResult> {
    split_media_with_cancel(input, config, options, Arc::new(AtomicBool::new(false)))
}

/// Split a media file with cooperative cancellation between stages.
pub fn split_media_with_cancel(
    input: &Path,
    config: &Config,
    options: &PipelineOptions,
    cancelled: Arc<AtomicBool>,
) -> Result<PipelineResult> {
    let start_time = Instant::now();

    config.validate()?;

    if !input.exists() {
        return Err(VadsplitError::FileNotFound(input.display().to_string()));
    }

    let temp_dir = TempDir::new()?;
    debug!("Using temp directory: {:?}", temp_dir.path());

    let multi_progress = if options.show_progress {
        Some(MultiProgress::new())
    } else {
        None
    };

    check_cancelled(&cancelled)?;

    // Stage 1: decode the audio track
    info!("Stage 1/3: Extracting audio from {:?}", input);
    let extraction_start = Instant::now();
    let extraction_pb = spinner(&multi_progress, "Extracting audio...");

    let audio_path = temp_dir.path().join("audio.wav");
    extract_audio(input, &audio_path)?;
    let buffer = load_samples(&audio_path)?;
    let audio_duration = buffer.duration();

    if let Some(pb) = extraction_pb {
        pb.finish_with_message(format!(
            "✓ Audio extracted ({:.1}s)",
            audio_duration.as_secs_f64()
        ));
    }

    let extraction_time = extraction_start.elapsed();
    info!(
        "Audio extraction complete: {:.1}s duration in {:.2}s",
        audio_duration.as_secs_f64(),
        extraction_time.as_secs_f64()
    );

    check_cancelled(&cancelled)?;

    // Stage 2: derive the chunk list
    info!("Stage 2/3: Deriving chunk boundaries");
    let chunking_start = Instant::now();
    let chunking_pb = spinner(&multi_progress, "Classifying frames...");

    let chunks = plan_chunks(&buffer, config, options)?;

    if let Some(pb) = chunking_pb {
        pb.finish_with_message(format!("✓ Planned {} chunks", chunks.len()));
    }

    let chunking_time = chunking_start.elapsed();
    info!(
        "Planned {} chunks in {:.2}s",
        chunks.len(),
        chunking_time.as_secs_f64()
    );

    check_cancelled(&cancelled)?;

    // Stage 3: write chunk files
    info!("Stage 3/3: Writing chunks to {:?}", config.output_dir);
    let write_pb = spinner(&multi_progress, "Writing chunk files...");

    let report = write_chunks(&chunks, &buffer, &config.output_dir)?;

    if let Some(pb) = write_pb {
        pb.finish_with_message(format!("✓ Wrote {} chunk files", report.written.len()));
    }

    let stats = PipelineStats {
        total_time: start_time.elapsed(),
        extraction_time,
        chunking_time,
        chunks_written: report.written.len(),
        chunks_failed: report.failures.len(),
        audio_duration,
    };

    Ok(PipelineResult {
        output_dir: config.output_dir.clone(),
        report,
        stats,
    })
}

/// Derive the chunk list for a decoded buffer.
///
/// Constructs the configured classifier explicitly and hands it to the
/// timeline builder; in fixed mode the VAD is bypassed entirely.
pub fn plan_chunks(
    buffer: &AudioBuffer,
    config: &Config,
    options: &PipelineOptions,
) -> Result<Vec<Chunk>> {
    let max_chunk_duration = Duration::from_secs_f64(config.max_chunk_duration_secs);

    if options.fixed {
        return Ok(fixed_chunks(buffer.duration(), max_chunk_duration));
    }

    let mut classifier: Box<dyn FrameClassifier> = match config.classifier {
        ClassifierKind::Webrtc => Box::new(WebRtcClassifier::new(
            buffer.sample_rate,
            config.aggressiveness,
        )?),
        ClassifierKind::Energy => Box::new(EnergyClassifier::new(config.energy_threshold)),
    };

    plan_chunks_with(buffer, config, classifier.as_mut())
}

/// Same as [`plan_chunks`] but with an injected classifier.
pub fn plan_chunks_with(
    buffer: &AudioBuffer,
    config: &Config,
    classifier: &mut dyn FrameClassifier,
) -> Result<Vec<Chunk>> {
    let timeline = build_timeline(
        &buffer.samples,
        buffer.sample_rate,
        config.frame_duration_ms,
        classifier,
    )?;

    Ok(aggregate_chunks(
        &timeline,
        Duration::from_secs_f64(config.max_chunk_duration_secs),
    ))
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                      Chunking Complete                         ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:     {}", result.output_dir.display());
    println!("  Chunks:     {}", result.stats.chunks_written);
    if result.stats.chunks_failed > 0 {
        println!("  Failed:     {}", result.stats.chunks_failed);
    }
    println!(
        "  Duration:   {:.1}s audio",
        result.stats.audio_duration.as_secs_f64()
    );
    println!();
    println!("  Timing:");
    println!(
        "    Extract:   {:.2}s",
        result.stats.extraction_time.as_secs_f64()
    );
    println!(
        "    Chunk:     {:.2}s",
        result.stats.chunking_time.as_secs_f64()
    );
    println!(
        "    Total:     {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    if !result.report.failures.is_empty() {
        println!();
        println!("  Failures:");
        for failure in &result.report.failures {
            println!("    chunk_{}: {}", failure.index + 1, failure.error);
        }
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
