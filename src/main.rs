use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vadsplit::config::{Aggressiveness, ClassifierKind, Config};
use vadsplit::pipeline::{print_summary, split_media_with_cancel, PipelineOptions};

#[derive(Parser)]
#[command(name = "vadsplit")]
#[command(version, about = "Split media files into speech chunks")]
#[command(
    long_about = "Extract the audio track from a video/audio file, detect speech with a \
voice-activity classifier, and write duration-bounded WAV chunks ready for transcription."
)]
struct Cli {
    /// Input video/audio file
    input: PathBuf,

    /// Directory chunk files are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// VAD frame duration in milliseconds (10, 20, or 30 for the WebRTC classifier)
    #[arg(long)]
    frame_duration_ms: Option<u32>,

    /// Maximum accumulated speech per chunk, in seconds
    #[arg(short, long)]
    max_chunk_duration: Option<f64>,

    /// Classifier backend: webrtc, energy
    #[arg(short, long)]
    classifier: Option<String>,

    /// WebRTC VAD aggressiveness: quality, lowbitrate, aggressive, veryaggressive
    #[arg(short, long)]
    aggressiveness: Option<String>,

    /// RMS threshold for the energy classifier
    #[arg(long)]
    energy_threshold: Option<f32>,

    /// Split into fixed intervals instead of following the VAD
    #[arg(long)]
    fixed: bool,

    /// Disable progress spinners
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    let mut config = Config::load().context("Failed to load configuration")?;

    // CLI flags override config file and environment
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(ms) = cli.frame_duration_ms {
        config.frame_duration_ms = ms;
    }
    if let Some(secs) = cli.max_chunk_duration {
        config.max_chunk_duration_secs = secs;
    }
    if let Some(kind) = cli.classifier {
        config.classifier = kind
            .parse::<ClassifierKind>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(mode) = cli.aggressiveness {
        config.aggressiveness = mode
            .parse::<Aggressiveness>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(threshold) = cli.energy_threshold {
        config.energy_threshold = threshold;
    }

    config.validate().context("Configuration validation failed")?;

    info!("Input:       {}", cli.input.display());
    info!("Output dir:  {}", config.output_dir.display());
    info!("Frame:       {} ms", config.frame_duration_ms);
    info!("Max chunk:   {} s", config.max_chunk_duration_secs);
    if cli.fixed {
        info!("Mode:        fixed intervals");
    } else {
        info!("Classifier:  {}", config.classifier);
    }

    let cancelled = Arc::new(AtomicBool::new(false));
    let cancel_flag = cancelled.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted, finishing current stage...");
        cancel_flag.store(true, Ordering::Relaxed);
    })
    .context("Failed to install Ctrl+C handler")?;

    let options = PipelineOptions {
        fixed: cli.fixed,
        show_progress: !cli.no_progress,
    };

    let result = split_media_with_cancel(&cli.input, &config, &options, cancelled)
        .context("Chunking pipeline failed")?;

    print_summary(&result);

    if !result.report.is_complete() {
        anyhow::bail!(
            "{} of {} chunks failed to write",
            result.report.failures.len(),
            result.report.failures.len() + result.report.written.len()
        );
    }

    Ok(())
}
