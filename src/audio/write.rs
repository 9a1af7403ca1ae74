use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;

use super::{AudioBuffer, Chunk};

/// A chunk successfully written to disk.
#[derive(Debug, Clone)]
pub struct WrittenChunk {
    pub index: usize,
    pub path: PathBuf,
    pub chunk: Chunk,
}

/// A chunk that could not be written.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub index: usize,
    pub error: String,
}

/// Outcome of writing a chunk list; partial success is expected to be
/// visible to the caller rather than collapsed into one error.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<WrittenChunk>,
    pub failures: Vec<WriteFailure>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Slice the sample buffer per chunk and persist each slice as a 16-bit
/// mono WAV named `chunk_{index+1}.wav`.
///
/// Creating the output directory is fatal if it fails; individual chunk
/// write failures are collected and the remaining chunks still attempted.
/// Sample indices are clamped to the buffer so floating rounding at the
/// signal boundary never reads out of range.
pub fn write_chunks(chunks: &[Chunk], buffer: &AudioBuffer, output_dir: &Path) -> Result<WriteReport> {
    std::fs::create_dir_all(output_dir)?;

    info!(
        "Writing {} chunks to {}",
        chunks.len(),
        output_dir.display()
    );

    let mut report = WriteReport::default();

    for (index, chunk) in chunks.iter().enumerate() {
        let path = output_dir.join(format!("chunk_{}.wav", index + 1));

        match write_chunk(chunk, buffer, &path) {
            Ok(()) => {
                debug!(
                    "Wrote chunk {}: {:.2}s to {:.2}s",
                    index + 1,
                    chunk.start.as_secs_f64(),
                    chunk.end.as_secs_f64()
                );
                report.written.push(WrittenChunk {
                    index,
                    path,
                    chunk: chunk.clone(),
                });
            }
            Err(e) => {
                warn!("Failed to write chunk {}: {}", index + 1, e);
                report.failures.push(WriteFailure {
                    index,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Wrote {} chunks ({} failed)",
        report.written.len(),
        report.failures.len()
    );

    Ok(report)
}

fn write_chunk(chunk: &Chunk, buffer: &AudioBuffer, path: &Path) -> Result<()> {
    let (start_sample, end_sample) = sample_range(chunk, buffer);
    let slice = &buffer.samples[start_sample..end_sample];

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in slice {
        writer.write_sample((sample * 32768.0) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Map a chunk's time range to clamped sample indices.
fn sample_range(chunk: &Chunk, buffer: &AudioBuffer) -> (usize, usize) {
    let rate = buffer.sample_rate as f64;
    let len = buffer.samples.len();

    let start = ((chunk.start.as_secs_f64() * rate).round() as usize).min(len);
    let end = ((chunk.end.as_secs_f64() * rate).round() as usize).min(len);

    (start, end.max(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_buffer(secs: usize) -> AudioBuffer {
        let sample_rate = 1_000;
        let samples = (0..secs * sample_rate as usize)
            .map(|i| (i as f32 / 100.0).sin() * 0.5)
            .collect();
        AudioBuffer {
            samples,
            sample_rate,
        }
    }

    fn chunk(start: u64, end: u64) -> Chunk {
        Chunk {
            start: Duration::from_secs(start),
            end: Duration::from_secs(end),
        }
    }

    #[test]
    fn test_sample_range_clamps_to_buffer() {
        let buffer = test_buffer(2);
        let (start, end) = sample_range(&chunk(1, 5), &buffer);
        assert_eq!(start, 1_000);
        assert_eq!(end, 2_000);

        let (start, end) = sample_range(&chunk(5, 9), &buffer);
        assert_eq!(start, 2_000);
        assert_eq!(end, 2_000);
    }

    #[test]
    fn test_write_chunks_names_are_one_based() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = test_buffer(4);
        let chunks = vec![chunk(0, 2), chunk(2, 4)];

        let report = write_chunks(&chunks, &buffer, dir.path()).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.written.len(), 2);
        assert!(dir.path().join("chunk_1.wav").exists());
        assert!(dir.path().join("chunk_2.wav").exists());
        assert!(!dir.path().join("chunk_0.wav").exists());
    }

    #[test]
    fn test_written_chunk_sample_counts() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = test_buffer(3);
        let chunks = vec![chunk(0, 1), chunk(1, 3)];

        write_chunks(&chunks, &buffer, dir.path()).unwrap();

        let reader = hound::WavReader::open(dir.path().join("chunk_1.wav")).unwrap();
        assert_eq!(reader.len(), 1_000);
        assert_eq!(reader.spec().sample_rate, 1_000);
        assert_eq!(reader.spec().channels, 1);

        let reader = hound::WavReader::open(dir.path().join("chunk_2.wav")).unwrap();
        assert_eq!(reader.len(), 2_000);
    }

    #[test]
    fn test_write_chunks_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = test_buffer(2);
        let chunks = vec![chunk(0, 2)];

        write_chunks(&chunks, &buffer, dir.path()).unwrap();
        let first = std::fs::read(dir.path().join("chunk_1.wav")).unwrap();

        write_chunks(&chunks, &buffer, dir.path()).unwrap();
        let second = std::fs::read(dir.path().join("chunk_1.wav")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_write_chunks_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let buffer = test_buffer(1);

        let report = write_chunks(&[chunk(0, 1)], &buffer, &nested).unwrap();
        assert!(report.is_complete());
        assert!(nested.join("chunk_1.wav").exists());
    }

    #[test]
    fn test_write_chunks_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = test_buffer(1);

        let report = write_chunks(&[], &buffer, dir.path()).unwrap();
        assert!(report.written.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_failed_chunk_does_not_abort_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = test_buffer(4);
        let chunks = vec![chunk(0, 2), chunk(2, 4)];

        // Occupy the first chunk's path with a directory so its write fails.
        std::fs::create_dir(dir.path().join("chunk_1.wav")).unwrap();

        let report = write_chunks(&chunks, &buffer, dir.path()).unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 0);
        assert!(!report.failures[0].error.is_empty());

        // The second chunk was still attempted and written.
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.written[0].index, 1);
        assert!(dir.path().join("chunk_2.wav").exists());
        let reader = hound::WavReader::open(dir.path().join("chunk_2.wav")).unwrap();
        assert_eq!(reader.len(), 2_000);
    }

    #[test]
    fn test_output_dir_creation_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let buffer = test_buffer(1);

        // With no directory, every chunk would fail identically, so this
        // errors up front instead of producing an all-failures report.
        let result = write_chunks(&[chunk(0, 1)], &buffer, &blocker);
        assert!(matches!(result, Err(crate::error::VadsplitError::Io(_))));
    }

    #[test]
    fn test_chunk_beyond_buffer_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = test_buffer(1);

        // Clamping turns an out-of-range chunk into an empty slice rather
        // than a panic or error.
        let report = write_chunks(&[chunk(5, 6)], &buffer, dir.path()).unwrap();
        assert!(report.is_complete());
        let reader = hound::WavReader::open(dir.path().join("chunk_1.wav")).unwrap();
        assert_eq!(reader.len(), 0);
    }
}
