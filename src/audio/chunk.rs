use std::time::Duration;

use tracing::{debug, info};

use super::{Chunk, TimelineEntry};

/// Merge speech frames into duration-bounded chunks.
///
/// Single forward pass over the timeline. Silence entries neither extend
/// nor close a chunk: a chunk keeps growing across silent stretches as long
/// as its accumulated *speech* time stays within `max_chunk_duration`, so a
/// chunk's span can include silence it absorbed between speech frames.
///
/// A chunk closes at the end of the last speech entry folded into it, either
/// when the next speech entry would overflow the budget or when the timeline
/// ends. A single entry longer than the budget still forms one oversized
/// chunk; the bound is advisory below frame granularity.
pub fn aggregate_chunks(timeline: &[TimelineEntry], max_chunk_duration: Duration) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    let mut current_start: Option<Duration> = None;
    let mut current_end = Duration::ZERO;
    let mut current_duration = Duration::ZERO;

    for entry in timeline.iter().filter(|e| e.is_speech) {
        let duration = entry.duration();

        match current_start {
            None => {
                current_start = Some(entry.start);
                current_end = entry.end;
                current_duration = duration;
            }
            Some(start) => {
                if current_duration + duration <= max_chunk_duration {
                    current_end = entry.end;
                    current_duration += duration;
                } else {
                    debug!(
                        "Chunk full at {:.2}s speech, closing at {:.2}s",
                        current_duration.as_secs_f64(),
                        current_end.as_secs_f64()
                    );
                    chunks.push(Chunk {
                        start,
                        end: current_end,
                    });
                    current_start = Some(entry.start);
                    current_end = entry.end;
                    current_duration = duration;
                }
            }
        }
    }

    if let Some(start) = current_start {
        chunks.push(Chunk {
            start,
            end: current_end,
        });
    }

    info!("Aggregated {} chunks", chunks.len());
    chunks
}

/// Tile the whole signal into fixed-duration chunks, ignoring speech
/// detection. The last chunk may be shorter.
pub fn fixed_chunks(total_duration: Duration, chunk_duration: Duration) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    if chunk_duration.is_zero() {
        return chunks;
    }

    let mut current = Duration::ZERO;
    while current < total_duration {
        let end = (current + chunk_duration).min(total_duration);
        chunks.push(Chunk {
            start: current,
            end,
        });
        current = end;
    }

    info!("Planned {} fixed chunks", chunks.len());
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: u64, end: u64, is_speech: bool) -> TimelineEntry {
        TimelineEntry {
            start: Duration::from_secs(start),
            end: Duration::from_secs(end),
            is_speech,
        }
    }

    fn chunk(start: u64, end: u64) -> Chunk {
        Chunk {
            start: Duration::from_secs(start),
            end: Duration::from_secs(end),
        }
    }

    #[test]
    fn test_empty_timeline_yields_no_chunks() {
        assert!(aggregate_chunks(&[], Duration::from_secs(15)).is_empty());
    }

    #[test]
    fn test_all_silence_yields_no_chunks() {
        let timeline = vec![entry(0, 1, false), entry(1, 2, false), entry(2, 3, false)];
        assert!(aggregate_chunks(&timeline, Duration::from_secs(15)).is_empty());
    }

    #[test]
    fn test_silence_does_not_close_chunk() {
        // 1s frames, 3s budget: the silent [2,3) gap is absorbed because the
        // speech budget still has room when (3,4) arrives.
        let timeline = vec![
            entry(0, 1, true),
            entry(1, 2, true),
            entry(2, 3, false),
            entry(3, 4, true),
        ];
        let chunks = aggregate_chunks(&timeline, Duration::from_secs(3));
        assert_eq!(chunks, vec![chunk(0, 4)]);
    }

    #[test]
    fn test_overflow_closes_at_last_speech_end() {
        // Same timeline, 2s budget: (3,4) no longer fits, so the first chunk
        // closes at the end of its last speech frame, excluding the gap.
        let timeline = vec![
            entry(0, 1, true),
            entry(1, 2, true),
            entry(2, 3, false),
            entry(3, 4, true),
        ];
        let chunks = aggregate_chunks(&timeline, Duration::from_secs(2));
        assert_eq!(chunks, vec![chunk(0, 2), chunk(3, 4)]);
    }

    #[test]
    fn test_contiguous_speech_splits_on_budget() {
        let timeline: Vec<TimelineEntry> = (0..7).map(|i| entry(i, i + 1, true)).collect();
        let chunks = aggregate_chunks(&timeline, Duration::from_secs(3));
        assert_eq!(chunks, vec![chunk(0, 3), chunk(3, 6), chunk(6, 7)]);
    }

    #[test]
    fn test_single_oversized_entry_forms_one_chunk() {
        // Only possible when frame duration exceeds the budget.
        let timeline = vec![entry(0, 5, true)];
        let chunks = aggregate_chunks(&timeline, Duration::from_secs(3));
        assert_eq!(chunks, vec![chunk(0, 5)]);
    }

    #[test]
    fn test_leading_silence_skipped() {
        let timeline = vec![entry(0, 1, false), entry(1, 2, false), entry(2, 3, true)];
        let chunks = aggregate_chunks(&timeline, Duration::from_secs(15));
        assert_eq!(chunks, vec![chunk(2, 3)]);
    }

    #[test]
    fn test_chunks_ordered_and_non_overlapping() {
        // Alternating speech/silence over a long stretch with a small budget.
        let timeline: Vec<TimelineEntry> =
            (0..40).map(|i| entry(i, i + 1, i % 3 != 2)).collect();
        let chunks = aggregate_chunks(&timeline, Duration::from_secs(5));

        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(c.end > c.start);
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].start >= pair[0].end);
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn test_speech_budget_respected() {
        let timeline: Vec<TimelineEntry> =
            (0..30).map(|i| entry(i, i + 1, i % 2 == 0)).collect();
        let max = Duration::from_secs(4);
        let chunks = aggregate_chunks(&timeline, max);

        // Accumulated speech per chunk never exceeds the budget (frames are
        // not oversized here).
        for c in &chunks {
            let speech: Duration = timeline
                .iter()
                .filter(|e| e.is_speech && e.start >= c.start && e.end <= c.end)
                .map(|e| e.duration())
                .sum();
            assert!(speech <= max);
        }
    }

    #[test]
    fn test_every_speech_entry_covered() {
        let timeline: Vec<TimelineEntry> =
            (0..25).map(|i| entry(i, i + 1, i % 4 != 3)).collect();
        let chunks = aggregate_chunks(&timeline, Duration::from_secs(6));

        for e in timeline.iter().filter(|e| e.is_speech) {
            assert!(
                chunks.iter().any(|c| e.start >= c.start && e.end <= c.end),
                "speech entry {:?}..{:?} not covered",
                e.start,
                e.end
            );
        }
    }

    #[test]
    fn test_fixed_chunks_tiles_signal() {
        let chunks = fixed_chunks(Duration::from_secs(100), Duration::from_secs(30));
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], chunk(0, 30));
        assert_eq!(chunks[3], chunk(90, 100));
    }

    #[test]
    fn test_fixed_chunks_exact_multiple() {
        let chunks = fixed_chunks(Duration::from_secs(60), Duration::from_secs(15));
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3], chunk(45, 60));
    }

    #[test]
    fn test_fixed_chunks_zero_duration() {
        assert!(fixed_chunks(Duration::from_secs(10), Duration::ZERO).is_empty());
        assert!(fixed_chunks(Duration::ZERO, Duration::from_secs(15)).is_empty());
    }
}
