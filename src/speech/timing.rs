//! Utterance chunking and the schedule that turns playback time into
//! character offsets.
//!
//! The synthesizer works in chunks of a few hundred characters, but the
//! highlight needs per-word boundaries. Each chunk's measured audio duration
//! is spread over its words proportionally to their character positions,
//! which tracks real speech closely enough for a reading highlight.

use std::ops::Range;
use std::time::Duration;

use crate::text_utils;
use crate::tokenizer::OffsetMap;

/// A chunk of the utterance sent to the synthesizer as one unit.
///
/// `words` and `chars` index into the utterance's word list and joined text
/// respectively. `chars` excludes the separator after the final word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceChunk {
    pub text: String,
    pub words: Range<usize>,
    pub chars: Range<usize>,
}

/// Group words into chunks, preferring to break after sentence-final words
/// once `soft_limit` characters are reached and forcing a break at
/// `hard_limit`. Words are never split.
pub fn pack_chunks(words: &[String], soft_limit: usize, hard_limit: usize) -> Vec<UtteranceChunk> {
    let soft = soft_limit.max(1);
    let hard = hard_limit.max(soft);

    let mut chunks = Vec::new();
    let mut start_word = 0usize;
    let mut start_char = 0usize;
    let mut text = String::new();
    let mut pos = 0usize;

    for (idx, word) in words.iter().enumerate() {
        if idx > start_word {
            text.push(' ');
        }
        text.push_str(word);
        let word_end = pos + word.chars().count();
        let chunk_chars = word_end - start_char;

        let is_last = idx + 1 == words.len();
        if is_last
            || chunk_chars >= hard
            || (chunk_chars >= soft && text_utils::ends_sentence(word))
        {
            chunks.push(UtteranceChunk {
                text: std::mem::take(&mut text),
                words: start_word..idx + 1,
                chars: start_char..word_end,
            });
            start_word = idx + 1;
            start_char = word_end + 1;
        }
        pos = word_end + 1;
    }

    chunks
}

/// Precomputed (time, char offset) boundary points for one utterance.
#[derive(Debug, Clone, Default)]
pub struct BoundarySchedule {
    points: Vec<(Duration, usize)>,
    total: Duration,
}

impl BoundarySchedule {
    /// Lay chunk durations end to end (plus the configured silence gap after
    /// each) and place every word's boundary inside its chunk by character
    /// position.
    pub fn build(
        map: &OffsetMap,
        chunks: &[UtteranceChunk],
        durations: &[Duration],
        gap: Duration,
    ) -> Self {
        let mut points = Vec::with_capacity(map.len());
        let mut chunk_start = Duration::ZERO;

        for (chunk, duration) in chunks.iter().zip(durations) {
            let span = chunk.chars.len().max(1) as f64;
            for word in chunk.words.clone() {
                let offset = map.start_of(word);
                let into_chunk = offset.saturating_sub(chunk.chars.start) as f64;
                let at = chunk_start + duration.mul_f64(into_chunk / span);
                points.push((at, offset));
            }
            chunk_start += *duration + gap;
        }

        BoundarySchedule {
            points,
            total: chunk_start,
        }
    }

    /// Char offset being spoken at `elapsed`, i.e. the last boundary at or
    /// before that instant.
    pub fn offset_at(&self, elapsed: Duration) -> usize {
        let mut current = self.points.first().map(|(_, o)| *o).unwrap_or(0);
        for (at, offset) in &self.points {
            if *at > elapsed {
                break;
            }
            current = *offset;
        }
        current
    }

    pub fn total_duration(&self) -> Duration {
        self.total
    }

    pub fn finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.total
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
