//! Word tokenization and the character-offset map used to highlight the word
//! currently being spoken.

use crate::document::Block;

/// One visible word with its global reading-order index and owning block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordUnit {
    pub index: usize,
    pub text: String,
    pub block: usize,
}

/// Split blocks into whitespace-delimited words, numbered in reading order.
pub fn tokenize(blocks: &[Block]) -> Vec<WordUnit> {
    let mut words = Vec::new();
    for (block_idx, block) in blocks.iter().enumerate() {
        for token in block.text.split_whitespace() {
            words.push(WordUnit {
                index: words.len(),
                text: token.to_string(),
                block: block_idx,
            });
        }
    }
    words
}

/// Maps a character offset in the spoken utterance back to a word index.
///
/// Each word occupies `chars(word) + 1` positions (the trailing separator),
/// except the last. A reported offset belongs to the first word whose
/// cumulative end exceeds it; offsets past the end clamp to the final word.
#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    ends: Vec<usize>,
}

impl OffsetMap {
    pub fn from_texts<S: AsRef<str>>(words: &[S]) -> Self {
        let mut ends = Vec::with_capacity(words.len());
        let mut cumulative = 0usize;
        for (i, word) in words.iter().enumerate() {
            cumulative += word.as_ref().chars().count();
            if i + 1 < words.len() {
                cumulative += 1;
            }
            ends.push(cumulative);
        }
        Self { ends }
    }

    /// Word index for a character offset, `None` when the map is empty.
    pub fn index_for_offset(&self, offset: usize) -> Option<usize> {
        if self.ends.is_empty() {
            return None;
        }
        match self.ends.iter().position(|end| *end > offset) {
            Some(idx) => Some(idx),
            None => Some(self.ends.len() - 1),
        }
    }

    /// Character offset at which word `index` starts. Each end already
    /// counts the word's trailing separator, so the next word begins there.
    pub fn start_of(&self, index: usize) -> usize {
        if index == 0 || self.ends.is_empty() {
            0
        } else {
            let clamped = index.min(self.ends.len() - 1);
            self.ends[clamped - 1]
        }
    }

    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Total character length of the utterance this map was built from.
    pub fn total_chars(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }
}
