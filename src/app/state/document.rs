use crate::document::Block;
use crate::tokenizer::WordUnit;

/// The currently loaded document: the backend's markdown reduced to blocks,
/// plus the indexed word units the playback engine addresses.
pub struct DocumentState {
    pub(in crate::app) source_key: String,
    pub(in crate::app) source_name: String,
    pub(in crate::app) blocks: Vec<Block>,
    pub(in crate::app) words: Vec<WordUnit>,
    pub(in crate::app) loaded: bool,
}

impl DocumentState {
    pub(in crate::app) fn empty() -> Self {
        Self {
            source_key: String::new(),
            source_name: String::new(),
            blocks: Vec::new(),
            words: Vec::new(),
            loaded: false,
        }
    }

    /// Clear the content area. Playback controls hide until the next
    /// successful upload repopulates us.
    pub(in crate::app) fn clear(&mut self) {
        self.blocks.clear();
        self.words.clear();
        self.loaded = false;
    }

    pub(in crate::app) fn word_texts(&self) -> Vec<String> {
        self.words.iter().map(|w| w.text.clone()).collect()
    }

    pub(in crate::app) fn block_text_of_word(&self, index: usize) -> Option<&str> {
        let word = self.words.get(index)?;
        self.blocks.get(word.block).map(|b| b.text.as_str())
    }
}
