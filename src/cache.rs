//! On-disk cache for synthesized speech.
//!
//! Audio for each utterance chunk is keyed by a hash of the voice, rate, and
//! text, so re-reading the same document skips synthesis entirely. Everything
//! lives under a per-document directory named by a hash of the document
//! source, which keeps filenames filesystem-safe.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Directory for one cached document, named by a hash of its source key.
pub fn hash_dir(cache_root: &Path, source_key: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(source_key.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    cache_root.join(hash)
}

/// Where synthesized audio for a document goes.
pub fn speech_dir(cache_root: &Path, source_key: &str) -> PathBuf {
    hash_dir(cache_root, source_key).join("speech")
}

/// Cache filename for one synthesized chunk. Voice and rate are part of the
/// key so changing either forces a fresh synthesis.
pub fn chunk_path(dir: &Path, voice: &str, rate_wpm: u32, text: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(voice.as_bytes());
    hasher.update([0]);
    hasher.update(rate_wpm.to_le_bytes());
    hasher.update([0]);
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    dir.join(format!("speech-{hash}.wav"))
}

/// Persist the markdown the backend produced for a document. Errors are
/// ignored to keep the UI responsive.
pub fn save_markdown(cache_root: &Path, source_key: &str, markdown: &str) {
    let path = hash_dir(cache_root, source_key).join("document.md");
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _ = fs::write(path, markdown);
}

/// Load previously cached markdown for a document, if present.
pub fn load_markdown(cache_root: &Path, source_key: &str) -> Option<String> {
    let path = hash_dir(cache_root, source_key).join("document.md");
    fs::read_to_string(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_path_changes_with_voice_rate_and_text() {
        let dir = Path::new("/tmp/speech");
        let base = chunk_path(dir, "en-us", 180, "hello");
        assert_ne!(base, chunk_path(dir, "en-gb", 180, "hello"));
        assert_ne!(base, chunk_path(dir, "en-us", 200, "hello"));
        assert_ne!(base, chunk_path(dir, "en-us", 180, "hello there"));
        assert_eq!(base, chunk_path(dir, "en-us", 180, "hello"));
    }

    #[test]
    fn markdown_round_trips_through_the_cache() {
        let root = tempfile::tempdir().unwrap();
        save_markdown(root.path(), "scan-001.png", "# Title\n\nBody");
        assert_eq!(
            load_markdown(root.path(), "scan-001.png").as_deref(),
            Some("# Title\n\nBody")
        );
        assert!(load_markdown(root.path(), "other.png").is_none());
    }
}
