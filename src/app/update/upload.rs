use super::super::state::{ALLOWED_EXTENSIONS, App};
use super::Effect;
use crate::backend::BackendClient;
use anyhow::{Result, anyhow, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Client-side checks before any bytes leave the machine: the file must
/// exist, carry an accepted extension, and fit the size ceiling. Returns the
/// file size so callers can build the cache key.
fn validate_upload(path: &Path, max_bytes: u64) -> Result<u64, String> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Err(format!("File not found: {}", path.display())),
    };

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(format!(
            "Unsupported file type. Accepted: {}.",
            ALLOWED_EXTENSIONS.join(", ")
        ));
    }

    if metadata.len() > max_bytes {
        return Err(format!(
            "File is larger than the {} MiB limit.",
            max_bytes / (1024 * 1024)
        ));
    }
    Ok(metadata.len())
}

/// Whether the bytes look like one of the formats we accept, regardless of
/// what the filename claims.
fn content_looks_supported(bytes: &[u8]) -> bool {
    if bytes.starts_with(b"%PDF-") {
        return true;
    }
    // HEIC/HEIF carry their brand in an ftyp box that image's sniffer does
    // not recognize.
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        let brand = &bytes[8..12];
        if matches!(brand, b"heic" | b"heix" | b"heif" | b"mif1" | b"msf1") {
            return true;
        }
    }
    image::guess_format(bytes).is_ok()
}

/// Read, re-validate, and ship a file to the OCR backend.
pub(super) async fn run_upload(
    client: BackendClient,
    path: &Path,
    max_bytes: u64,
) -> Result<String> {
    let bytes = fs::read(path).map_err(|err| anyhow!("Could not read {}: {err}", path.display()))?;
    if bytes.len() as u64 > max_bytes {
        bail!("File is larger than the {} MiB limit.", max_bytes / (1024 * 1024));
    }
    if !content_looks_supported(&bytes) {
        bail!("File content is not a supported image or PDF.");
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    client.upload_document(file_name, bytes, mime.as_ref()).await
}

/// Cache key for OCR results: same path and same size means we trust the
/// markdown we already have and skip the network round trip.
fn source_key_for(path: &Path, size: u64) -> String {
    format!("{}|{size}", path.display())
}

impl App {
    pub(super) fn handle_path_input_changed(&mut self, path: String) {
        self.upload.path_input = path;
        self.upload.error = None;
    }

    pub(super) fn handle_upload_requested(&mut self, effects: &mut Vec<Effect>) {
        if self.upload.in_flight {
            return;
        }
        let trimmed = self.upload.path_input.trim();
        if trimmed.is_empty() {
            self.upload.error = Some("Choose a file to upload.".to_string());
            return;
        }
        let path = PathBuf::from(trimmed);

        let max_bytes = self.config.max_file_mib * 1024 * 1024;
        let size = match validate_upload(&path, max_bytes) {
            Ok(size) => size,
            Err(message) => {
                warn!(path = %path.display(), "Rejected upload: {message}");
                self.upload.error = Some(message);
                return;
            }
        };

        let source_key = source_key_for(&path, size);
        let source_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        if let Some(markdown) = crate::cache::load_markdown(&self.cache_root(), &source_key) {
            info!(path = %path.display(), "Reusing cached OCR result");
            self.upload.error = None;
            self.apply_markdown(source_key, source_name, &markdown);
            return;
        }

        info!(path = %path.display(), size, "Uploading document");
        // The content area empties as soon as the request goes out; controls
        // stay hidden until markdown comes back.
        self.stop_all_playback();
        self.definition.close();
        self.document.clear();
        self.upload.error = None;
        self.upload.in_flight = true;
        self.upload.request_id = self.upload.request_id.wrapping_add(1);
        self.upload.pending_source = Some((source_key, source_name));
        effects.push(Effect::UploadFile {
            path,
            request_id: self.upload.request_id,
        });
    }

    pub(super) fn handle_file_dropped(&mut self, path: PathBuf, effects: &mut Vec<Effect>) {
        self.upload.path_input = path.display().to_string();
        self.upload.error = None;
        self.handle_upload_requested(effects);
    }

    pub(super) fn handle_upload_finished(
        &mut self,
        request_id: u64,
        result: Result<String, String>,
    ) {
        if !self.upload.in_flight || request_id != self.upload.request_id {
            debug!(request_id, "Dropping superseded upload result");
            return;
        }
        self.upload.in_flight = false;
        let pending = self.upload.pending_source.take();
        match result {
            Ok(markdown) => {
                let (source_key, source_name) =
                    pending.unwrap_or_else(|| ("untitled".to_string(), "untitled".to_string()));
                crate::cache::save_markdown(&self.cache_root(), &source_key, &markdown);
                self.apply_markdown(source_key, source_name, &markdown);
            }
            Err(message) => {
                warn!("Upload failed: {message}");
                self.upload.error = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn fixture(cache_dir: &Path) -> App {
        let mut config = AppConfig::default();
        config.cache_dir = cache_dir.display().to_string();
        let (app, _) = App::bootstrap(config, None);
        app
    }

    #[test]
    fn validation_rejects_missing_unsupported_and_oversized() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("nope.png");
        assert!(validate_upload(&missing, 1024).is_err());

        let text = dir.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        let err = validate_upload(&text, 1024).unwrap_err();
        assert!(err.contains("Unsupported file type"));

        let big = dir.path().join("scan.png");
        fs::write(&big, vec![0u8; 64]).unwrap();
        let err = validate_upload(&big, 16).unwrap_err();
        assert!(err.contains("limit"));
        assert_eq!(validate_upload(&big, 1024), Ok(64));
    }

    #[test]
    fn content_sniffing_accepts_our_formats_only() {
        assert!(content_looks_supported(b"%PDF-1.7 rest of file"));
        assert!(content_looks_supported(PNG_MAGIC));
        let mut heic = Vec::from(&b"\x00\x00\x00\x18ftypheic"[..]);
        heic.extend_from_slice(&[0u8; 8]);
        assert!(content_looks_supported(&heic));
        assert!(!content_looks_supported(b"just some plain text"));
    }

    #[test]
    fn invalid_path_sets_inline_error_and_no_effect() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = fixture(dir.path());
        app.upload.path_input = dir.path().join("missing.png").display().to_string();

        let mut effects = Vec::new();
        app.handle_upload_requested(&mut effects);
        assert!(effects.is_empty());
        assert!(!app.upload.in_flight);
        assert!(app.upload.error.is_some());
    }

    #[test]
    fn valid_file_starts_an_upload() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scan.png");
        fs::write(&file, PNG_MAGIC).unwrap();

        let mut app = fixture(dir.path());
        app.upload.path_input = file.display().to_string();

        let mut effects = Vec::new();
        app.handle_upload_requested(&mut effects);
        assert!(app.upload.in_flight);
        assert!(app.upload.error.is_none());
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::UploadFile { .. })));
    }

    #[test]
    fn cached_markdown_skips_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scan.png");
        fs::write(&file, PNG_MAGIC).unwrap();
        let key = source_key_for(&file, PNG_MAGIC.len() as u64);
        crate::cache::save_markdown(dir.path(), &key, "Cats are great.");

        let mut app = fixture(dir.path());
        app.upload.path_input = file.display().to_string();

        let mut effects = Vec::new();
        app.handle_upload_requested(&mut effects);
        assert!(effects.is_empty());
        assert!(!app.upload.in_flight);
        assert!(app.document.loaded);
        assert_eq!(app.main.words.len(), 3);
    }

    #[test]
    fn failed_upload_surfaces_the_backend_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = fixture(dir.path());
        app.upload.in_flight = true;
        app.upload.request_id = 7;

        app.handle_upload_finished(7, Err("Failed to process image".into()));
        assert!(!app.upload.in_flight);
        assert_eq!(app.upload.error.as_deref(), Some("Failed to process image"));
        assert!(!app.document.loaded);
    }

    #[test]
    fn stale_upload_result_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = fixture(dir.path());
        app.upload.in_flight = true;
        app.upload.request_id = 7;

        app.handle_upload_finished(3, Ok("# Old".into()));
        assert!(app.upload.in_flight);
        assert!(!app.document.loaded);
    }
}
