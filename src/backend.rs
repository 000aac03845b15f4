//! HTTP client for the OCR and definition backend.
//!
//! The backend exposes two endpoints: `POST /upload` takes a multipart file
//! and answers with the recognized markdown, and `POST /get-definition`
//! answers with a short definition of a word in its surrounding context.
//! Error bodies carry an `error` field which we surface verbatim so the UI
//! shows the same message the server logged.
//!
//! No retry and no request timeout here: a hung call leaves the
//! corresponding affordance in its loading state until the server answers.

use anyhow::{Context, Result, anyhow};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    markdown: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DefinitionResponse {
    definition: Option<String>,
    error: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send a document to the backend for OCR and return the markdown it
    /// produced.
    pub async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<String> {
        let url = format!("{}/upload", self.base_url);
        debug!(url = %url, file = %file_name, size = bytes.len(), "uploading document");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .context("invalid mime type for upload")?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("failed to reach the backend")?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .context("backend returned a malformed upload response")?;

        if let Some(error) = body.error {
            return Err(anyhow!(error));
        }
        if !status.is_success() {
            return Err(anyhow!("Failed to process image"));
        }
        body.markdown
            .ok_or_else(|| anyhow!("Failed to process image"))
    }

    /// Ask the backend to define `word` as used inside `context`.
    pub async fn fetch_definition(&self, word: &str, context: &str) -> Result<String> {
        let url = format!("{}/get-definition", self.base_url);
        debug!(url = %url, word = %word, context_chars = context.chars().count(), "fetching definition");

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "word": word, "context": context }))
            .send()
            .await
            .context("failed to reach the backend")?;

        let status = response.status();
        let body: DefinitionResponse = response
            .json()
            .await
            .context("backend returned a malformed definition response")?;

        if let Some(error) = body.error {
            return Err(anyhow!(error));
        }
        if !status.is_success() {
            return Err(anyhow!("definition request failed with status {status}"));
        }
        body.definition
            .ok_or_else(|| anyhow!("definition response had no definition field"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_accepts_both_shapes() {
        let ok: UploadResponse = serde_json::from_str(r##"{"markdown": "# Hi", "filename": "a.png"}"##).unwrap();
        assert_eq!(ok.markdown.as_deref(), Some("# Hi"));
        assert!(ok.error.is_none());

        let err: UploadResponse = serde_json::from_str(r#"{"error": "No file part"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("No file part"));
        assert!(err.markdown.is_none());
    }

    #[test]
    fn definition_response_accepts_both_shapes() {
        let ok: DefinitionResponse = serde_json::from_str(r#"{"definition": "a word"}"#).unwrap();
        assert_eq!(ok.definition.as_deref(), Some("a word"));

        let err: DefinitionResponse =
            serde_json::from_str(r#"{"error": "Word and context are required"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("Word and context are required"));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = BackendClient::new("http://127.0.0.1:5000/");
        assert_eq!(client.base_url, "http://127.0.0.1:5000");
    }
}
