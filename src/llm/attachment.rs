use crate::errors::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Image files written for a single request.
///
/// Files are removed when the guard is dropped, so every exit path of a
/// request (including cancellation) cleans up after itself.
#[derive(Debug, Default)]
pub struct Attachments {
    files: Vec<PathBuf>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths written so far, in prompt order
    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Decodes a base64 data URI and writes it under `dir`
    ///
    /// Whitespace inside the payload (line-wrapped base64) is ignored.
    ///
    /// # Arguments
    /// * `dir` - Directory receiving the file, created if missing
    /// * `data_url` - `data:<mime>;base64,<payload>` URI
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Path of the written file
    pub async fn save_data_url(&mut self, dir: &Path, data_url: &str) -> Result<PathBuf> {
        let (header, payload) = data_url
            .split_once(',')
            .ok_or_else(|| Error::InvalidImage("data URI has no payload".into()))?;
        let header = header.to_ascii_lowercase();

        if !header.ends_with(";base64") {
            return Err(Error::InvalidImage(format!(
                "only base64 data URIs are supported, got '{}'",
                header
            )));
        }

        let payload: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidImage(format!("bad base64 payload: {}", e)))?;

        tokio::fs::create_dir_all(dir).await?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let path = dir.join(format!("{}.{}", &id[..8], extension_for(&header)));
        tokio::fs::write(&path, &bytes).await?;
        debug!("Saved {} byte image to {}", bytes.len(), path.display());

        self.files.push(path.clone());
        Ok(path)
    }
}

impl Drop for Attachments {
    fn drop(&mut self) {
        // Drop cannot await; unlinking is cheap.
        for file in self.files.drain(..) {
            if let Err(e) = std::fs::remove_file(&file) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove attachment {}: {}", file.display(), e);
                }
            }
        }
    }
}

/// Picks a file extension from the MIME type in a data URI header
fn extension_for(header: &str) -> &'static str {
    let header = header.to_ascii_lowercase();
    let mime = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .unwrap_or_default();

    match mime {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}
