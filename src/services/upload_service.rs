use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::UploadsConfig;

/// Extensions accepted for uploaded media
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "mp4", "mov", "webm", "m4v",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No files uploaded. Field name must be 'images'")]
    NoFiles,

    #[error("Unsupported file type '{0}'")]
    UnsupportedType(String),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error("Failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredUpload {
    pub url: String,
    pub file_name: String,
    pub size: usize,
    pub sha256: String,
}

/// Writes uploaded files under the uploads directory served at `/uploads`
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    public_base_url: String,
}

impl UploadService {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Store `data` under a fresh random name keeping the original extension
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredUpload, UploadError> {
        let ext = extension_of(original_name)?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&file_name), data).await?;

        let stored = StoredUpload {
            url: format!("{}/uploads/{}", self.public_base_url, file_name),
            sha256: format!("{:x}", Sha256::digest(data)),
            size: data.len(),
            file_name,
        };
        tracing::info!("Stored upload {} ({} bytes)", stored.file_name, stored.size);
        Ok(stored)
    }

    /// Delete the file an upload URL points at. Only the last path segment is
    /// used, so a URL can never reach outside the uploads directory. Failures
    /// are logged and otherwise ignored.
    pub async fn remove(&self, url: &str) {
        let Some(file_name) = file_name_of(url) else {
            tracing::warn!("Ignoring upload removal for unusable URL '{}'", url);
            return;
        };

        let path = self.dir.join(file_name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to delete upload {}: {}", path.display(), e);
        } else {
            tracing::info!("Deleted upload {}", path.display());
        }
    }

    /// Store a batch of `(original name, data)` files. Every name is checked
    /// before anything is written, and a failed write removes the files
    /// already stored for the batch.
    pub async fn save_all(&self, files: &[(String, Bytes)]) -> Result<Vec<StoredUpload>, UploadError> {
        for (name, _) in files {
            extension_of(name)?;
        }

        let mut stored = Vec::with_capacity(files.len());
        for (name, data) in files {
            match self.save(name, data).await {
                Ok(upload) => stored.push(upload),
                Err(e) => {
                    for upload in &stored {
                        self.remove(&upload.url).await;
                    }
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }
}

fn extension_of(name: &str) -> Result<String, UploadError> {
    let ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(UploadError::UnsupportedType(name.to_string()))
    }
}

fn file_name_of(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next()?;
    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return None;
    }
    Some(name)
}
