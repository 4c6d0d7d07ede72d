use axum::extract::{Multipart, State};
use axum::Extension;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{StoredUpload, UploadError};
use crate::state::AppState;

/// Multipart field carrying the files
const FIELD_NAME: &str = "images";

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub image_urls: Vec<String>,
    pub files: Vec<StoredUpload>,
}

/// POST /api/upload/images
pub async fn upload_images(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<UploadResult> {
    let mut parts = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(UploadError::from)? {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(UploadError::from)?;
        if data.is_empty() {
            continue;
        }
        parts.push((original_name, data));
    }

    if parts.is_empty() {
        return Err(UploadError::NoFiles.into());
    }
    let files = state.uploads().save_all(&parts).await?;

    tracing::info!("User {} uploaded {} file(s)", auth_user.id, files.len());
    Ok(ApiResponse::success(
        "Files uploaded successfully",
        UploadResult {
            image_urls: files.iter().map(|f| f.url.clone()).collect(),
            files,
        },
    ))
}
