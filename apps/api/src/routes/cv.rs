use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::models::summary::CvSummary;
use crate::state::AppState;

/// POST /api/v1/process-cv
/// Accepts a multipart upload with a `file` field containing a PDF resume
/// and returns the structured summary.
pub async fn handle_process_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CvSummary>, AppError> {
    let upload = read_upload(&mut multipart, &state).await?;
    info!(
        filename = %upload.filename,
        size = upload.content.len(),
        "processing uploaded CV"
    );

    // Extraction is CPU-bound synchronous work; keep it off the async workers.
    let extractor = state.extractor.clone();
    let content = upload.content;
    let cv_text = tokio::task::spawn_blocking(move || extractor.extract(&content))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    let summary = state.summarizer.summarize(&cv_text).await?;
    Ok(Json(summary))
}

struct Upload {
    filename: String,
    content: Bytes,
}

/// Reads the `file` field from the multipart body, enforcing the extension
/// allow-list and size limit before any bytes reach the extractor.
async fn read_upload(multipart: &mut Multipart, state: &AppState) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("no file provided".to_string()))?;

        let extension = file_extension(&filename);
        if !state.config.is_allowed_extension(&extension) {
            return Err(AppError::Validation(format!(
                "invalid file type '{extension}'. Allowed types: {}",
                state.config.allowed_extensions.join(", ")
            )));
        }

        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

        if content.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }
        if content.len() > state.config.max_file_size {
            return Err(AppError::Validation(format!(
                "file too large. Maximum size: {} bytes",
                state.config.max_file_size
            )));
        }

        return Ok(Upload { filename, content });
    }

    Err(AppError::Validation("no file provided".to_string()))
}

/// Lowercased dot-prefixed extension of a filename, or empty when absent.
fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}
