use crate::AppState;
use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::models::{PhotoOutcome, UploadedFile};
use crate::utils::validation::{FALLBACK_FILENAME, sanitize_filename};
use axum::{
    Json,
    extract::{Multipart, State},
};
use tokio::io::AsyncWriteExt;
use utoipa::ToSchema;

/// Multipart field carrying the photos
pub const PHOTOS_FIELD: &str = "photos";

/// Shape of the multipart form, for the API docs
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadPhotosForm {
    #[schema(value_type = Vec<String>, format = Binary)]
    photos: Vec<Vec<u8>>,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadPhotosForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photos sorted into face folders, in upload order", body = Vec<PhotoOutcome>),
        (status = 400, description = "Malformed form or too many photos"),
        (status = 500, description = "At least one photo could not be processed")
    ),
    tag = "photos"
)]
pub async fn upload_photos(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<PhotoOutcome>>, AppError> {
    let files = receive_photos(&mut multipart, &state.config).await?;

    let outcomes = state
        .orchestrator
        .process(files)
        .await
        .map_err(AppError::UploadFailed)?;

    Ok(Json(outcomes))
}

/// Streams every `photos` part into its own temp file. Other fields are
/// ignored. Already written temp files are removed if a later part fails.
pub async fn receive_photos(
    multipart: &mut Multipart,
    config: &AppConfig,
) -> Result<Vec<UploadedFile>, AppError> {
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Upload dir unavailable: {}", e)))?;

    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(PHOTOS_FIELD) {
            continue;
        }

        if files.len() == config.max_files_per_request {
            return Err(AppError::BadRequest(format!(
                "At most {} photos per request",
                config.max_files_per_request
            )));
        }

        let original_filename = sanitize_filename(field.file_name().unwrap_or(FALLBACK_FILENAME))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let temp = tempfile::Builder::new()
            .prefix("photo-")
            .tempfile_in(&config.upload_dir)
            .map_err(|e| AppError::Internal(format!("Temp file error: {}", e)))?;
        let (std_file, temp_path) = temp.into_parts();
        let mut local = tokio::fs::File::from_std(std_file);

        while let Some(chunk) = field.chunk().await? {
            local
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Write error: {}", e)))?;
        }
        local
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Write error: {}", e)))?;

        tracing::debug!("Received '{}' at {}", original_filename, temp_path.display());
        files.push(UploadedFile::new(original_filename, temp_path));
    }

    Ok(files)
}
