use crate::AppState;
use crate::api::error::AppError;
use crate::models::FolderListing;
use crate::utils::validation::validate_folder_name;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Validate, ToSchema)]
pub struct DeleteImageRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Image key is required"))]
    pub image_key: String,
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct RenameFolderRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_folder_name"))]
    pub old_folder_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_folder_name"))]
    pub new_folder_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct RenameFolderResponse {
    pub message: String,
    pub moved: usize,
}

#[utoipa::path(
    get,
    path = "/folders",
    responses(
        (status = 200, description = "Face folders and their images", body = Vec<FolderListing>)
    ),
    tag = "gallery"
)]
pub async fn list_folders(
    State(state): State<AppState>,
) -> Result<Json<Vec<FolderListing>>, AppError> {
    let folders = state.gallery.list_folders().await?;
    Ok(Json(folders))
}

#[utoipa::path(
    post,
    path = "/delete_image",
    request_body = DeleteImageRequest,
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 400, description = "Image key is required"),
        (status = 404, description = "No image under that key")
    ),
    tag = "gallery"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Json(req): Json<DeleteImageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()?;
    state.gallery.delete_image(&req.image_key).await?;

    Ok(Json(MessageResponse {
        message: "Image deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/rename_folder",
    request_body = RenameFolderRequest,
    responses(
        (status = 200, description = "Folder renamed", body = RenameFolderResponse),
        (status = 400, description = "Both old and new folder names are required"),
        (status = 404, description = "Folder has no images")
    ),
    tag = "gallery"
)]
pub async fn rename_folder(
    State(state): State<AppState>,
    Json(req): Json<RenameFolderRequest>,
) -> Result<Json<RenameFolderResponse>, AppError> {
    req.validate()?;
    if req.old_folder_name == req.new_folder_name {
        return Err(AppError::BadRequest(
            "Old and new folder names must differ".to_string(),
        ));
    }

    let moved = state
        .gallery
        .rename_folder(&req.old_folder_name, &req.new_folder_name)
        .await?;

    Ok(Json(RenameFolderResponse {
        message: "Folder renamed successfully".to_string(),
        moved,
    }))
}
