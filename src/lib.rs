pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::batch::BatchOrchestrator;
use crate::services::gallery::GalleryService;
use crate::services::pipeline::PhotoPipeline;
use crate::services::storage::StorageService;
use crate::services::vision::VisionService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_photos,
        api::handlers::gallery::list_folders,
        api::handlers::gallery::delete_image,
        api::handlers::gallery::rename_folder,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::upload::UploadPhotosForm,
            api::handlers::gallery::DeleteImageRequest,
            api::handlers::gallery::RenameFolderRequest,
            api::handlers::gallery::MessageResponse,
            api::handlers::gallery::RenameFolderResponse,
            api::handlers::health::HealthResponse,
            models::PhotoOutcome,
            models::FaceDetail,
            models::FaceMatch,
            models::Face,
            models::BoundingBox,
            models::AgeRange,
            models::Gender,
            models::Emotion,
            models::Landmark,
            models::Pose,
            models::ImageQuality,
            models::FolderListing,
        )
    ),
    tags(
        (name = "photos", description = "Photo upload and face sorting"),
        (name = "gallery", description = "Face folder management"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub vision: Arc<dyn VisionService>,
    pub orchestrator: Arc<BatchOrchestrator>,
    pub gallery: Arc<GalleryService>,
    pub config: AppConfig,
}

impl AppState {
    /// Wires the pipeline, orchestrator and gallery around the two clients
    pub fn new(
        storage: Arc<dyn StorageService>,
        vision: Arc<dyn VisionService>,
        config: AppConfig,
    ) -> Self {
        let pipeline = PhotoPipeline::new(
            storage.clone(),
            vision.clone(),
            config.collection_id.clone(),
            config.folder_naming,
        );
        let orchestrator = Arc::new(BatchOrchestrator::new(pipeline, vision.clone()));
        let gallery = Arc::new(GalleryService::new(storage.clone()));

        Self {
            storage,
            vision,
            orchestrator,
            gallery,
            config,
        }
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.public_dir);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_size);
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::upload::upload_photos))
        .route("/folders", get(api::handlers::gallery::list_folders))
        .route("/delete_image", post(api::handlers::gallery::delete_image))
        .route("/rename_folder", post(api::handlers::gallery::rename_folder))
        .fallback_service(static_files)
        .layer(body_limit)
        .layer(cors)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
