use crate::services::error::ServiceError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body returned by `/upload` for any batch failure. Nothing more specific
/// is ever sent to the caller.
pub const UPLOAD_FAILURE_MESSAGE: &str = "Error processing the images";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upload batch failed: {0}")]
    UploadFailed(#[source] ServiceError),

    #[error("Service error: {0}")]
    Service(#[source] ServiceError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(what) => AppError::NotFound(format!("{} does not exist", what)),
            other => AppError::Service(other),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(e.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::UploadFailed(e) => {
                tracing::error!("Upload batch failed: {:?}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, UPLOAD_FAILURE_MESSAGE).into_response();
            }
            AppError::Service(e) => {
                tracing::error!("Service error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::BadRequest(msg) => {
                return (StatusCode::BAD_REQUEST, msg).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge(msg) => {
                return (StatusCode::PAYLOAD_TOO_LARGE, msg).into_response();
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_upload_failure_hides_details() {
        let err = AppError::UploadFailed(ServiceError::BatchAggregate {
            failed: 1,
            total: 3,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, UPLOAD_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_service_error_is_generic_json() {
        let err = AppError::Service(ServiceError::StorageService("AccessDenied".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("Internal Server Error"));
        assert!(!body.contains("AccessDenied"));
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let err = AppError::from(ServiceError::NotFound("Image 'f1/a.jpg'".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Image 'f1/a.jpg' does not exist"));
    }
}
