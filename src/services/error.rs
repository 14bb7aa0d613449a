use thiserror::Error;

/// Failures raised by the storage and vision clients and the batch orchestrator
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The local temp file could not be read
    #[error("Storage IO error: {0}")]
    StorageIo(#[from] std::io::Error),

    /// The object store rejected or failed a request
    #[error("Storage service error: {0}")]
    StorageService(String),

    /// An object or folder the caller named does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The face recognition service rejected or failed a request
    #[error("Vision service error: {0}")]
    VisionService(String),

    /// At least one file in a batch failed. Carries counts only.
    #[error("Batch failed: {failed} of {total} files could not be processed")]
    BatchAggregate { failed: usize, total: usize },
}

impl ServiceError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageService(err.to_string())
    }

    pub fn vision(err: impl std::fmt::Display) -> Self {
        Self::VisionService(err.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
