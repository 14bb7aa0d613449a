use crate::models::{PhotoOutcome, UploadedFile};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::pipeline::{PhotoPipeline, PipelineFailure};
use crate::services::vision::VisionService;
use futures::future::join_all;
use std::sync::Arc;

/// Runs every photo of a request through [`PhotoPipeline`] concurrently.
pub struct BatchOrchestrator {
    pipeline: PhotoPipeline,
    vision: Arc<dyn VisionService>,
}

impl BatchOrchestrator {
    pub fn new(pipeline: PhotoPipeline, vision: Arc<dyn VisionService>) -> Self {
        Self { pipeline, vision }
    }

    /// Per-file results in input order. Siblings of a failed file keep
    /// running to completion.
    ///
    /// An empty batch returns without touching the vision service.
    pub async fn process_settled(
        &self,
        files: Vec<UploadedFile>,
    ) -> ServiceResult<Vec<Result<PhotoOutcome, PipelineFailure>>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        self.vision
            .ensure_collection(self.pipeline.collection_id())
            .await?;

        tracing::info!("📸 Processing batch of {} photos", files.len());
        let tasks = files.into_iter().map(|file| self.pipeline.run(file));
        Ok(join_all(tasks).await)
    }

    /// All outcomes in input order, or a single aggregate failure when any
    /// file failed. Side effects of files that did succeed are kept.
    pub async fn process(&self, files: Vec<UploadedFile>) -> ServiceResult<Vec<PhotoOutcome>> {
        let total = files.len();
        let results = self.process_settled(files).await?;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::error!("Batch failed: {} of {} photos", failed, total);
            return Err(ServiceError::BatchAggregate { failed, total });
        }

        Ok(results.into_iter().filter_map(Result::ok).collect())
    }
}
