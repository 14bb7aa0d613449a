use crate::config::FolderNaming;
use crate::models::{PhotoOutcome, UploadedFile};
use crate::services::error::ServiceError;
use crate::services::storage::StorageService;
use crate::services::vision::VisionService;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Folder for photos whose faces matched nobody in the collection
pub const UNKNOWN_FOLDER: &str = "unknown";

/// Separator between face ids in a folder name
pub const FACE_ID_SEPARATOR: &str = "_";

/// Step of the per-file pipeline, used to report where a photo failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Detect,
    Index,
    Search,
    Copy,
    DeleteOriginal,
    CleanupTemp,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Upload => "upload",
            Stage::Detect => "detect faces",
            Stage::Index => "index faces",
            Stage::Search => "search faces",
            Stage::Copy => "copy to folder",
            Stage::DeleteOriginal => "delete original",
            Stage::CleanupTemp => "remove temp file",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
#[error("{stage} failed for '{filename}': {source}")]
pub struct PipelineFailure {
    pub stage: Stage,
    pub filename: String,
    #[source]
    pub source: ServiceError,
}

/// Derives the destination folder from matched face ids.
///
/// Empty input maps to [`UNKNOWN_FOLDER`].
pub fn folder_name<'a, I>(face_ids: I, naming: FolderNaming) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ids: Vec<&str> = face_ids.into_iter().collect();
    if ids.is_empty() {
        return UNKNOWN_FOLDER.to_string();
    }
    if naming == FolderNaming::Sorted {
        ids.sort_unstable();
    }
    ids.join(FACE_ID_SEPARATOR)
}

/// Staging key: a fresh uuid in front of the original filename
pub fn staging_key(original_filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), original_filename)
}

pub fn folder_key(folder: &str, staging_key: &str) -> String {
    format!("{}/{}", folder, staging_key)
}

/// Runs one photo through upload, face analysis and placement
pub struct PhotoPipeline {
    storage: Arc<dyn StorageService>,
    vision: Arc<dyn VisionService>,
    collection_id: String,
    folder_naming: FolderNaming,
}

impl PhotoPipeline {
    pub fn new(
        storage: Arc<dyn StorageService>,
        vision: Arc<dyn VisionService>,
        collection_id: String,
        folder_naming: FolderNaming,
    ) -> Self {
        Self {
            storage,
            vision,
            collection_id,
            folder_naming,
        }
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// Consumes the upload. Its temp file is gone when this returns, whatever
    /// the outcome. Remote objects and indexed faces from completed stages
    /// are left in place on failure.
    pub async fn run(&self, file: UploadedFile) -> Result<PhotoOutcome, PipelineFailure> {
        let filename = file.original_filename.clone();
        let fail = |stage: Stage| {
            let filename = filename.clone();
            move |source: ServiceError| {
                tracing::error!("❌ {} failed for '{}': {}", stage, filename, source);
                PipelineFailure {
                    stage,
                    filename,
                    source,
                }
            }
        };

        let bucket = self.storage.bucket().to_string();
        let key = staging_key(&file.original_filename);

        let stored = self
            .storage
            .upload_file(file.path(), &key)
            .await
            .map_err(fail(Stage::Upload))?;

        let face_details = self
            .vision
            .detect_faces(&bucket, &key)
            .await
            .map_err(fail(Stage::Detect))?;

        let face_records = self
            .vision
            .index_faces(&bucket, &key, &self.collection_id)
            .await
            .map_err(fail(Stage::Index))?;
        tracing::debug!("Indexed {} face records for '{}'", face_records.len(), filename);

        let face_matches = self
            .vision
            .search_faces_by_image(&bucket, &key, &self.collection_id)
            .await
            .map_err(fail(Stage::Search))?;

        let folder = folder_name(
            face_matches.iter().filter_map(|m| m.face_id()),
            self.folder_naming,
        );
        let destination = folder_key(&folder, &key);

        self.storage
            .copy_object(&key, &destination)
            .await
            .map_err(fail(Stage::Copy))?;

        self.storage
            .delete_object(&key)
            .await
            .map_err(fail(Stage::DeleteOriginal))?;

        file.temp_path
            .close()
            .map_err(|e| fail(Stage::CleanupTemp)(ServiceError::StorageIo(e)))?;

        tracing::info!(
            "✅ '{}' placed in folder '{}' ({} faces, {} matches)",
            filename,
            folder,
            face_details.len(),
            face_matches.len()
        );

        Ok(PhotoOutcome {
            s3_url: stored.location,
            face_details,
            face_matches,
            folder_name: folder,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_name_without_matches() {
        assert_eq!(folder_name(std::iter::empty(), FolderNaming::AsReturned), "unknown");
        assert_eq!(folder_name(std::iter::empty(), FolderNaming::Sorted), "unknown");
    }

    #[test]
    fn test_folder_name_keeps_service_order() {
        assert_eq!(folder_name(["f123"], FolderNaming::AsReturned), "f123");
        assert_eq!(
            folder_name(["zz", "aa", "mm"], FolderNaming::AsReturned),
            "zz_aa_mm"
        );
    }

    #[test]
    fn test_folder_name_sorted() {
        assert_eq!(
            folder_name(["zz", "aa", "mm"], FolderNaming::Sorted),
            "aa_mm_zz"
        );
        assert_eq!(
            folder_name(["mm", "zz", "aa"], FolderNaming::Sorted),
            folder_name(["aa", "zz", "mm"], FolderNaming::Sorted)
        );
    }

    #[test]
    fn test_keys() {
        let key = staging_key("me.jpg");
        assert!(key.ends_with("_me.jpg"));
        assert_eq!(key.len(), 36 + 1 + "me.jpg".len());
        assert_ne!(staging_key("me.jpg"), key);
        assert_eq!(folder_key("f1_f2", &key), format!("f1_f2/{}", key));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Search.to_string(), "search faces");
        assert_eq!(Stage::DeleteOriginal.to_string(), "delete original");
    }
}
