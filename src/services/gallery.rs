use crate::models::FolderListing;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::storage::StorageService;
use std::sync::Arc;

/// Browsing and housekeeping of the face folders in the bucket
pub struct GalleryService {
    storage: Arc<dyn StorageService>,
}

impl GalleryService {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    /// Every folder with the image keys directly inside it
    pub async fn list_folders(&self) -> ServiceResult<Vec<FolderListing>> {
        let mut listings = Vec::new();

        for folder in self.storage.list_folders().await? {
            let prefix = format!("{}/", folder);
            let images = self
                .storage
                .list_objects(&prefix)
                .await?
                .into_iter()
                .filter(|key| {
                    key.strip_prefix(&prefix)
                        .is_some_and(|name| !name.is_empty() && !name.contains('/'))
                })
                .collect();
            listings.push(FolderListing { folder, images });
        }

        Ok(listings)
    }

    pub async fn delete_image(&self, image_key: &str) -> ServiceResult<()> {
        if !self.storage.object_exists(image_key).await? {
            return Err(ServiceError::NotFound(format!("Image '{}'", image_key)));
        }
        self.storage.delete_object(image_key).await?;
        tracing::info!("🗑️  Deleted image {}", image_key);
        Ok(())
    }

    /// Moves every object under `old/` to `new/`, keeping the relative key.
    /// Returns how many objects were moved; an empty folder is not found.
    pub async fn rename_folder(&self, old_folder: &str, new_folder: &str) -> ServiceResult<usize> {
        let old_prefix = format!("{}/", old_folder);
        let new_prefix = format!("{}/", new_folder);
        let old_keys = self.storage.list_objects(&old_prefix).await?;
        if old_keys.is_empty() {
            return Err(ServiceError::NotFound(format!("Folder '{}'", old_folder)));
        }
        let mut moved = 0;

        for old_key in old_keys {
            let relative = old_key.strip_prefix(&old_prefix).unwrap_or(&old_key);
            let new_key = format!("{}{}", new_prefix, relative);
            self.storage.copy_object(&old_key, &new_key).await?;
            self.storage.delete_object(&old_key).await?;
            moved += 1;
        }

        tracing::info!(
            "📁 Renamed folder '{}' to '{}' ({} objects)",
            old_folder,
            new_folder,
            moved
        );
        Ok(moved)
    }
}
