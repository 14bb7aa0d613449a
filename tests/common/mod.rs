#![allow(dead_code)]

use async_trait::async_trait;
use face_folder_backend::config::{AppConfig, FolderNaming};
use face_folder_backend::models::{Face, FaceDetail, FaceMatch, FaceRecord, StoredObject, UploadedFile};
use face_folder_backend::services::error::{ServiceError, ServiceResult};
use face_folder_backend::services::storage::StorageService;
use face_folder_backend::services::vision::VisionService;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_BUCKET: &str = "test-bucket";
pub const TEST_COLLECTION: &str = "test-collection";

pub struct MockStorageService {
    pub files: Mutex<BTreeMap<String, Vec<u8>>>,
    pub fail_copy: AtomicBool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            fail_copy: AtomicBool::new(false),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    fn bucket(&self) -> &str {
        TEST_BUCKET
    }

    async fn upload_file(&self, local_path: &Path, key: &str) -> ServiceResult<StoredObject> {
        let data = tokio::fs::read(local_path).await?;
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(StoredObject {
            bucket: TEST_BUCKET.to_string(),
            key: key.to_string(),
            location: format!("mock://{}/{}", TEST_BUCKET, key),
        })
    }

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> ServiceResult<()> {
        if self.fail_copy.load(Ordering::SeqCst) {
            return Err(ServiceError::StorageService("AccessDenied".to_string()));
        }
        let data = self.files.lock().unwrap().get(source_key).cloned();
        match data {
            Some(data) => {
                self.files
                    .lock()
                    .unwrap()
                    .insert(dest_key.to_string(), data);
                Ok(())
            }
            None => Err(ServiceError::StorageService(format!(
                "NoSuchKey: {}",
                source_key
            ))),
        }
    }

    async fn delete_object(&self, key: &str) -> ServiceResult<()> {
        self.files.lock().unwrap().remove(key);
        Ok(())
    }

    async fn object_exists(&self, key: &str) -> ServiceResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(key))
    }

    async fn list_objects(&self, prefix: &str) -> ServiceResult<Vec<String>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn list_folders(&self) -> ServiceResult<Vec<String>> {
        let folders: BTreeSet<String> = self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter_map(|k| k.split_once('/').map(|(folder, _)| folder.to_string()))
            .collect();
        Ok(folders.into_iter().collect())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// What the fake vision service does for one image, read from the image bytes.
///
/// Lines of `match=<id>,<id>`, `delay=<ms>` and `fail=<detect|index|search>`.
#[derive(Debug, Default)]
pub struct Script {
    pub matches: Vec<String>,
    pub delay_ms: u64,
    pub fail: Option<String>,
}

impl Script {
    pub fn parse(data: &[u8]) -> Self {
        let mut script = Script::default();
        for line in String::from_utf8_lossy(data).lines() {
            match line.split_once('=') {
                Some(("match", ids)) => {
                    script.matches = ids
                        .split(',')
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                }
                Some(("delay", ms)) => script.delay_ms = ms.parse().unwrap_or(0),
                Some(("fail", stage)) => script.fail = Some(stage.to_string()),
                _ => {}
            }
        }
        script
    }
}

pub struct MockVisionService {
    storage: Arc<MockStorageService>,
    pub collections: Mutex<HashSet<String>>,
    pub ensure_calls: AtomicUsize,
    pub indexed: Mutex<Vec<String>>,
    pub fail_collection: AtomicBool,
}

impl MockVisionService {
    pub fn new(storage: Arc<MockStorageService>) -> Self {
        Self {
            storage,
            collections: Mutex::new(HashSet::new()),
            ensure_calls: AtomicUsize::new(0),
            indexed: Mutex::new(Vec::new()),
            fail_collection: AtomicBool::new(false),
        }
    }

    fn script(&self, bucket: &str, key: &str) -> ServiceResult<Script> {
        assert_eq!(bucket, TEST_BUCKET);
        self.storage
            .get(key)
            .map(|data| Script::parse(&data))
            .ok_or_else(|| ServiceError::VisionService(format!("InvalidS3ObjectException: {}", key)))
    }
}

fn face(id: &str) -> Face {
    Face {
        face_id: Some(id.to_string()),
        confidence: Some(99.9),
        ..Default::default()
    }
}

#[async_trait]
impl VisionService for MockVisionService {
    async fn ensure_collection(&self, collection_id: &str) -> ServiceResult<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_collection.load(Ordering::SeqCst) {
            return Err(ServiceError::VisionService(
                "AccessDeniedException".to_string(),
            ));
        }
        // Existing collections are fine; see `settle_create_collection` for the real mapping
        self.collections
            .lock()
            .unwrap()
            .insert(collection_id.to_string());
        Ok(())
    }

    async fn detect_faces(&self, bucket: &str, key: &str) -> ServiceResult<Vec<FaceDetail>> {
        let script = self.script(bucket, key)?;
        if script.fail.as_deref() == Some("detect") {
            return Err(ServiceError::VisionService("InvalidImageFormatException".to_string()));
        }
        Ok(script
            .matches
            .iter()
            .map(|_| FaceDetail {
                confidence: Some(99.0),
                ..Default::default()
            })
            .collect())
    }

    async fn index_faces(
        &self,
        bucket: &str,
        key: &str,
        collection_id: &str,
    ) -> ServiceResult<Vec<FaceRecord>> {
        assert_eq!(collection_id, TEST_COLLECTION);
        let script = self.script(bucket, key)?;
        if script.fail.as_deref() == Some("index") {
            return Err(ServiceError::VisionService("ThrottlingException".to_string()));
        }
        self.indexed.lock().unwrap().push(key.to_string());
        Ok(script
            .matches
            .iter()
            .map(|id| FaceRecord {
                face: Some(face(&format!("indexed-{}", id))),
                face_detail: None,
            })
            .collect())
    }

    async fn search_faces_by_image(
        &self,
        bucket: &str,
        key: &str,
        collection_id: &str,
    ) -> ServiceResult<Vec<FaceMatch>> {
        assert_eq!(collection_id, TEST_COLLECTION);
        let script = self.script(bucket, key)?;
        if script.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(script.delay_ms)).await;
        }
        if script.fail.as_deref() == Some("search") {
            return Err(ServiceError::VisionService(
                "InvalidParameterException: There are no faces in the image".to_string(),
            ));
        }
        Ok(script
            .matches
            .iter()
            .map(|id| FaceMatch {
                similarity: Some(98.5),
                face: Some(face(id)),
            })
            .collect())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub fn test_config(upload_dir: &Path) -> AppConfig {
    AppConfig {
        bucket: TEST_BUCKET.to_string(),
        collection_id: TEST_COLLECTION.to_string(),
        upload_dir: upload_dir.to_path_buf(),
        public_dir: upload_dir.join("public"),
        folder_naming: FolderNaming::AsReturned,
        ..AppConfig::default()
    }
}

pub fn mocks() -> (Arc<MockStorageService>, Arc<MockVisionService>) {
    let storage = Arc::new(MockStorageService::new());
    let vision = Arc::new(MockVisionService::new(storage.clone()));
    (storage, vision)
}

/// Writes `content` to a fresh temp file in `dir`, as the upload handler would
pub fn staged_upload(dir: &Path, filename: &str, content: &str) -> (UploadedFile, PathBuf) {
    let mut temp = tempfile::Builder::new()
        .prefix("photo-")
        .tempfile_in(dir)
        .unwrap();
    temp.write_all(content.as_bytes()).unwrap();
    let temp_path = temp.into_temp_path();
    let path = temp_path.to_path_buf();
    (UploadedFile::new(filename, temp_path), path)
}

/// Keys still sitting at the bucket root, i.e. never moved into a folder
pub fn staging_keys(storage: &MockStorageService) -> Vec<String> {
    storage
        .keys()
        .into_iter()
        .filter(|k| !k.contains('/'))
        .collect()
}
