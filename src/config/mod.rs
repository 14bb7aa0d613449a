use std::env;
use std::path::PathBuf;

/// How the destination folder is derived from the matched face ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderNaming {
    /// Join ids in the order the vision service returned them
    #[default]
    AsReturned,
    /// Sort ids before joining so the folder does not depend on match order
    Sorted,
}

impl FolderNaming {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "as_returned" => Some(Self::AsReturned),
            "sorted" => Some(Self::Sorted),
            _ => None,
        }
    }
}

/// Deployment configuration for the photo pipeline
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// AWS region for both S3 and Rekognition (default: "us-west-2")
    pub region: String,

    /// Bucket that receives every photo (default: "face-folder-photos")
    pub bucket: String,

    /// Custom S3 endpoint, e.g. MinIO. Enables path-style addressing.
    pub s3_endpoint: Option<String>,

    /// Static S3 credentials, used together with `s3_endpoint`
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,

    /// Rekognition collection shared by every request (default: "my-photo-collection")
    pub collection_id: String,

    /// Maximum number of `photos` parts per request (default: 12)
    pub max_files_per_request: usize,

    /// Maximum request body size in bytes (default: 100 MB)
    pub max_upload_size: usize,

    /// Directory holding temporary uploads (default: "uploads")
    pub upload_dir: PathBuf,

    /// Directory served verbatim as static assets (default: "public")
    pub public_dir: PathBuf,

    /// Minimum similarity for a face match, service default when unset
    pub face_match_threshold: Option<f32>,

    pub folder_naming: FolderNaming,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            bucket: "face-folder-photos".to_string(),
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
            collection_id: "my-photo-collection".to_string(),
            max_files_per_request: 12,
            max_upload_size: 100 * 1024 * 1024, // 100 MB
            upload_dir: PathBuf::from("uploads"),
            public_dir: PathBuf::from("public"),
            face_match_threshold: None,
            folder_naming: FolderNaming::AsReturned,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            region: env::var("AWS_REGION").unwrap_or(default.region),

            bucket: env::var("S3_BUCKET").unwrap_or(default.bucket),

            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|v| !v.is_empty()),
            s3_access_key: env::var("S3_ACCESS_KEY").ok(),
            s3_secret_key: env::var("S3_SECRET_KEY").ok(),

            collection_id: env::var("FACE_COLLECTION_ID").unwrap_or(default.collection_id),

            max_files_per_request: env::var("MAX_FILES_PER_REQUEST")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(default.max_files_per_request),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            public_dir: env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.public_dir),

            face_match_threshold: env::var("FACE_MATCH_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok()),

            folder_naming: env::var("FOLDER_NAMING")
                .ok()
                .and_then(|v| FolderNaming::parse(&v))
                .unwrap_or(default.folder_naming),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Local MinIO setup used during development
    pub fn development() -> Self {
        Self {
            region: "us-east-1".to_string(),
            bucket: "uploads".to_string(),
            s3_endpoint: Some("http://127.0.0.1:9000".to_string()),
            s3_access_key: Some("minioadmin".to_string()),
            s3_secret_key: Some("minioadmin".to_string()),
            upload_dir: env::temp_dir().join("face-folder-uploads"),
            ..Self::default()
        }
    }
}
