use crate::models::StoredObject;
use crate::services::error::{ServiceError, ServiceResult};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::Path;

/// Characters left untouched when a key is embedded in a URL path
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Bucket every key of this service lives in
    fn bucket(&self) -> &str;

    /// Reads `local_path` fully and writes it under `key`
    async fn upload_file(&self, local_path: &Path, key: &str) -> ServiceResult<StoredObject>;
    async fn copy_object(&self, source_key: &str, dest_key: &str) -> ServiceResult<()>;
    async fn delete_object(&self, key: &str) -> ServiceResult<()>;
    async fn object_exists(&self, key: &str) -> ServiceResult<bool>;
    /// Keys of every object starting with `prefix`
    async fn list_objects(&self, prefix: &str) -> ServiceResult<Vec<String>>;
    /// Top-level folder prefixes, without the trailing `/`
    async fn list_folders(&self) -> ServiceResult<Vec<String>>;
    async fn health_check(&self) -> bool;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String, region: String, endpoint: Option<String>) -> Self {
        Self {
            client,
            bucket,
            region,
            endpoint,
        }
    }
}

/// Public URL of an object. Path-style when a custom endpoint is configured,
/// virtual-hosted AWS style otherwise.
pub fn object_location(endpoint: Option<&str>, region: &str, bucket: &str, key: &str) -> String {
    let encoded_key = utf8_percent_encode(key, KEY_ENCODE_SET);
    match endpoint {
        Some(endpoint) => format!(
            "{}/{}/{}",
            endpoint.trim_end_matches('/'),
            bucket,
            encoded_key
        ),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, encoded_key),
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload_file(&self, local_path: &Path, key: &str) -> ServiceResult<StoredObject> {
        let data = tokio::fs::read(local_path).await?;
        let content_type = infer::get(&data).map(|kind| kind.mime_type().to_string());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| ServiceError::storage(DisplayErrorContext(e)))?;

        let location = object_location(self.endpoint.as_deref(), &self.region, &self.bucket, key);
        tracing::info!("File uploaded successfully. {}", location);

        Ok(StoredObject {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            location,
        })
    }

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> ServiceResult<()> {
        let copy_source = format!(
            "{}/{}",
            self.bucket,
            utf8_percent_encode(source_key, KEY_ENCODE_SET)
        );

        let res = self
            .client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(copy_source)
            .key(dest_key)
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 copy_object failed: source={}/{}, dest={}, error={:?}",
                self.bucket,
                source_key,
                dest_key,
                e
            );
            return Err(ServiceError::storage(DisplayErrorContext(e)));
        }
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> ServiceResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ServiceError::storage(DisplayErrorContext(e)))?;
        Ok(())
    }

    async fn object_exists(&self, key: &str) -> ServiceResult<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(ServiceError::storage(DisplayErrorContext(service_error)))
                }
            }
        }
    }

    async fn list_objects(&self, prefix: &str) -> ServiceResult<Vec<String>> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let res = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token)
                .send()
                .await
                .map_err(|e| ServiceError::storage(DisplayErrorContext(e)))?;

            if let Some(contents) = res.contents {
                for object in contents {
                    if let Some(key) = object.key {
                        objects.push(key);
                    }
                }
            }

            if res.is_truncated.unwrap_or(false) {
                continuation_token = res.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn list_folders(&self) -> ServiceResult<Vec<String>> {
        let mut folders = Vec::new();
        let mut continuation_token = None;

        loop {
            let res = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .delimiter("/")
                .set_continuation_token(continuation_token)
                .send()
                .await
                .map_err(|e| ServiceError::storage(DisplayErrorContext(e)))?;

            if let Some(prefixes) = res.common_prefixes {
                for common in prefixes {
                    if let Some(prefix) = common.prefix {
                        folders.push(prefix.trim_end_matches('/').to_string());
                    }
                }
            }

            if res.is_truncated.unwrap_or(false) {
                continuation_token = res.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(folders)
    }

    async fn health_check(&self) -> bool {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
    }
}
