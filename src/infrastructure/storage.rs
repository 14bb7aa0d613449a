use crate::config::AppConfig;
use crate::services::storage::S3StorageService;
use aws_config::SdkConfig;
use aws_sdk_s3::config::Credentials;
use std::sync::Arc;
use tracing::info;

pub fn setup_storage(aws_config: &SdkConfig, config: &AppConfig) -> Arc<S3StorageService> {
    let mut s3_config = aws_sdk_s3::config::Builder::from(aws_config);

    match &config.s3_endpoint {
        Some(endpoint_url) => {
            info!("☁️  S3 Storage: {} (Bucket: {})", endpoint_url, config.bucket);
            s3_config = s3_config.endpoint_url(endpoint_url).force_path_style(true);

            if let (Some(access_key), Some(secret_key)) =
                (&config.s3_access_key, &config.s3_secret_key)
            {
                s3_config = s3_config.credentials_provider(Credentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    "static",
                ));
            }
        }
        None => info!(
            "☁️  S3 Storage: AWS {} (Bucket: {})",
            config.region, config.bucket
        ),
    }

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config.build());
    Arc::new(S3StorageService::new(
        s3_client,
        config.bucket.clone(),
        config.region.clone(),
        config.s3_endpoint.clone(),
    ))
}
