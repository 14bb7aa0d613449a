pub mod storage;
pub mod vision;

use crate::config::AppConfig;
use aws_config::SdkConfig;
use aws_sdk_s3::config::Region;

/// Shared AWS configuration; the region is fixed for the process lifetime
pub async fn load_aws_config(config: &AppConfig) -> SdkConfig {
    aws_config::from_env()
        .region(Region::new(config.region.clone()))
        .load()
        .await
}
