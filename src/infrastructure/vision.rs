use crate::config::AppConfig;
use crate::services::vision::RekognitionService;
use aws_config::SdkConfig;
use std::sync::Arc;
use tracing::info;

pub fn setup_vision(aws_config: &SdkConfig, config: &AppConfig) -> Arc<RekognitionService> {
    info!(
        "👤 Rekognition: {} (Collection: {})",
        config.region, config.collection_id
    );
    if let Some(threshold) = config.face_match_threshold {
        info!("👤 Face match threshold: {}", threshold);
    }

    let client = aws_sdk_rekognition::Client::new(aws_config);
    Arc::new(RekognitionService::new(client, config.face_match_threshold))
}
