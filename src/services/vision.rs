use crate::models::{
    AgeRange, BoundingBox, Emotion, Face, FaceDetail, FaceMatch, FaceRecord, Gender, ImageQuality,
    Landmark, Pose,
};
use crate::services::error::{ServiceError, ServiceResult};
use async_trait::async_trait;
use aws_sdk_rekognition::Client;
use aws_sdk_rekognition::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_rekognition::operation::create_collection::{
    CreateCollectionError, CreateCollectionOutput,
};
use aws_sdk_rekognition::types::{self as rk, Attribute, Image, S3Object};

/// Error code returned by `CreateCollection` when the id is already taken
const COLLECTION_EXISTS_CODE: &str = "ResourceAlreadyExistsException";

/// Outcome of a failed `CreateCollection` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionErrorKind {
    /// The collection is already there, which is what the caller wanted
    AlreadyExists,
    Other,
}

/// The one place where a vision error code is turned into success.
pub fn classify_collection_error(code: Option<&str>) -> CollectionErrorKind {
    match code {
        Some(COLLECTION_EXISTS_CODE) => CollectionErrorKind::AlreadyExists,
        _ => CollectionErrorKind::Other,
    }
}

fn collection_error_kind(err: &CreateCollectionError) -> CollectionErrorKind {
    if err.is_resource_already_exists_exception() {
        CollectionErrorKind::AlreadyExists
    } else {
        classify_collection_error(err.code())
    }
}

/// Turns the outcome of `CreateCollection` into the result of `ensure_collection`
pub fn settle_create_collection(
    collection_id: &str,
    res: Result<CreateCollectionOutput, CreateCollectionError>,
) -> ServiceResult<()> {
    match res {
        Ok(out) => {
            tracing::info!(
                "Collection created: {} (status {:?})",
                collection_id,
                out.status_code
            );
            Ok(())
        }
        Err(service_error) => match collection_error_kind(&service_error) {
            CollectionErrorKind::AlreadyExists => {
                tracing::debug!("Collection already exists: {}", collection_id);
                Ok(())
            }
            CollectionErrorKind::Other => {
                tracing::error!("CreateCollection failed: {:?}", service_error);
                Err(ServiceError::vision(DisplayErrorContext(service_error)))
            }
        },
    }
}

/// Face recognition operations, all addressing images already in object storage
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Creates the collection, succeeding when it already exists
    async fn ensure_collection(&self, collection_id: &str) -> ServiceResult<()>;
    async fn detect_faces(&self, bucket: &str, key: &str) -> ServiceResult<Vec<FaceDetail>>;
    async fn index_faces(
        &self,
        bucket: &str,
        key: &str,
        collection_id: &str,
    ) -> ServiceResult<Vec<FaceRecord>>;
    async fn search_faces_by_image(
        &self,
        bucket: &str,
        key: &str,
        collection_id: &str,
    ) -> ServiceResult<Vec<FaceMatch>>;
    async fn health_check(&self) -> bool;
}

pub struct RekognitionService {
    client: Client,
    face_match_threshold: Option<f32>,
}

impl RekognitionService {
    pub fn new(client: Client, face_match_threshold: Option<f32>) -> Self {
        Self {
            client,
            face_match_threshold,
        }
    }
}

fn s3_image(bucket: &str, key: &str) -> Image {
    Image::builder()
        .s3_object(S3Object::builder().bucket(bucket).name(key).build())
        .build()
}

#[async_trait]
impl VisionService for RekognitionService {
    async fn ensure_collection(&self, collection_id: &str) -> ServiceResult<()> {
        let res = self
            .client
            .create_collection()
            .collection_id(collection_id)
            .send()
            .await
            .map_err(|e| e.into_service_error());

        settle_create_collection(collection_id, res)
    }

    async fn detect_faces(&self, bucket: &str, key: &str) -> ServiceResult<Vec<FaceDetail>> {
        let res = self
            .client
            .detect_faces()
            .image(s3_image(bucket, key))
            .attributes(Attribute::All)
            .send()
            .await
            .map_err(|e| ServiceError::vision(DisplayErrorContext(e)))?;

        let faces: Vec<FaceDetail> = res
            .face_details
            .unwrap_or_default()
            .into_iter()
            .map(FaceDetail::from)
            .collect();
        tracing::debug!("Detected {} faces in {}", faces.len(), key);
        Ok(faces)
    }

    async fn index_faces(
        &self,
        bucket: &str,
        key: &str,
        collection_id: &str,
    ) -> ServiceResult<Vec<FaceRecord>> {
        let res = self
            .client
            .index_faces()
            .collection_id(collection_id)
            .image(s3_image(bucket, key))
            .send()
            .await
            .map_err(|e| ServiceError::vision(DisplayErrorContext(e)))?;

        let records: Vec<FaceRecord> = res
            .face_records
            .unwrap_or_default()
            .into_iter()
            .map(FaceRecord::from)
            .collect();
        tracing::debug!("Indexed {} faces from {}", records.len(), key);
        Ok(records)
    }

    async fn search_faces_by_image(
        &self,
        bucket: &str,
        key: &str,
        collection_id: &str,
    ) -> ServiceResult<Vec<FaceMatch>> {
        let res = self
            .client
            .search_faces_by_image()
            .collection_id(collection_id)
            .image(s3_image(bucket, key))
            .set_face_match_threshold(self.face_match_threshold)
            .send()
            .await
            .map_err(|e| ServiceError::vision(DisplayErrorContext(e)))?;

        let matches: Vec<FaceMatch> = res
            .face_matches
            .unwrap_or_default()
            .into_iter()
            .map(FaceMatch::from)
            .collect();
        tracing::debug!("Found {} face matches for {}", matches.len(), key);
        Ok(matches)
    }

    async fn health_check(&self) -> bool {
        self.client
            .list_collections()
            .max_results(1)
            .send()
            .await
            .is_ok()
    }
}

impl From<rk::BoundingBox> for BoundingBox {
    fn from(b: rk::BoundingBox) -> Self {
        Self {
            width: b.width,
            height: b.height,
            left: b.left,
            top: b.top,
        }
    }
}

impl From<rk::FaceDetail> for FaceDetail {
    fn from(d: rk::FaceDetail) -> Self {
        Self {
            bounding_box: d.bounding_box.map(BoundingBox::from),
            age_range: d.age_range.map(|a| AgeRange {
                low: a.low,
                high: a.high,
            }),
            gender: d.gender.map(|g| Gender {
                value: g.value.map(|v| v.as_str().to_string()),
                confidence: g.confidence,
            }),
            emotions: d
                .emotions
                .unwrap_or_default()
                .into_iter()
                .map(|e| Emotion {
                    kind: e.r#type.map(|t| t.as_str().to_string()),
                    confidence: e.confidence,
                })
                .collect(),
            landmarks: d
                .landmarks
                .unwrap_or_default()
                .into_iter()
                .map(|l| Landmark {
                    kind: l.r#type.map(|t| t.as_str().to_string()),
                    x: l.x,
                    y: l.y,
                })
                .collect(),
            pose: d.pose.map(|p| Pose {
                roll: p.roll,
                yaw: p.yaw,
                pitch: p.pitch,
            }),
            quality: d.quality.map(|q| ImageQuality {
                brightness: q.brightness,
                sharpness: q.sharpness,
            }),
            confidence: d.confidence,
        }
    }
}

impl From<rk::Face> for Face {
    fn from(f: rk::Face) -> Self {
        Self {
            face_id: f.face_id,
            bounding_box: f.bounding_box.map(BoundingBox::from),
            image_id: f.image_id,
            external_image_id: f.external_image_id,
            confidence: f.confidence,
        }
    }
}

impl From<rk::FaceRecord> for FaceRecord {
    fn from(r: rk::FaceRecord) -> Self {
        Self {
            face: r.face.map(Face::from),
            face_detail: r.face_detail.map(FaceDetail::from),
        }
    }
}

impl From<rk::FaceMatch> for FaceMatch {
    fn from(m: rk::FaceMatch) -> Self {
        Self {
            similarity: m.similarity,
            face: m.face.map(Face::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_exists_is_success() {
        assert_eq!(
            classify_collection_error(Some("ResourceAlreadyExistsException")),
            CollectionErrorKind::AlreadyExists
        );
    }

    #[test]
    fn test_other_collection_errors_propagate() {
        assert_eq!(
            classify_collection_error(Some("AccessDeniedException")),
            CollectionErrorKind::Other
        );
        assert_eq!(classify_collection_error(None), CollectionErrorKind::Other);
    }

    #[test]
    fn test_existing_collection_settles_ok() {
        let err = CreateCollectionError::ResourceAlreadyExistsException(
            rk::error::ResourceAlreadyExistsException::builder()
                .message("The collection id: my-photo-collection already exists")
                .build(),
        );
        assert!(settle_create_collection("my-photo-collection", Err(err)).is_ok());

        let created = CreateCollectionOutput::builder().status_code(200).build();
        assert!(settle_create_collection("my-photo-collection", Ok(created)).is_ok());
    }

    #[test]
    fn test_denied_collection_settles_err() {
        let err = CreateCollectionError::AccessDeniedException(
            rk::error::AccessDeniedException::builder()
                .message("not allowed")
                .build(),
        );
        let result = settle_create_collection("my-photo-collection", Err(err));
        assert!(matches!(result, Err(ServiceError::VisionService(_))));
    }

    #[test]
    fn test_face_match_conversion() {
        let sdk_match = rk::FaceMatch::builder()
            .similarity(99.5)
            .face(
                rk::Face::builder()
                    .face_id("f123")
                    .image_id("img-1")
                    .confidence(99.9)
                    .build(),
            )
            .build();

        let converted = FaceMatch::from(sdk_match);
        assert_eq!(converted.face_id(), Some("f123"));
        assert_eq!(converted.similarity, Some(99.5));
        assert_eq!(
            converted.face.and_then(|f| f.image_id).as_deref(),
            Some("img-1")
        );
    }

    #[test]
    fn test_face_detail_conversion() {
        let detail = rk::FaceDetail::builder()
            .bounding_box(rk::BoundingBox::builder().width(0.5).height(0.25).build())
            .age_range(rk::AgeRange::builder().low(20).high(30).build())
            .emotions(
                rk::Emotion::builder()
                    .r#type(rk::EmotionName::Happy)
                    .confidence(80.0)
                    .build(),
            )
            .confidence(99.0)
            .build();

        let converted = FaceDetail::from(detail);
        assert_eq!(converted.bounding_box.and_then(|b| b.width), Some(0.5));
        assert_eq!(converted.age_range.and_then(|a| a.high), Some(30));
        assert_eq!(converted.emotions.len(), 1);
        assert_eq!(converted.emotions[0].kind.as_deref(), Some("HAPPY"));
        assert!(converted.landmarks.is_empty());
    }
}
