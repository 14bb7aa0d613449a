use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::TempPath;
use utoipa::ToSchema;

/// A photo received in a multipart request, staged on local disk.
///
/// The temp file is removed when the value is dropped, so every exit path
/// of the pipeline that owns it cleans up.
#[derive(Debug)]
pub struct UploadedFile {
    pub original_filename: String,
    pub temp_path: TempPath,
}

impl UploadedFile {
    pub fn new(original_filename: impl Into<String>, temp_path: TempPath) -> Self {
        Self {
            original_filename: original_filename.into(),
            temp_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }
}

/// An object written to the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub left: Option<f32>,
    pub top: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct AgeRange {
    pub low: Option<i32>,
    pub high: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Gender {
    pub value: Option<String>,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Emotion {
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Landmark {
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Pose {
    pub roll: Option<f32>,
    pub yaw: Option<f32>,
    pub pitch: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ImageQuality {
    pub brightness: Option<f32>,
    pub sharpness: Option<f32>,
}

/// Attributes of one face detected in an image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FaceDetail {
    pub bounding_box: Option<BoundingBox>,
    pub age_range: Option<AgeRange>,
    pub gender: Option<Gender>,
    pub emotions: Vec<Emotion>,
    pub landmarks: Vec<Landmark>,
    pub pose: Option<Pose>,
    pub quality: Option<ImageQuality>,
    pub confidence: Option<f32>,
}

/// A face stored in the collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Face {
    pub face_id: Option<String>,
    pub bounding_box: Option<BoundingBox>,
    pub image_id: Option<String>,
    pub external_image_id: Option<String>,
    pub confidence: Option<f32>,
}

/// A face added to the collection by an index call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FaceRecord {
    pub face: Option<Face>,
    pub face_detail: Option<FaceDetail>,
}

/// A collection face that resembles a face in the query image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FaceMatch {
    pub similarity: Option<f32>,
    pub face: Option<Face>,
}

impl FaceMatch {
    pub fn face_id(&self) -> Option<&str> {
        self.face.as_ref().and_then(|f| f.face_id.as_deref())
    }
}

/// Result of one photo that went through the whole pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoOutcome {
    pub s3_url: String,
    pub face_details: Vec<FaceDetail>,
    pub face_matches: Vec<FaceMatch>,
    pub folder_name: String,
}

/// Images grouped under one folder prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FolderListing {
    pub folder: String,
    pub images: Vec<String>,
}
