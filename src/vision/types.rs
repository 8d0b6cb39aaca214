//! Cloud Vision wire types and the validated recognition result.
//!
//! The request/response structs mirror the `images:annotate` JSON schema.
//! Responses are never handed to callers raw: `OcrResponse::from_wire`
//! checks the shape first so nobody downstream indexes into an empty list.

use serde::{Deserialize, Serialize};

use super::RecognitionError;

/// Top-level `images:annotate` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotateImageRequest {
    pub features: Vec<Feature>,
    pub image: ImageRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    /// Dense-text OCR, tuned for whole pages.
    DocumentTextDetection,
    TextDetection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub source: ImageSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub image_uri: String,
}

impl AnnotateRequest {
    /// Full-document text detection for a single image fetched by URL.
    pub fn document_text(image_uri: &str) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                features: vec![Feature {
                    kind: FeatureType::DocumentTextDetection,
                }],
                image: ImageRef {
                    source: ImageSource {
                        image_uri: image_uri.to_string(),
                    },
                },
            }],
        }
    }
}

/// Top-level `images:annotate` reply, exactly as the service sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

/// Annotations for one image of the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub text_annotations: Vec<TextAnnotation>,
    /// Set instead of annotations when this image failed on the service side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

/// Vision omits a coordinate when it is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// A recognition result known to hold at least one annotation set with
/// at least one annotation. The first annotation of the first set is the
/// full-page transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrResponse {
    raw: AnnotateResponse,
}

impl OcrResponse {
    /// Validate a decoded reply.
    pub fn from_wire(raw: AnnotateResponse) -> Result<Self, RecognitionError> {
        let first = raw
            .responses
            .first()
            .ok_or_else(|| RecognitionError::Malformed("reply has no responses".to_string()))?;

        if let Some(status) = &first.error {
            return Err(RecognitionError::Service {
                code: status.code,
                message: status.message.clone(),
            });
        }

        if first.text_annotations.is_empty() {
            return Err(RecognitionError::NoText);
        }

        Ok(Self { raw })
    }

    /// Decode and validate a JSON reply body.
    pub fn parse(body: &str) -> Result<Self, RecognitionError> {
        let raw: AnnotateResponse = serde_json::from_str(body)
            .map_err(|e| RecognitionError::Malformed(e.to_string()))?;
        Self::from_wire(raw)
    }

    /// Full-page transcription (`responses[0].textAnnotations[0].description`).
    pub fn transcription(&self) -> &str {
        // from_wire guarantees both indices exist.
        &self.raw.responses[0].text_annotations[0].description
    }

    /// Word/line annotations following the full-page entry.
    pub fn segments(&self) -> &[TextAnnotation] {
        &self.raw.responses[0].text_annotations[1..]
    }

    /// Detected locale of the transcription, when the service reports one.
    pub fn locale(&self) -> Option<&str> {
        self.raw.responses[0].text_annotations[0].locale.as_deref()
    }

    pub fn as_wire(&self) -> &AnnotateResponse {
        &self.raw
    }
}
