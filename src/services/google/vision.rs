//! Google Cloud Vision text detection.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{ErrorStatus, GoogleApi};
use crate::services::{ServiceError, TextDetector};

const SERVICE: &str = "vision";
const ANNOTATE_PATH: &str = "v1/images:annotate";

/// Vision API client requesting `TEXT_DETECTION`.
pub struct VisionClient {
    api: GoogleApi,
}

#[derive(Debug, Serialize)]
struct BatchAnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: Image,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct Image {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct BatchAnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateImageResponse {
    #[serde(default, rename = "textAnnotations")]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ErrorStatus>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

impl VisionClient {
    pub fn new(api: GoogleApi) -> Self {
        Self { api }
    }
}

/// The first text annotation holds the full-page transcript; later ones are
/// individual words.
fn full_page_transcript(response: BatchAnnotateResponse) -> Result<String, ServiceError> {
    let Some(image) = response.responses.into_iter().next() else {
        return Ok(String::new());
    };

    if let Some(error) = image.error {
        return Err(ServiceError::Api {
            service: SERVICE,
            status: None,
            message: error.message,
        });
    }

    Ok(image
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description)
        .unwrap_or_default())
}

#[async_trait]
impl TextDetector for VisionClient {
    fn is_available(&self) -> bool {
        self.api.is_configured()
    }

    fn availability_hint(&self) -> String {
        if self.api.is_configured() {
            format!("Cloud Vision is available ({})", self.api.endpoint())
        } else {
            "Cloud Vision needs GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN".to_string()
        }
    }

    async fn detect_text(&self, image: &[u8]) -> Result<String, ServiceError> {
        let request = BatchAnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: Image {
                    content: base64::engine::general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION",
                }],
            }],
        };

        let response: BatchAnnotateResponse =
            self.api.post_json(SERVICE, ANNOTATE_PATH, &request).await?;
        full_page_transcript(response)
    }
}
