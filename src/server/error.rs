//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::extract::PatternError;
use crate::services::{ServiceError, TranscodeError};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing upload field `{0}`")]
    UploadMissing(&'static str),
    #[error("Invalid upload: {0}")]
    BadUpload(String),
    #[error("External service failed: {0}")]
    ExternalService(#[from] ServiceError),
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),
    #[error("Transcoding failed: {0}")]
    Transcode(#[from] TranscodeError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::UploadMissing(field) => (
                StatusCode::BAD_REQUEST,
                "UPLOAD_MISSING",
                format!("Multipart field `{field}` is required"),
            ),
            ApiError::BadUpload(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_UPLOAD", detail.clone())
            }
            ApiError::ExternalService(err) => {
                tracing::warn!(error = %err, "External service failed");
                let status = match err {
                    ServiceError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, "EXTERNAL_SERVICE", err.to_string())
            }
            ApiError::Pattern(err) => {
                tracing::error!(error = %err, "Pattern compilation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PATTERN",
                    "Text extraction failed".to_string(),
                )
            }
            ApiError::Transcode(err) => {
                tracing::error!(error = %err, "Audio transcoding failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TRANSCODE",
                    "Audio could not be converted".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn upload_missing_returns_400() {
        let response = ApiError::UploadMissing("image").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "UPLOAD_MISSING");
        assert!(json["error"]["message"].as_str().unwrap().contains("image"));
    }

    #[tokio::test]
    async fn bad_upload_returns_400() {
        let response = ApiError::BadUpload("truncated body".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn external_service_returns_502() {
        let err = ServiceError::Api {
            service: "vision",
            status: Some(403),
            message: "API key not valid".into(),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "EXTERNAL_SERVICE");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("API key not valid"));
    }

    #[tokio::test]
    async fn transport_failure_body_has_no_credentials() {
        use crate::services::{GoogleApi, GoogleAuth};

        let auth = GoogleAuth {
            api_key: Some("SECRET-KEY-123".into()),
            access_token: None,
        };
        let api = GoogleApi::new("http://127.0.0.1:9", auth, Duration::from_secs(2)).unwrap();
        let err = api
            .get_json::<serde_json::Value>("vision", "v1/x")
            .await
            .unwrap_err();

        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "EXTERNAL_SERVICE");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(!message.contains("SECRET-KEY-123"), "{message}");
        assert!(!message.contains("key="), "{message}");
    }

    #[tokio::test]
    async fn service_timeout_returns_504() {
        let err = ServiceError::Timeout {
            service: "speech",
            waited: Duration::from_secs(300),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn pattern_error_returns_500() {
        let err = crate::extract::remove_by_regex("x", "(").unwrap_err();
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PATTERN");
    }

    #[tokio::test]
    async fn transcode_hides_details() {
        let err = TranscodeError::Failed("ffmpeg exited with 1: /tmp/secret/path".into());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "TRANSCODE");
        assert!(!json["error"]["message"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
