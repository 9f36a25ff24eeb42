//! HTTP request handlers.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use super::error::ApiError;
use super::AppState;
use crate::extract::{classify, extract_contacts, ContactFields, EntityBucket, WANTED_ENTITY_TYPES};

/// Multipart field carrying the card image.
pub const IMAGE_FIELD: &str = "image";
/// Multipart field carrying the voice note.
pub const AUDIO_FIELD: &str = "audio";

/// A file pulled out of a multipart request.
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Contact fields and entity buckets merged into one object.
#[derive(Debug, Serialize)]
pub struct InterpretResponse {
    #[serde(flatten)]
    pub contacts: ContactFields,
    #[serde(flatten)]
    pub entities: EntityBucket,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub text: String,
}

/// Read the first multipart field named `name`, skipping any others.
pub async fn read_upload(
    multipart: &mut Multipart,
    name: &'static str,
) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.body_text()))?
    {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.body_text()))?;
        return Ok(Upload { file_name, bytes });
    }
    Err(ApiError::UploadMissing(name))
}

/// Root greeting.
pub async fn hello() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Hello world" }))
}

/// Liveness probe.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// OCR an uploaded card image and pull out contact fields and entities.
pub async fn interpret_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<InterpretResponse>, ApiError> {
    let upload = read_upload(&mut multipart, IMAGE_FIELD).await?;
    let stored = state
        .uploads
        .store(&upload.bytes, upload.file_name.as_deref())
        .await?;
    debug!(
        "Interpreting {} ({} bytes)",
        stored.original_name().unwrap_or("<unnamed>"),
        upload.bytes.len()
    );

    let transcript = state.text_detector.detect_text(&upload.bytes).await?;

    // Nothing to analyze; buckets stay empty
    let entities = if transcript.trim().is_empty() {
        Vec::new()
    } else {
        state.entity_analyzer.analyze_entities(&transcript).await?
    };

    let contacts = extract_contacts(&transcript);
    let entities = classify(&entities, &WANTED_ENTITY_TYPES);

    info!(
        "Interpreted image: {} chars, {} email, {} phone, {} site, {} entities",
        transcript.len(),
        contacts.email.len(),
        contacts.phone.len(),
        contacts.site.len(),
        entities.total()
    );

    Ok(Json(InterpretResponse { contacts, entities }))
}

/// Transcribe an uploaded voice note.
pub async fn convert_voice_to_text(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let upload = read_upload(&mut multipart, AUDIO_FIELD).await?;
    let stored = state
        .uploads
        .store(&upload.bytes, upload.file_name.as_deref())
        .await?;
    debug!(
        "Transcribing {} ({} bytes)",
        stored.original_name().unwrap_or("<unnamed>"),
        upload.bytes.len()
    );

    let converted = state.transcoder.to_mono_pcm(stored.path()).await?;
    let audio = tokio::fs::read(&converted).await?;

    let text = state
        .speech
        .transcribe(&audio, state.speech_timeout)
        .await?;

    info!("Transcribed voice note: {} chars", text.len());
    Ok(Json(TranscriptResponse { text }))
}
