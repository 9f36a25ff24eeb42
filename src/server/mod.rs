//! HTTP server for card interpretation and voice transcription.
//!
//! Provides:
//! - `POST /interpret`: OCR a card image, extract contact fields and entities
//! - `POST /convert-voice-to-text`: transcribe a voice note
//! - `GET /` and `GET /health`

mod error;
mod handlers;
mod routes;
mod upload;

pub use error::{ApiError, ErrorBody, ErrorDetail};
pub use handlers::{InterpretResponse, TranscriptResponse, AUDIO_FIELD, IMAGE_FIELD};
pub use routes::create_router;
pub use upload::{sanitized_extension, StoredUpload, UploadStore};

use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::services::{
    AudioTranscoder, EntityAnalyzer, FfmpegTranscoder, LanguageClient, SpeechClient,
    SpeechRecognizer, TextDetector, VisionClient,
};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub text_detector: Arc<dyn TextDetector>,
    pub entity_analyzer: Arc<dyn EntityAnalyzer>,
    pub speech: Arc<dyn SpeechRecognizer>,
    pub transcoder: Arc<dyn AudioTranscoder>,
    pub uploads: Arc<UploadStore>,
    /// Wait bound handed to speech recognition.
    pub speech_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build the production collaborators from settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let vision = VisionClient::new(settings.google_api(&settings.vision_endpoint)?);
        let language = LanguageClient::new(settings.google_api(&settings.language_endpoint)?);
        let speech = SpeechClient::with_options(
            settings.google_api(&settings.speech_endpoint)?,
            settings.speech_options(),
        );
        let transcoder = FfmpegTranscoder::with_binary(&settings.ffmpeg_path);

        Ok(Self {
            text_detector: Arc::new(vision),
            entity_analyzer: Arc::new(language),
            speech: Arc::new(speech),
            transcoder: Arc::new(transcoder),
            uploads: Arc::new(UploadStore::new(&settings.uploads_dir)),
            speech_timeout: settings.speech_timeout,
            max_upload_bytes: settings.max_upload_bytes,
        })
    }

    /// Collaborators that cannot currently be used, with hints.
    pub fn unavailable(&self) -> Vec<String> {
        let checks = [
            (self.text_detector.is_available(), self.text_detector.availability_hint()),
            (self.entity_analyzer.is_available(), self.entity_analyzer.availability_hint()),
            (self.speech.is_available(), self.speech.availability_hint()),
            (self.transcoder.is_available(), self.transcoder.availability_hint()),
        ];
        checks
            .into_iter()
            .filter(|(available, _)| !available)
            .map(|(_, hint)| hint)
            .collect()
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_uploads_dir()?;
    let state = AppState::from_settings(settings)?;
    for hint in state.unavailable() {
        tracing::warn!("{}", hint);
    }
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
