//! External recognition collaborators.
//!
//! Each collaborator sits behind an async trait so handlers can be driven
//! by the Google Cloud clients in production and by fakes in tests:
//! - `TextDetector`: OCR on an uploaded image
//! - `EntityAnalyzer`: named entity analysis of a transcript
//! - `SpeechRecognizer`: long-running speech-to-text
//! - `AudioTranscoder`: conversion to mono 16-bit linear PCM

mod error;
pub mod google;
pub mod transcode;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::extract::Entity;

pub use error::{ServiceError, TranscodeError};
pub use google::{GoogleApi, GoogleAuth, LanguageClient, SpeechClient, SpeechOptions, VisionClient};
pub use transcode::FfmpegTranscoder;

/// OCR over a whole image.
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Check if the detector can be called (credentials present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this detector available.
    fn availability_hint(&self) -> String;

    /// Full-page transcript of the image; empty when no text was found.
    async fn detect_text(&self, image: &[u8]) -> Result<String, ServiceError>;
}

/// Named entity analysis over plain text.
#[async_trait]
pub trait EntityAnalyzer: Send + Sync {
    fn is_available(&self) -> bool;

    fn availability_hint(&self) -> String;

    /// Entities in the order the service reports them.
    async fn analyze_entities(&self, text: &str) -> Result<Vec<Entity>, ServiceError>;
}

/// Long-running speech recognition.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    fn is_available(&self) -> bool;

    fn availability_hint(&self) -> String;

    /// Transcribe LINEAR16 audio, giving up once `wait` has elapsed.
    async fn transcribe(&self, audio: &[u8], wait: Duration) -> Result<String, ServiceError>;
}

/// Audio format conversion.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    fn is_available(&self) -> bool;

    fn availability_hint(&self) -> String;

    /// Convert `input` to a mono 16-bit PCM WAV file next to it and return
    /// the new path.
    async fn to_mono_pcm(&self, input: &Path) -> Result<PathBuf, TranscodeError>;
}
