//! Google Cloud Speech-to-Text long-running recognition.
//!
//! Recognition is submitted with `speech:longrunningrecognize` and the
//! returned operation is polled until done. The caller supplies the wait
//! bound; dropping the future stops polling.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ErrorStatus, GoogleApi};
use crate::services::{ServiceError, SpeechRecognizer};

const SERVICE: &str = "speech";
const RECOGNIZE_PATH: &str = "v1p1beta1/speech:longrunningrecognize";
const OPERATIONS_PATH: &str = "v1p1beta1/operations";

/// Recognition settings sent with every request.
#[derive(Debug, Clone)]
pub struct SpeechOptions {
    /// Primary BCP-47 language code.
    pub language_code: String,
    /// Additional languages the service may detect.
    pub alternative_language_codes: Vec<String>,
    pub automatic_punctuation: bool,
    /// Delay between operation status checks.
    pub poll_interval: Duration,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            alternative_language_codes: vec!["th-TH".to_string(), "ar-DZ".to_string()],
            automatic_punctuation: true,
            poll_interval: Duration::from_millis(2000),
        }
    }
}

/// Speech-to-Text client (v1p1beta1, LINEAR16 audio).
pub struct SpeechClient {
    api: GoogleApi,
    options: SpeechOptions,
}

#[derive(Debug, Serialize)]
struct LongRunningRecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'static str,
    language_code: &'a str,
    #[serde(skip_serializing_if = "no_codes")]
    alternative_language_codes: &'a [String],
    enable_automatic_punctuation: bool,
}

fn no_codes(codes: &&[String]) -> bool {
    codes.is_empty()
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct Operation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<ErrorStatus>,
    response: Option<RecognizeResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

/// One recognized segment of the audio.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RecognitionAlternative {
    #[serde(default)]
    pub transcript: String,
}

/// Concatenate the top alternative of every segment, in order, with no
/// separator.
pub fn join_transcripts(results: &[RecognitionResult]) -> String {
    results
        .iter()
        .filter_map(|result| result.alternatives.first())
        .map(|alternative| alternative.transcript.as_str())
        .collect()
}

impl SpeechClient {
    pub fn new(api: GoogleApi) -> Self {
        Self::with_options(api, SpeechOptions::default())
    }

    pub fn with_options(api: GoogleApi, options: SpeechOptions) -> Self {
        Self { api, options }
    }

    fn request<'a>(&'a self, audio: &[u8]) -> LongRunningRecognizeRequest<'a> {
        LongRunningRecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                language_code: &self.options.language_code,
                alternative_language_codes: &self.options.alternative_language_codes,
                enable_automatic_punctuation: self.options.automatic_punctuation,
            },
            audio: RecognitionAudio {
                content: base64::engine::general_purpose::STANDARD.encode(audio),
            },
        }
    }

    /// Poll `operation` until it reports done.
    async fn wait_for(&self, mut operation: Operation) -> Result<RecognizeResponse, ServiceError> {
        loop {
            if operation.done {
                if let Some(error) = operation.error {
                    return Err(ServiceError::Api {
                        service: SERVICE,
                        status: None,
                        message: format!(
                            "operation failed (code {}): {}",
                            error.code, error.message
                        ),
                    });
                }
                return Ok(operation.response.unwrap_or_default());
            }

            if operation.name.is_empty() {
                return Err(ServiceError::InvalidResponse {
                    service: SERVICE,
                    detail: "operation has no name and is not done".to_string(),
                });
            }

            tokio::time::sleep(self.options.poll_interval).await;
            debug!("Polling speech operation {}", operation.name);
            let path = format!("{}/{}", OPERATIONS_PATH, operation.name);
            operation = self.api.get_json(SERVICE, &path).await?;
        }
    }
}

#[async_trait]
impl SpeechRecognizer for SpeechClient {
    fn is_available(&self) -> bool {
        self.api.is_configured()
    }

    fn availability_hint(&self) -> String {
        if self.api.is_configured() {
            format!(
                "Cloud Speech-to-Text is available ({}, language {})",
                self.api.endpoint(),
                self.options.language_code
            )
        } else {
            "Cloud Speech-to-Text needs GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN".to_string()
        }
    }

    async fn transcribe(&self, audio: &[u8], wait: Duration) -> Result<String, ServiceError> {
        let start = Instant::now();
        let operation: Operation = self
            .api
            .post_json(SERVICE, RECOGNIZE_PATH, &self.request(audio))
            .await?;

        let response = tokio::time::timeout(wait, self.wait_for(operation))
            .await
            .map_err(|_| ServiceError::Timeout {
                service: SERVICE,
                waited: wait,
            })??;

        info!(
            "Speech recognition finished: {} segments in {:?}",
            response.results.len(),
            start.elapsed()
        );
        Ok(join_transcripts(&response.results))
    }
}
