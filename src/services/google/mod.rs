//! Google Cloud REST clients (Vision, Natural Language, Speech).
//!
//! All three share one `GoogleApi` wrapper: a configured `reqwest::Client`,
//! the service endpoint and the credentials. Requests are authenticated with
//! an API key (`x-goog-api-key` header), a bearer access token, or both.

mod language;
mod speech;
mod vision;

pub use language::LanguageClient;
pub use speech::{
    join_transcripts, RecognitionAlternative, RecognitionResult, SpeechClient, SpeechOptions,
};
pub use vision::VisionClient;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ServiceError;

/// User agent sent with every API request.
pub const USER_AGENT: &str = concat!("cardscan/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API key. Kept out of the URL so it never shows up in
/// transport errors or logs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest slice of a non-JSON error body kept in an error message.
const MAX_ERROR_BODY: usize = 300;

/// Credentials for Google Cloud APIs.
#[derive(Debug, Clone, Default)]
pub struct GoogleAuth {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

impl GoogleAuth {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() || self.access_token.is_some()
    }
}

/// Shared HTTP plumbing for one Google Cloud service endpoint.
#[derive(Clone)]
pub struct GoogleApi {
    client: Client,
    endpoint: String,
    auth: GoogleAuth,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorStatus,
}

/// `google.rpc.Status` as it appears in REST responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl GoogleApi {
    /// Create a client for `endpoint` (e.g. `https://vision.googleapis.com`).
    pub fn new(
        endpoint: impl Into<String>,
        auth: GoogleAuth,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.auth.is_configured()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(
        &self,
        service: &'static str,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, ServiceError> {
        if !self.auth.is_configured() {
            return Err(ServiceError::NotConfigured { service });
        }

        let url = format!("{}/{}", self.endpoint, path.trim_start_matches('/'));
        debug!("{} {} {}", service, method, url);

        let mut request = self.client.request(method, url);
        if let Some(ref key) = self.auth.api_key {
            request = request.header(API_KEY_HEADER, key.as_str());
        }
        if let Some(ref token) = self.auth.access_token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B, R>(
        &self,
        service: &'static str,
        path: &str,
        body: &B,
    ) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .request(service, Method::POST, path)?
            .json(body)
            .send()
            .await?;
        read_json(service, response).await
    }

    /// GET a resource and decode the JSON response.
    pub async fn get_json<R>(&self, service: &'static str, path: &str) -> Result<R, ServiceError>
    where
        R: DeserializeOwned,
    {
        let response = self.request(service, Method::GET, path)?.send().await?;
        read_json(service, response).await
    }
}

async fn read_json<R: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<R, ServiceError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
            _ => body.chars().take(MAX_ERROR_BODY).collect(),
        };
        return Err(ServiceError::Api {
            service,
            status: Some(status.as_u16()),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse {
        service,
        detail: e.to_string(),
    })
}
