//! Configuration management for cardscan using the prefer crate.
//!
//! Settings are resolved once at startup from (lowest to highest priority):
//! built-in defaults, a config file, environment variables, and command-line
//! flags. The resulting `Settings` is handed to the server and never mutated
//! afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::{GoogleApi, GoogleAuth, ServiceError, SpeechOptions};

/// Name used for config file discovery.
pub const CONFIG_NAME: &str = "cardscan";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com";
pub const DEFAULT_LANGUAGE_ENDPOINT: &str = "https://language.googleapis.com";
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://speech.googleapis.com";

/// Upload size limit (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse JSON config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid bind address '{0}'")]
    InvalidBind(String),

    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Directory holding per-request upload scratch space.
    pub uploads_dir: PathBuf,
    /// Google Cloud API key.
    pub google_api_key: Option<String>,
    /// OAuth access token, sent as a bearer token.
    pub google_access_token: Option<String>,
    pub vision_endpoint: String,
    pub language_endpoint: String,
    pub speech_endpoint: String,
    /// Per-request HTTP timeout for the cloud APIs.
    pub request_timeout: Duration,
    /// Upper bound on waiting for long-running speech recognition.
    pub speech_timeout: Duration,
    /// Delay between speech operation polls.
    pub speech_poll_interval: Duration,
    pub speech_language: String,
    pub speech_alternative_languages: Vec<String>,
    pub speech_automatic_punctuation: bool,
    /// ffmpeg binary (name on PATH or a path).
    pub ffmpeg_path: PathBuf,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            google_api_key: None,
            google_access_token: None,
            vision_endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            language_endpoint: DEFAULT_LANGUAGE_ENDPOINT.to_string(),
            speech_endpoint: DEFAULT_SPEECH_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(60),
            speech_timeout: Duration::from_secs(300),
            speech_poll_interval: Duration::from_millis(2000),
            speech_language: "en-US".to_string(),
            speech_alternative_languages: vec!["th-TH".to_string(), "ar-DZ".to_string()],
            speech_automatic_punctuation: true,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Settings {
    /// Create the uploads directory if it does not exist.
    pub fn ensure_uploads_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.uploads_dir)
    }

    pub fn google_auth(&self) -> GoogleAuth {
        GoogleAuth {
            api_key: self.google_api_key.clone(),
            access_token: self.google_access_token.clone(),
        }
    }

    /// HTTP plumbing for one Google endpoint.
    pub fn google_api(&self, endpoint: &str) -> Result<GoogleApi, ServiceError> {
        GoogleApi::new(endpoint, self.google_auth(), self.request_timeout)
    }

    pub fn speech_options(&self) -> SpeechOptions {
        SpeechOptions {
            language_code: self.speech_language.clone(),
            alternative_language_codes: self.speech_alternative_languages.clone(),
            automatic_punctuation: self.speech_automatic_punctuation,
            poll_interval: self.speech_poll_interval,
        }
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides using `lookup` to read variables.
    /// Empty values are treated as unset.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("SERVER_URL") {
            self.host = host;
        }
        if let Some(port) = get("SERVER_PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "SERVER_PORT",
                value: port,
            })?;
        }
        if let Some(dir) = get("UPLOADS_DIR") {
            self.uploads_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        }
        if let Some(key) = get("GOOGLE_API_KEY") {
            self.google_api_key = Some(key);
        }
        if let Some(token) = get("GOOGLE_ACCESS_TOKEN") {
            self.google_access_token = Some(token);
        }
        if let Some(ffmpeg) = get("FFMPEG_PATH") {
            self.ffmpeg_path = PathBuf::from(shellexpand::tilde(&ffmpeg).as_ref());
        }
        if let Some(secs) = get("SPEECH_TIMEOUT_SECS") {
            let parsed: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "SPEECH_TIMEOUT_SECS",
                value: secs,
            })?;
            self.speech_timeout = Duration::from_secs(parsed);
        }
        Ok(())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Uploads directory, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploads_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_poll_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_alternative_languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_automatic_punctuation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no file is found or it cannot be parsed.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("{}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// `.toml` files are parsed as TOML, everything else as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            _ => serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref host) = self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(ref dir) = self.uploads_dir {
            settings.uploads_dir = self.resolve_path(dir, base_dir);
        }
        if let Some(ref key) = self.google_api_key {
            settings.google_api_key = Some(key.clone());
        }
        if let Some(ref token) = self.google_access_token {
            settings.google_access_token = Some(token.clone());
        }
        if let Some(ref endpoint) = self.vision_endpoint {
            settings.vision_endpoint = endpoint.clone();
        }
        if let Some(ref endpoint) = self.language_endpoint {
            settings.language_endpoint = endpoint.clone();
        }
        if let Some(ref endpoint) = self.speech_endpoint {
            settings.speech_endpoint = endpoint.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.speech_timeout_secs {
            settings.speech_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.speech_poll_interval_ms {
            settings.speech_poll_interval = Duration::from_millis(ms);
        }
        if let Some(ref language) = self.speech_language {
            settings.speech_language = language.clone();
        }
        if let Some(ref languages) = self.speech_alternative_languages {
            settings.speech_alternative_languages = languages.clone();
        }
        if let Some(punctuation) = self.speech_automatic_punctuation {
            settings.speech_automatic_punctuation = punctuation;
        }
        if let Some(ref ffmpeg) = self.ffmpeg_path {
            // Bare names are looked up on PATH; only paths are resolved.
            settings.ffmpeg_path = if ffmpeg.contains('/') || ffmpeg.starts_with('~') {
                self.resolve_path(ffmpeg, base_dir)
            } else {
                PathBuf::from(ffmpeg)
            };
        }
        if let Some(limit) = self.max_upload_bytes {
            settings.max_upload_bytes = limit;
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (--config).
    pub config_path: Option<PathBuf>,
    /// Bind address override (--bind).
    pub bind: Option<String>,
}

/// Parse a bind address string into (host, port).
/// Supports formats: "port", "host", "host:port"
pub fn parse_bind_address(bind: &str, default_port: u16) -> Result<(String, u16), ConfigError> {
    let bind = bind.trim();
    if bind.is_empty() {
        return Err(ConfigError::InvalidBind(bind.to_string()));
    }

    // Just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok((DEFAULT_HOST.to_string(), port));
    }

    // host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if !host.is_empty() && !host.contains(':') {
            let port = port_str
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidBind(bind.to_string()))?;
            return Ok((host.to_string(), port));
        }
        return Err(ConfigError::InvalidBind(bind.to_string()));
    }

    // Just a host
    Ok((bind.to_string(), default_port))
}

/// Load settings: config file, then environment, then flags.
pub async fn load_settings(options: LoadOptions) -> Result<Settings, ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env()?;

    if let Some(ref bind) = options.bind {
        let (host, port) = parse_bind_address(bind, settings.port)?;
        settings.host = host;
        settings.port = port;
    }

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    Ok(settings)
}
