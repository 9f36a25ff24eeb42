//! Audio transcoding via the ffmpeg command line.
//!
//! Speech recognition expects mono 16-bit linear PCM, so every upload is
//! converted before it is sent. ffmpeg detects the input container itself.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{AudioTranscoder, TranscodeError};

/// Sample rate of the converted audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Stderr lines kept when ffmpeg fails.
const MAX_STDERR_LINES: usize = 5;

/// ffmpeg-backed transcoder.
pub struct FfmpegTranscoder {
    binary: PathBuf,
    sample_rate: u32,
}

impl FfmpegTranscoder {
    /// Use `ffmpeg` from PATH.
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Output path for `input`: `<stem>-mono.wav` in the same directory.
    pub fn output_path(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        input.with_file_name(format!("{}-mono.wav", stem))
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            format!("ffmpeg is available ({})", self.binary.display())
        } else {
            "ffmpeg not installed. Install with: apt install ffmpeg (or set FFMPEG_PATH)"
                .to_string()
        }
    }

    async fn to_mono_pcm(&self, input: &Path) -> Result<PathBuf, TranscodeError> {
        let start = Instant::now();
        let output_path = Self::output_path(input);
        let sample_rate = self.sample_rate.to_string();

        let output = Command::new(&self.binary)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-ac", "1", "-ar", &sample_rate, "-acodec", "pcm_s16le"])
            .arg(&output_path)
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                debug!(
                    "Transcoded {} in {:?}",
                    input.display(),
                    start.elapsed()
                );
                Ok(output_path)
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let summary: Vec<&str> = stderr.lines().take(MAX_STDERR_LINES).collect();
                Err(TranscodeError::Failed(format!(
                    "ffmpeg exited with {}: {}",
                    output.status,
                    summary.join("; ")
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TranscodeError::BinaryNotFound(format!(
                    "{} not found (install ffmpeg)",
                    self.binary.display()
                )))
            }
            Err(e) => Err(TranscodeError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_sits_beside_input() {
        assert_eq!(
            FfmpegTranscoder::output_path(Path::new("/tmp/up/abc.m4a")),
            PathBuf::from("/tmp/up/abc-mono.wav")
        );
        assert_eq!(
            FfmpegTranscoder::output_path(Path::new("/tmp/up/voice")),
            PathBuf::from("/tmp/up/voice-mono.wav")
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let transcoder = FfmpegTranscoder::with_binary("/nonexistent/ffmpeg-cardscan");
        assert!(!transcoder.is_available());
        assert!(transcoder.availability_hint().contains("not installed"));

        let err = transcoder
            .to_mono_pcm(Path::new("/tmp/whatever.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::BinaryNotFound(_)));
    }
}
