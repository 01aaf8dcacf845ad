use crate::error::VoiceError;
use crate::process::run_tool;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Converts synthesized audio into the waveform format the lip-sync
/// analyzer reads.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Transcodes `input` into a WAV file at `output`, replacing any
    /// existing file.
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), VoiceError>;
}

/// Transcoder backed by the `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg(output);

        run_tool("ffmpeg", command, self.timeout)
            .await
            .map_err(VoiceError::Transcode)?;
        Ok(())
    }
}
