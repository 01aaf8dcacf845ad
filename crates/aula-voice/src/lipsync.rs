use crate::error::VoiceError;
use crate::process::run_tool;
use crate::transcode::AudioTranscoder;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Produces a viseme timing document from a WAV file.
#[async_trait]
pub trait VisemeAnalyzer: Send + Sync {
    /// Analyzes `wav` and writes the JSON timing document to `output`,
    /// replacing any existing file.
    async fn analyze(&self, wav: &Path, output: &Path) -> Result<(), VoiceError>;
}

/// Analyzer backed by Rhubarb Lip Sync in phonetic mode.
#[derive(Debug, Clone)]
pub struct RhubarbAnalyzer {
    binary: PathBuf,
    timeout: Duration,
}

impl RhubarbAnalyzer {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl VisemeAnalyzer for RhubarbAnalyzer {
    async fn analyze(&self, wav: &Path, output: &Path) -> Result<(), VoiceError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-f")
            .arg("json")
            .arg("-o")
            .arg(output)
            .arg(wav)
            .arg("-r")
            .arg("phonetic");

        run_tool("rhubarb", command, self.timeout)
            .await
            .map_err(VoiceError::LipSync)?;
        Ok(())
    }
}

/// Runs the transcode → analyze chain for one synthesized message.
///
/// Analysis never starts before transcoding has finished and its output
/// exists. Stale outputs are removed first so a tool that exits cleanly
/// without writing anything is caught.
#[derive(Clone)]
pub struct LipSyncGenerator {
    transcoder: Arc<dyn AudioTranscoder>,
    analyzer: Arc<dyn VisemeAnalyzer>,
}

impl LipSyncGenerator {
    pub fn new(transcoder: Arc<dyn AudioTranscoder>, analyzer: Arc<dyn VisemeAnalyzer>) -> Self {
        Self {
            transcoder,
            analyzer,
        }
    }

    /// Transcodes `audio` to `wav`, then writes the timing document for
    /// `wav` to `timing`.
    pub async fn generate(&self, audio: &Path, wav: &Path, timing: &Path) -> Result<(), VoiceError> {
        let started = Instant::now();

        remove_stale(wav).await?;
        self.transcoder.transcode(audio, wav).await?;
        if !exists(wav).await {
            return Err(VoiceError::Transcode(format!(
                "transcoder produced no output at {}",
                wav.display()
            )));
        }
        tracing::debug!(
            path = %wav.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "conversion done"
        );

        remove_stale(timing).await?;
        self.analyzer.analyze(wav, timing).await?;
        if !exists(timing).await {
            return Err(VoiceError::LipSync(format!(
                "analyzer produced no output at {}",
                timing.display()
            )));
        }
        tracing::info!(
            path = %timing.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "lip sync done"
        );
        Ok(())
    }
}

impl std::fmt::Debug for LipSyncGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LipSyncGenerator")
            .field("transcoder", &"Arc<dyn AudioTranscoder>")
            .field("analyzer", &"Arc<dyn VisemeAnalyzer>")
            .finish()
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn remove_stale(path: &Path) -> Result<(), VoiceError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(VoiceError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
