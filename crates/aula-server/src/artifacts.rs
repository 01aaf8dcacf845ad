//! Per-request artifact files.
//!
//! Every `/chat` request that synthesizes speech gets its own directory under
//! `{audio_dir}/requests/`, so concurrent requests never share file names.

use crate::pipeline::ChatError;
use base64::Engine;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File paths produced for one message of a reply.
#[derive(Debug, Clone)]
pub struct MessageArtifacts {
    pub audio: PathBuf,
    pub wav: PathBuf,
    pub timing: PathBuf,
}

/// A scratch directory owned by one request.
///
/// The directory is deleted by [`RequestWorkspace::remove`], or on drop if the
/// request never got that far (a cancelled or panicking request).
#[derive(Debug)]
pub struct RequestWorkspace {
    root: PathBuf,
    removed: bool,
}

impl RequestWorkspace {
    /// Creates `{audio_dir}/requests/{uuid}`.
    pub async fn create(audio_dir: &Path) -> Result<Self, ChatError> {
        let root = audio_dir.join("requests").join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| ChatError::Workspace {
                path: root.clone(),
                source,
            })?;
        Ok(Self {
            root,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Paths for the `index`-th message: `message_{index}.mp3|wav|json`.
    pub fn message(&self, index: usize) -> MessageArtifacts {
        let stem = format!("message_{}", index);
        MessageArtifacts {
            audio: self.root.join(format!("{stem}.mp3")),
            wav: self.root.join(format!("{stem}.wav")),
            timing: self.root.join(format!("{stem}.json")),
        }
    }

    /// Deletes the directory and everything in it. Failures are logged and
    /// otherwise ignored.
    pub async fn remove(mut self) {
        self.removed = true;
        if let Err(e) = tokio::fs::remove_dir_all(&self.root).await {
            log_removal_failure(&self.root, &e);
        }
    }
}

impl Drop for RequestWorkspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => tracing::debug!(
                path = %self.root.display(),
                "request artifacts removed on drop"
            ),
            Err(e) => log_removal_failure(&self.root, &e),
        }
    }
}

fn log_removal_failure(path: &Path, error: &std::io::Error) {
    if error.kind() != std::io::ErrorKind::NotFound {
        tracing::warn!(
            path = %path.display(),
            error = %error,
            "failed to remove request artifacts"
        );
    }
}

/// Reads an audio file and returns its bytes as standard base64.
pub async fn read_audio_base64(path: &Path) -> Result<String, ChatError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ChatError::Artifact {
            path: path.to_path_buf(),
            source,
        })?;
    if bytes.is_empty() {
        return Err(ChatError::ArtifactFormat {
            path: path.to_path_buf(),
            reason: "audio file is empty".to_string(),
        });
    }
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Reads and parses a viseme timing document.
pub async fn read_timing(path: &Path) -> Result<serde_json::Value, ChatError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ChatError::Artifact {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&contents).map_err(|e| ChatError::ArtifactFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn workspaces_are_distinct_and_removable() {
        let dir = tempfile::tempdir().unwrap();
        let first = RequestWorkspace::create(dir.path()).await.unwrap();
        let second = RequestWorkspace::create(dir.path()).await.unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().starts_with(dir.path().join("requests")));

        let paths = first.message(2);
        assert_eq!(paths.audio.file_name().unwrap(), "message_2.mp3");
        assert_eq!(paths.wav.file_name().unwrap(), "message_2.wav");
        assert_eq!(paths.timing.file_name().unwrap(), "message_2.json");

        std::fs::write(&paths.audio, b"ID3").unwrap();
        let root = first.path().to_path_buf();
        first.remove().await;
        assert!(!root.exists());
        assert!(second.path().exists());
    }

    #[tokio::test]
    async fn dropped_workspace_is_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = RequestWorkspace::create(dir.path()).await.unwrap();
        std::fs::write(workspace.message(0).audio, b"ID3").unwrap();
        let root = workspace.path().to_path_buf();

        drop(workspace);

        assert!(!root.exists());
    }

    #[tokio::test]
    async fn audio_is_base64_encoded_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        std::fs::write(&path, [0xFFu8, 0xFB, 0x90, 0x00]).unwrap();

        let encoded = read_audio_base64(&path).await.unwrap();
        assert_eq!(encoded, "//uQAA==");
    }

    #[tokio::test]
    async fn empty_audio_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        std::fs::write(&path, b"").unwrap();

        let err = read_audio_base64(&path).await.unwrap_err();
        assert!(matches!(err, ChatError::ArtifactFormat { .. }));
    }

    #[tokio::test]
    async fn timing_must_be_json() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, r#"{"mouthCues":[{"start":0.0,"end":0.1,"value":"X"}]}"#).unwrap();
        std::fs::write(&bad, "not json").unwrap();

        let timing = read_timing(&good).await.unwrap();
        assert_eq!(timing["mouthCues"][0]["value"], "X");

        assert!(matches!(
            read_timing(&bad).await,
            Err(ChatError::ArtifactFormat { .. })
        ));
        assert!(matches!(
            read_timing(&dir.path().join("missing.json")).await,
            Err(ChatError::Artifact { .. })
        ));
    }
}
