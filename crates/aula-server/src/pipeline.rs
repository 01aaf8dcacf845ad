//! The `/chat` pipeline: resolve, generate, synthesize, lip-sync, assemble.

use crate::artifacts::{read_audio_base64, read_timing, RequestWorkspace};
use crate::canned::{self, INTRO, MISSING_KEYS};
use aula_agent::{build_prompt, AgentError, ResponseGenerator};
use aula_directory::KnowledgeBase;
use aula_types::{ChatMessage, Directory, DraftMessage};
use aula_voice::{LipSyncGenerator, SpeechSynthesizer, VoiceError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Failures that abort a `/chat` request.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Model(#[from] AgentError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error("failed to read artifact {path:?}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact {path:?} is unusable: {reason}")]
    ArtifactFormat { path: PathBuf, reason: String },

    #[error("failed to create request directory {path:?}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything one `/chat` request needs. Shared read-only between requests.
pub struct ChatPipeline {
    pub directory: Arc<Directory>,
    pub knowledge: Arc<KnowledgeBase>,
    /// Characters of the knowledge base placed in the prompt.
    pub knowledge_budget: usize,
    /// `None` when the model credentials are missing.
    pub generator: Option<ResponseGenerator>,
    /// `None` when the speech credentials are missing.
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub lipsync: LipSyncGenerator,
    pub voice_id: String,
    /// Holds the canned recordings and the per-request directories.
    pub audio_dir: PathBuf,
}

impl ChatPipeline {
    /// Answers one chat message.
    ///
    /// A missing or blank message gets the intro reply; missing credentials
    /// get the configuration reminder. Otherwise every message of the model's
    /// reply is synthesized and lip-synced in order, one at a time.
    pub async fn respond(&self, message: Option<&str>) -> Result<Vec<ChatMessage>, ChatError> {
        let Some(query) = message.filter(|m| !m.trim().is_empty()) else {
            tracing::debug!("empty message, sending intro");
            return canned::load_all(&INTRO, &self.audio_dir).await;
        };

        let (Some(generator), Some(speech)) = (&self.generator, &self.speech) else {
            tracing::warn!("model or speech credentials missing, sending reminder");
            return canned::load_all(&MISSING_KEYS, &self.audio_dir).await;
        };

        let started = Instant::now();
        let resolution = aula_directory::resolve(&self.directory, query);
        if let Some(category) = resolution.category {
            tracing::debug!(
                category = category.as_str(),
                code = resolution.code.as_deref().unwrap_or("<none>"),
                "directory context resolved"
            );
        }

        let prompt = build_prompt(
            &self.directory,
            self.knowledge.snippet(self.knowledge_budget),
            query,
            &resolution.context,
        )?;
        let drafts = generator.generate(&prompt).await?;
        tracing::info!(
            messages = drafts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reply generated"
        );

        let workspace = RequestWorkspace::create(&self.audio_dir).await?;
        let result = self.render(speech.as_ref(), &workspace, drafts).await;
        workspace.remove().await;

        if result.is_ok() {
            tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "chat reply assembled"
            );
        }
        result
    }

    async fn render(
        &self,
        speech: &dyn SpeechSynthesizer,
        workspace: &RequestWorkspace,
        drafts: Vec<DraftMessage>,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        for (index, draft) in drafts.iter().enumerate() {
            let paths = workspace.message(index);
            speech
                .synthesize(&draft.text, &self.voice_id, &paths.audio)
                .await?;
            self.lipsync
                .generate(&paths.audio, &paths.wav, &paths.timing)
                .await?;
        }

        let mut messages = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let paths = workspace.message(index);
            let audio = read_audio_base64(&paths.audio).await?;
            let lipsync = read_timing(&paths.timing).await?;
            messages.push(draft.complete(audio, lipsync));
        }
        Ok(messages)
    }
}

impl std::fmt::Debug for ChatPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatPipeline")
            .field("directory_records", &self.directory.len())
            .field("knowledge_documents", &self.knowledge.document_count())
            .field("knowledge_budget", &self.knowledge_budget)
            .field("generator", &self.generator.is_some())
            .field("speech", &self.speech.is_some())
            .field("voice_id", &self.voice_id)
            .field("audio_dir", &self.audio_dir)
            .finish()
    }
}
