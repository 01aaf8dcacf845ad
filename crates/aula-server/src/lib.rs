//! Aula server: an HTTP backend for a talking university assistant.
//!
//! `POST /chat` answers a question with up to three spoken messages, each
//! carrying base64 audio and viseme timing for the avatar's lip-sync.

pub mod api;
pub mod artifacts;
pub mod canned;
pub mod config;
pub mod pipeline;

use aula_agent::{OpenAiChatModel, ResponseGenerator};
use aula_directory::{DirectoryError, KnowledgeBase, KnowledgeError};
use aula_voice::{
    ElevenLabsSynthesizer, FfmpegTranscoder, LipSyncGenerator, RhubarbAnalyzer, SpeechSynthesizer,
};
use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Json, Router,
};
use config::Config;
use pipeline::ChatPipeline;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Debug)]
pub struct AppState {
    /// The chat pipeline and the clients it drives.
    pub pipeline: ChatPipeline,
    /// Directory served under `/formats`.
    pub formats_dir: PathBuf,
}

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load directory: {0}")]
    Directory(#[from] DirectoryError),

    #[error("failed to load knowledge base: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("failed to build model client: {0}")]
    Model(#[from] aula_agent::AgentError),

    #[error("failed to build speech client: {0}")]
    Speech(#[from] aula_voice::VoiceError),
}

/// Loads the directory and knowledge base and builds the service clients.
///
/// Missing credentials are not an error: the corresponding client is left
/// out and `/chat` answers with the configuration reminder.
pub fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let directory = aula_directory::load_directory(config.paths.directory.as_deref())?;
    let knowledge = KnowledgeBase::load(&config.paths.knowledge_dir)?;

    let generator = match config.llm.client_config() {
        Some(client) => Some(ResponseGenerator::new(Arc::new(OpenAiChatModel::new(
            client,
        )?))),
        None => {
            tracing::warn!("OPENAI_API_KEY is not set, chat replies are disabled");
            None
        }
    };

    let speech = match config.speech.client_config() {
        Some(client) => {
            let synthesizer: Arc<dyn SpeechSynthesizer> =
                Arc::new(ElevenLabsSynthesizer::new(client)?);
            Some(synthesizer)
        }
        None => {
            tracing::warn!("ELEVEN_LABS_API_KEY is not set, speech is disabled");
            None
        }
    };

    let lipsync = LipSyncGenerator::new(
        Arc::new(FfmpegTranscoder::new(
            &config.tools.ffmpeg_path,
            config.tools.timeout(),
        )),
        Arc::new(RhubarbAnalyzer::new(
            &config.tools.rhubarb_path,
            config.tools.timeout(),
        )),
    );

    tracing::info!(
        records = directory.len(),
        knowledge_documents = knowledge.document_count(),
        "assistant data loaded"
    );

    Ok(AppState {
        pipeline: ChatPipeline {
            directory: Arc::new(directory),
            knowledge: Arc::new(knowledge),
            knowledge_budget: config.llm.knowledge_budget_chars,
            generator,
            speech,
            lipsync,
            voice_id: config.speech.voice_id.clone(),
            audio_dir: config.paths.audio_dir.clone(),
        },
        formats_dir: config.paths.formats_dir.clone(),
    })
}

/// Maximum request body size (2 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    if !state.formats_dir.exists() {
        tracing::warn!(
            path = %state.formats_dir.display(),
            "formats directory not found, /formats will answer 404"
        );
    }

    Router::new()
        .route("/", get(api::root_handler))
        .route("/health", get(health))
        .route("/voices", get(api::voices_handler))
        .route("/chat", post(api::chat_handler))
        .nest_service("/formats", ServeDir::new(&state.formats_dir))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
