use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("speech request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("speech provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TTS error: {0}")]
    Synthesis(String),

    #[error("transcode error: {0}")]
    Transcode(String),

    #[error("lip-sync error: {0}")]
    LipSync(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
