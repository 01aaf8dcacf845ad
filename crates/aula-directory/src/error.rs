use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the directory document.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("failed to read directory file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse directory document: {0}")]
    Parse(#[from] toml::de::Error),

    /// A record is filed under a key that differs from its own code.
    #[error("directory entry {key} declares code {code}")]
    CodeMismatch { key: String, code: String },
}

/// Errors raised while loading the knowledge base.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("failed to read knowledge directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read knowledge document {path:?}: {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
