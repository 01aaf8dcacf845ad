use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The reply is not JSON at all.
    #[error("model reply is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The reply is JSON, but not a list of messages.
    #[error("model reply has an unexpected shape: {0}")]
    UnexpectedShape(String),

    #[error("failed to encode prompt: {0}")]
    Encode(#[source] serde_json::Error),
}

impl AgentError {
    /// Whether the model answered but the answer could not be used.
    pub fn is_invalid_reply(&self) -> bool {
        matches!(self, Self::InvalidJson(_) | Self::UnexpectedShape(_))
    }
}
