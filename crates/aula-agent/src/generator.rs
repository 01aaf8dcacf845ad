use crate::error::AgentError;
use crate::prompt::ChatPrompt;
use crate::reply::parse_reply;
use async_trait::async_trait;
use aula_types::DraftMessage;
use std::sync::Arc;

/// A chat-completion backend.
///
/// Returns the raw text content of the model's reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, AgentError>;
}

/// Sends prompts to a [`ChatModel`] and parses the replies.
#[derive(Clone)]
pub struct ResponseGenerator {
    model: Arc<dyn ChatModel>,
}

impl ResponseGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, prompt: &ChatPrompt) -> Result<Vec<DraftMessage>, AgentError> {
        let content = self.model.complete(prompt).await?;
        let drafts = parse_reply(&content).inspect_err(|e| {
            tracing::warn!(error = %e, reply = %content, "model reply could not be parsed");
        })?;
        tracing::debug!(messages = drafts.len(), "model reply parsed");
        Ok(drafts)
    }
}

impl std::fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("model", &"Arc<dyn ChatModel>")
            .finish()
    }
}
