//! Parsing the model's reply.
//!
//! The model is asked for `{"messages": [...]}` but some models answer with
//! the bare array; both are accepted. Anything else fails the request.

use crate::error::AgentError;
use aula_types::{DraftMessage, MAX_MESSAGES};
use serde_json::Value;

/// Parses a model reply into draft messages, keeping at most
/// [`MAX_MESSAGES`].
pub fn parse_reply(content: &str) -> Result<Vec<DraftMessage>, AgentError> {
    let value: Value = serde_json::from_str(content).map_err(AgentError::InvalidJson)?;

    let value = match value {
        Value::Object(mut map) if map.contains_key("messages") => {
            map.remove("messages").unwrap_or(Value::Null)
        }
        other => other,
    };

    let mut items = match value {
        Value::Array(items) => items,
        other => {
            return Err(AgentError::UnexpectedShape(format!(
                "expected an array of messages, found {}",
                kind_of(&other)
            )))
        }
    };

    if items.len() > MAX_MESSAGES {
        tracing::warn!(
            received = items.len(),
            kept = MAX_MESSAGES,
            "model returned too many messages, truncating"
        );
        items.truncate(MAX_MESSAGES);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<DraftMessage>(item)
                .map_err(|e| AgentError::UnexpectedShape(format!("message {}: {}", i, e)))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
