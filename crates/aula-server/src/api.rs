//! HTTP handlers and the API error type.

use crate::pipeline::ChatError;
use crate::AppState;
use aula_agent::AgentError;
use aula_types::ChatMessage;
use aula_voice::VoiceError;
use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Request body for `POST /chat`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// Parses a request body. An absent or blank body is a request without a
    /// message; the content type is not checked.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("invalid chat request body: {}", e)))
    }
}

/// Response body for `POST /chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub messages: Vec<ChatMessage>,
}

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("model response invalid: {0}")]
    ModelResponseInvalid(String),
    #[error("upstream service failed: {0}")]
    Upstream(String),
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("lip-sync failed: {0}")]
    LipSync(String),
    #[error("artifact error: {0}")]
    ArtifactIo(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable kind, sent as `kind` in the error body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_request",
            ApiError::ModelResponseInvalid(_) => "model_response_invalid",
            ApiError::Upstream(_) => "upstream",
            ApiError::Synthesis(_) => "synthesis",
            ApiError::LipSync(_) => "lip_sync",
            ApiError::ArtifactIo(_) => "artifact_io",
            ApiError::NotConfigured(_) => "not_configured",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelResponseInvalid(_)
            | ApiError::Upstream(_)
            | ApiError::Synthesis(_)
            | ApiError::LipSync(_) => StatusCode::BAD_GATEWAY,
            ApiError::ArtifactIo(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::InvalidJson(_) | AgentError::UnexpectedShape(_) => {
                ApiError::ModelResponseInvalid(err.to_string())
            }
            AgentError::Http(_) | AgentError::Upstream { .. } => ApiError::Upstream(err.to_string()),
            AgentError::Encode(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Http(_) | VoiceError::Upstream { .. } => ApiError::Upstream(err.to_string()),
            VoiceError::Synthesis(_) => ApiError::Synthesis(err.to_string()),
            VoiceError::Transcode(_) | VoiceError::LipSync(_) => ApiError::LipSync(err.to_string()),
            VoiceError::Io { .. } => ApiError::ArtifactIo(err.to_string()),
            VoiceError::Config(_) => ApiError::NotConfigured(err.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Model(e) => e.into(),
            ChatError::Voice(e) => e.into(),
            ChatError::Artifact { .. }
            | ChatError::ArtifactFormat { .. }
            | ChatError::Workspace { .. } => ApiError::ArtifactIo(err.to_string()),
        }
    }
}

/// Handler for `GET /`.
pub async fn root_handler() -> &'static str {
    "Aula virtual assistant is running"
}

/// Handler for `POST /chat`.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let payload = ChatRequest::from_body(&body).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected chat request body");
    })?;

    let messages = state
        .pipeline
        .respond(payload.message.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "chat request failed");
            ApiError::from(e)
        })?;

    Ok(Json(ChatResponse { messages }))
}

/// Handler for `GET /voices`: the speech provider's voice listing, verbatim.
pub async fn voices_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let Some(speech) = &state.pipeline.speech else {
        return Err(ApiError::NotConfigured(
            "speech API key is not configured".to_string(),
        ));
    };

    let voices = speech.list_voices().await.map_err(|e| {
        tracing::error!(error = %e, "voice listing failed");
        ApiError::from(e)
    })?;
    Ok(Json(voices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_statuses() {
        let invalid: ApiError = AgentError::UnexpectedShape("no messages".into()).into();
        assert_eq!(invalid.kind(), "model_response_invalid");
        assert_eq!(invalid.status(), StatusCode::BAD_GATEWAY);

        let upstream: ApiError = AgentError::Upstream {
            status: 429,
            body: "slow down".into(),
        }
        .into();
        assert_eq!(upstream.kind(), "upstream");

        let lipsync: ApiError = VoiceError::Transcode("ffmpeg failed".into()).into();
        assert_eq!(lipsync.kind(), "lip_sync");
        assert_eq!(lipsync.status(), StatusCode::BAD_GATEWAY);

        let synthesis: ApiError = ChatError::Voice(VoiceError::Synthesis("empty".into())).into();
        assert_eq!(synthesis.kind(), "synthesis");

        let artifact: ApiError = ChatError::ArtifactFormat {
            path: "message_0.json".into(),
            reason: "not json".into(),
        }
        .into();
        assert_eq!(artifact.kind(), "artifact_io");
        assert_eq!(artifact.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing = ApiError::NotConfigured("no key".into());
        assert_eq!(missing.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn chat_request_tolerates_missing_message() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message.is_none());
    }

    #[test]
    fn blank_body_is_a_request_without_message() {
        assert!(ChatRequest::from_body(b"").unwrap().message.is_none());
        assert!(ChatRequest::from_body(b" \n").unwrap().message.is_none());
        assert_eq!(
            ChatRequest::from_body(br#"{"message": "Hola"}"#)
                .unwrap()
                .message
                .as_deref(),
            Some("Hola")
        );
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        for body in [&br#"{"message": 5}"#[..], b"not json", b"[1, 2]"] {
            let err = ChatRequest::from_body(body).unwrap_err();
            assert_eq!(err.kind(), "invalid_request");
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
