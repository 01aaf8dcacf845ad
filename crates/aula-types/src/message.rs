//! Talking-head messages.
//!
//! The language model produces [`DraftMessage`]s: text plus the avatar's
//! facial expression and animation. A draft becomes a [`ChatMessage`] only
//! once its synthesized audio and lip-sync timing exist, so a message without
//! audio can never reach a client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of messages returned for a single chat turn.
pub const MAX_MESSAGES: usize = 3;

/// Facial expressions understood by the avatar renderer.
///
/// Unknown labels and `null` deserialize to [`FacialExpression::Default`] so
/// a creative model reply never fails a request on cosmetics alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Option<String>")]
pub enum FacialExpression {
    Smile,
    Sad,
    Angry,
    Surprised,
    FunnyFace,
    #[default]
    Default,
}

impl FacialExpression {
    /// All expressions, in the order they are advertised to the model.
    pub const ALL: [FacialExpression; 6] = [
        Self::Smile,
        Self::Sad,
        Self::Angry,
        Self::Surprised,
        Self::FunnyFace,
        Self::Default,
    ];

    /// Returns the wire label for this expression.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smile => "smile",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Surprised => "surprised",
            Self::FunnyFace => "funnyFace",
            Self::Default => "default",
        }
    }

    /// Looks up an expression by label, ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|expr| expr.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl From<Option<String>> for FacialExpression {
    fn from(label: Option<String>) -> Self {
        label
            .and_then(|label| Self::from_label(&label))
            .unwrap_or_default()
    }
}

impl fmt::Display for FacialExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body animations understood by the avatar renderer.
///
/// Unknown labels and `null` deserialize to [`Animation::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Animation {
    #[serde(rename = "Talking_0")]
    Talking0,
    #[serde(rename = "Talking_1")]
    Talking1,
    #[serde(rename = "Talking_2")]
    Talking2,
    Crying,
    Laughing,
    Rumba,
    #[default]
    Idle,
    Terrified,
    Angry,
}

impl Animation {
    /// All animations, in the order they are advertised to the model.
    pub const ALL: [Animation; 9] = [
        Self::Talking0,
        Self::Talking1,
        Self::Talking2,
        Self::Crying,
        Self::Laughing,
        Self::Rumba,
        Self::Idle,
        Self::Terrified,
        Self::Angry,
    ];

    /// Returns the wire label for this animation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Talking0 => "Talking_0",
            Self::Talking1 => "Talking_1",
            Self::Talking2 => "Talking_2",
            Self::Crying => "Crying",
            Self::Laughing => "Laughing",
            Self::Rumba => "Rumba",
            Self::Idle => "Idle",
            Self::Terrified => "Terrified",
            Self::Angry => "Angry",
        }
    }

    /// Looks up an animation by label, ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|anim| anim.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl From<Option<String>> for Animation {
    fn from(label: Option<String>) -> Self {
        label
            .and_then(|label| Self::from_label(&label))
            .unwrap_or_default()
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message as written by the language model, before any audio exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMessage {
    pub text: String,
    #[serde(rename = "facialExpression", default)]
    pub facial_expression: FacialExpression,
    #[serde(default)]
    pub animation: Animation,
}

impl DraftMessage {
    pub fn new(
        text: impl Into<String>,
        facial_expression: FacialExpression,
        animation: Animation,
    ) -> Self {
        Self {
            text: text.into(),
            facial_expression,
            animation,
        }
    }

    /// Attaches synthesized audio (already base64-encoded) and the viseme
    /// timing document, producing a deliverable message.
    pub fn complete(self, audio_base64: String, lipsync: serde_json::Value) -> ChatMessage {
        ChatMessage {
            text: self.text,
            facial_expression: self.facial_expression,
            animation: self.animation,
            audio: audio_base64,
            lipsync,
        }
    }
}

/// A fully assembled talking-head message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    #[serde(rename = "facialExpression")]
    pub facial_expression: FacialExpression,
    pub animation: Animation,
    /// Base64-encoded audio bytes.
    pub audio: String,
    /// Viseme timing document produced by the lip-sync analyzer.
    pub lipsync: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expression_labels_match_renderer_vocabulary() {
        let labels: Vec<&str> = FacialExpression::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(
            labels,
            ["smile", "sad", "angry", "surprised", "funnyFace", "default"]
        );
        assert_eq!(
            serde_json::to_value(FacialExpression::FunnyFace).unwrap(),
            json!("funnyFace")
        );
    }

    #[test]
    fn animation_serializes_with_underscored_talking_labels() {
        assert_eq!(
            serde_json::to_value(Animation::Talking2).unwrap(),
            json!("Talking_2")
        );
        assert_eq!(serde_json::to_value(Animation::Rumba).unwrap(), json!("Rumba"));
    }

    #[test]
    fn draft_deserializes_model_output() {
        let draft: DraftMessage = serde_json::from_value(json!({
            "text": "Hola",
            "facialExpression": "surprised",
            "animation": "Talking_1"
        }))
        .unwrap();

        assert_eq!(draft.text, "Hola");
        assert_eq!(draft.facial_expression, FacialExpression::Surprised);
        assert_eq!(draft.animation, Animation::Talking1);
    }

    #[test]
    fn unknown_or_missing_tags_fall_back() {
        let draft: DraftMessage = serde_json::from_value(json!({
            "text": "Hola",
            "facialExpression": "smirk"
        }))
        .unwrap();

        assert_eq!(draft.facial_expression, FacialExpression::Default);
        assert_eq!(draft.animation, Animation::Idle);
    }

    #[test]
    fn null_tags_fall_back() {
        let draft: DraftMessage = serde_json::from_value(json!({
            "text": "Hola",
            "facialExpression": null,
            "animation": null
        }))
        .unwrap();

        assert_eq!(draft.facial_expression, FacialExpression::Default);
        assert_eq!(draft.animation, Animation::Idle);
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(FacialExpression::from_label("SMILE"), Some(FacialExpression::Smile));
        assert_eq!(Animation::from_label("talking_0"), Some(Animation::Talking0));
        assert_eq!(Animation::from_label("moonwalk"), None);
    }

    #[test]
    fn completed_message_uses_camel_case_keys() {
        let message = DraftMessage::new("Hi", FacialExpression::Smile, Animation::Laughing)
            .complete("AAAA".to_string(), json!({ "mouthCues": [] }));

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["facialExpression"], "smile");
        assert_eq!(value["animation"], "Laughing");
        assert_eq!(value["audio"], "AAAA");
        assert_eq!(value["lipsync"]["mouthCues"], json!([]));
    }
}
