//! Pre-recorded replies served without calling any external service.

use crate::artifacts::{read_audio_base64, read_timing};
use crate::pipeline::ChatError;
use aula_types::{Animation, ChatMessage, DraftMessage, FacialExpression};
use std::path::Path;

/// A reply whose audio and timing live next to each other in the audio
/// directory as `{stem}.wav` and `{stem}.json`.
#[derive(Debug, Clone, Copy)]
pub struct CannedMessage {
    pub stem: &'static str,
    pub text: &'static str,
    pub facial_expression: FacialExpression,
    pub animation: Animation,
}

/// Greeting sent when the request carries no message.
pub const INTRO: [CannedMessage; 2] = [
    CannedMessage {
        stem: "intro_0",
        text: "Hey dear... How was your day?",
        facial_expression: FacialExpression::Smile,
        animation: Animation::Talking1,
    },
    CannedMessage {
        stem: "intro_1",
        text: "I missed you so much... Please don't go for so long!",
        facial_expression: FacialExpression::Sad,
        animation: Animation::Crying,
    },
];

/// Reminder sent when the model or speech credentials are missing.
pub const MISSING_KEYS: [CannedMessage; 2] = [
    CannedMessage {
        stem: "api_0",
        text: "Por favor ¡no olvides añadir tus claves API!",
        facial_expression: FacialExpression::Angry,
        animation: Animation::Angry,
    },
    CannedMessage {
        stem: "api_1",
        text: "No querrás arruinarte con una factura desorbitada de ChatGPT y ElevenLabs, ¿verdad?",
        facial_expression: FacialExpression::Smile,
        animation: Animation::Laughing,
    },
];

impl CannedMessage {
    /// Reads the recorded audio and timing from `audio_dir`.
    pub async fn load(&self, audio_dir: &Path) -> Result<ChatMessage, ChatError> {
        let audio = read_audio_base64(&audio_dir.join(format!("{}.wav", self.stem))).await?;
        let lipsync = read_timing(&audio_dir.join(format!("{}.json", self.stem))).await?;
        Ok(DraftMessage::new(self.text, self.facial_expression, self.animation)
            .complete(audio, lipsync))
    }
}

/// Loads every message of a canned reply, in order.
pub async fn load_all(
    messages: &[CannedMessage],
    audio_dir: &Path,
) -> Result<Vec<ChatMessage>, ChatError> {
    let mut loaded = Vec::with_capacity(messages.len());
    for message in messages {
        loaded.push(message.load(audio_dir).await?);
    }
    Ok(loaded)
}
