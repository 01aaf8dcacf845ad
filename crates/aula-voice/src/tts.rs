use crate::config::ElevenLabsConfig;
use crate::error::VoiceError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

/// A text-to-speech provider.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Renders `text` with `voice_id` and writes the audio to `output`,
    /// replacing any existing file.
    async fn synthesize(&self, text: &str, voice_id: &str, output: &Path)
        -> Result<(), VoiceError>;

    /// Returns the provider's voice listing as-is.
    async fn list_voices(&self) -> Result<serde_json::Value, VoiceError>;
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// ElevenLabs REST client producing MP3 audio.
#[derive(Debug, Clone)]
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, VoiceError> {
        if config.api_key.trim().is_empty() {
            return Err(VoiceError::Config(
                "ElevenLabs API key is not configured".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, VoiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(VoiceError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        output: &Path,
    ) -> Result<(), VoiceError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Synthesis(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let request = SpeechRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        let started = std::time::Instant::now();
        let response = self
            .client
            .post(self.url(&format!("/v1/text-to-speech/{}", voice_id)))
            .header("xi-api-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await?;
        let audio = Self::check(response).await?.bytes().await?;

        if audio.is_empty() {
            return Err(VoiceError::Synthesis(
                "speech provider returned no audio".to_string(),
            ));
        }

        tokio::fs::write(output, &audio)
            .await
            .map_err(|source| VoiceError::Io {
                path: output.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            voice_id,
            bytes = audio.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            path = %output.display(),
            "speech synthesized"
        );
        Ok(())
    }

    async fn list_voices(&self) -> Result<serde_json::Value, VoiceError> {
        let response = self
            .client
            .get(self.url("/v1/voices"))
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
