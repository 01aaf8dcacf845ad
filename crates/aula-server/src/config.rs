//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Language model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Text-to-speech settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// External audio tools.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Filesystem locations.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "aula_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Chat-completion endpoint settings.
#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    /// API key. Without it `/chat` answers with the missing-configuration
    /// messages.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Characters of the knowledge base included in each prompt.
    #[serde(default = "default_knowledge_budget")]
    pub knowledge_budget_chars: usize,
}

/// Text-to-speech provider settings.
#[derive(Clone, Deserialize)]
pub struct SpeechConfig {
    /// API key. Without it `/chat` answers with the missing-configuration
    /// messages.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_speech_base_url")]
    pub base_url: String,

    /// Voice every message is rendered with.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    #[serde(default = "default_speech_model")]
    pub model_id: String,

    #[serde(default = "default_stability")]
    pub stability: f32,

    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Command-line tools used for lip-sync.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default = "default_rhubarb_path")]
    pub rhubarb_path: PathBuf,

    /// Per-invocation timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Filesystem locations.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory of markdown knowledge documents.
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: PathBuf,

    /// Directory served under `/formats`.
    #[serde(default = "default_formats_dir")]
    pub formats_dir: PathBuf,

    /// Directory holding the canned audio and per-request artifacts.
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// Directory document; the embedded default is used when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_base_url() -> String {
    aula_agent::openai::DEFAULT_BASE_URL.to_string()
}

fn default_llm_model() -> String {
    aula_agent::openai::DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_knowledge_budget() -> usize {
    aula_directory::DEFAULT_SNIPPET_CHARS
}

fn default_speech_base_url() -> String {
    aula_voice::config::DEFAULT_ELEVENLABS_URL.to_string()
}

fn default_voice_id() -> String {
    "86V9x9hrQds83qf7zaGn".to_string()
}

fn default_speech_model() -> String {
    aula_voice::config::DEFAULT_MODEL_ID.to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_rhubarb_path() -> PathBuf {
    PathBuf::from("rhubarb")
}

fn default_knowledge_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_formats_dir() -> PathBuf {
    PathBuf::from("formats")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audios")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
            knowledge_budget_chars: default_knowledge_budget(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_speech_base_url(),
            voice_id: default_voice_id(),
            model_id: default_speech_model(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            rhubarb_path: default_rhubarb_path(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            knowledge_dir: default_knowledge_dir(),
            formats_dir: default_formats_dir(),
            audio_dir: default_audio_dir(),
            directory: None,
        }
    }
}

fn non_blank(key: &Option<String>) -> Option<&str> {
    key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

impl LlmConfig {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    /// Client settings for the chat model, or `None` without an API key.
    pub fn client_config(&self) -> Option<aula_agent::OpenAiConfig> {
        let api_key = self.api_key()?;
        Some(aula_agent::OpenAiConfig {
            api_key: api_key.to_string(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_seconds),
        })
    }
}

impl SpeechConfig {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    /// Client settings for the speech provider, or `None` without an API key.
    pub fn client_config(&self) -> Option<aula_voice::ElevenLabsConfig> {
        let api_key = self.api_key()?;
        Some(aula_voice::ElevenLabsConfig {
            api_key: api_key.to_string(),
            base_url: self.base_url.clone(),
            model_id: self.model_id.clone(),
            stability: self.stability,
            similarity_boost: self.similarity_boost,
            timeout_seconds: self.timeout_seconds,
        })
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("knowledge_budget_chars", &self.knowledge_budget_chars)
            .finish()
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .field("stability", &self.stability)
            .field("similarity_boost", &self.similarity_boost)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides (see [`apply_env_overrides`]).
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies environment overrides using `lookup` to read variables.
///
/// - `OPENAI_API_KEY` overrides `llm.api_key`
/// - `ELEVEN_LABS_API_KEY` overrides `speech.api_key`
/// - `AULA_HOST` / `AULA_PORT` override `server.host` / `server.port`
/// - `AULA_LOG_LEVEL` overrides `logging.level`
/// - `AULA_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `AULA_LLM_BASE_URL` / `AULA_LLM_MODEL` override `llm.base_url` / `llm.model`
/// - `AULA_SPEECH_BASE_URL` / `AULA_VOICE_ID` override `speech.base_url` / `speech.voice_id`
/// - `AULA_FFMPEG_PATH` / `AULA_RHUBARB_PATH` override the tool paths
/// - `AULA_KNOWLEDGE_DIR`, `AULA_FORMATS_DIR`, `AULA_AUDIO_DIR`,
///   `AULA_DIRECTORY_PATH` override the `paths` section
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("OPENAI_API_KEY") {
        config.llm.api_key = Some(key);
    }
    if let Some(key) = lookup("ELEVEN_LABS_API_KEY") {
        config.speech.api_key = Some(key);
    }
    if let Some(host) = lookup("AULA_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("AULA_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = lookup("AULA_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("AULA_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(url) = lookup("AULA_LLM_BASE_URL") {
        config.llm.base_url = url;
    }
    if let Some(model) = lookup("AULA_LLM_MODEL") {
        config.llm.model = model;
    }
    if let Some(url) = lookup("AULA_SPEECH_BASE_URL") {
        config.speech.base_url = url;
    }
    if let Some(voice) = lookup("AULA_VOICE_ID") {
        config.speech.voice_id = voice;
    }
    if let Some(path) = lookup("AULA_FFMPEG_PATH") {
        config.tools.ffmpeg_path = path.into();
    }
    if let Some(path) = lookup("AULA_RHUBARB_PATH") {
        config.tools.rhubarb_path = path.into();
    }
    if let Some(dir) = lookup("AULA_KNOWLEDGE_DIR") {
        config.paths.knowledge_dir = dir.into();
    }
    if let Some(dir) = lookup("AULA_FORMATS_DIR") {
        config.paths.formats_dir = dir.into();
    }
    if let Some(dir) = lookup("AULA_AUDIO_DIR") {
        config.paths.audio_dir = dir.into();
    }
    if let Some(path) = lookup("AULA_DIRECTORY_PATH") {
        config.paths.directory = Some(path.into());
    }
}
