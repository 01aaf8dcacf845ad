#![allow(dead_code)]

use async_trait::async_trait;
use aula_agent::{AgentError, ChatModel, ChatPrompt, ResponseGenerator};
use aula_directory::{default_directory, KnowledgeBase};
use aula_server::pipeline::ChatPipeline;
use aula_server::AppState;
use aula_voice::{
    AudioTranscoder, LipSyncGenerator, SpeechSynthesizer, VisemeAnalyzer, VoiceError,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Ordered record of every external call made by the fakes.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

/// Chat model that replays a fixed reply and records every prompt.
pub struct ScriptedModel {
    pub reply: String,
    pub log: EventLog,
    pub prompts: Arc<Mutex<Vec<ChatPrompt>>>,
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, AgentError> {
        self.log.lock().unwrap().push("model".to_string());
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.reply.clone())
    }
}

/// Speech provider writing deterministic bytes per message.
pub struct FakeSpeech {
    pub log: EventLog,
    /// Index of the call that fails, if any.
    pub fail_on: Option<usize>,
    /// Never finish synthesizing.
    pub stall: bool,
}

/// Bytes the fake provider writes for `text`.
pub fn fake_audio(text: &str) -> Vec<u8> {
    let mut bytes = b"ID3".to_vec();
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str, voice_id: &str, output: &Path) -> Result<(), VoiceError> {
        let call = {
            let mut log = self.log.lock().unwrap();
            let call = log.iter().filter(|e| e.starts_with("synthesize")).count();
            log.push(format!("synthesize {} {}", file_name(output), voice_id));
            call
        };
        if self.stall {
            std::future::pending::<()>().await;
        }
        if self.fail_on == Some(call) {
            return Err(VoiceError::Synthesis("provider rejected the text".to_string()));
        }
        tokio::fs::write(output, fake_audio(text)).await.unwrap();
        Ok(())
    }

    async fn list_voices(&self) -> Result<Value, VoiceError> {
        self.log.lock().unwrap().push("list_voices".to_string());
        Ok(json!({ "voices": [{ "voice_id": "86V9x9hrQds83qf7zaGn", "name": "Aula" }] }))
    }
}

pub struct FakeTranscoder {
    pub log: EventLog,
}

#[async_trait]
impl AudioTranscoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("transcode {}", file_name(input)));
        tokio::fs::copy(input, output).await.unwrap();
        Ok(())
    }
}

pub struct FakeAnalyzer {
    pub log: EventLog,
}

#[async_trait]
impl VisemeAnalyzer for FakeAnalyzer {
    async fn analyze(&self, wav: &Path, output: &Path) -> Result<(), VoiceError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("analyze {}", file_name(wav)));
        let timing = json!({
            "metadata": { "soundFile": wav.display().to_string(), "duration": 0.5 },
            "mouthCues": [{ "start": 0.0, "end": 0.5, "value": "B" }]
        });
        tokio::fs::write(output, timing.to_string()).await.unwrap();
        Ok(())
    }
}

/// Writes the canned recordings into `audio_dir`.
pub fn write_canned(audio_dir: &Path) {
    for stem in ["intro_0", "intro_1", "api_0", "api_1"] {
        std::fs::write(audio_dir.join(format!("{stem}.wav")), format!("RIFF{stem}")).unwrap();
        std::fs::write(
            audio_dir.join(format!("{stem}.json")),
            json!({ "mouthCues": [{ "start": 0.0, "end": 0.2, "value": "X" }] }).to_string(),
        )
        .unwrap();
    }
}

/// Pipeline wired to fakes, with its artifacts in a temporary directory.
pub struct Harness {
    pub dir: TempDir,
    pub log: EventLog,
    pub prompts: Arc<Mutex<Vec<ChatPrompt>>>,
    pub pipeline: ChatPipeline,
}

pub struct HarnessOptions {
    pub reply: String,
    pub with_model: bool,
    pub with_speech: bool,
    pub fail_synthesis_on: Option<usize>,
    pub stall_synthesis: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            reply: model_reply(&["Hola"]),
            with_model: true,
            with_speech: true,
            fail_synthesis_on: None,
            stall_synthesis: false,
        }
    }
}

/// A model reply carrying one message per text.
pub fn model_reply(texts: &[&str]) -> String {
    let messages: Vec<Value> = texts
        .iter()
        .map(|text| json!({ "text": text, "facialExpression": "smile", "animation": "Talking_0" }))
        .collect();
    json!({ "messages": messages }).to_string()
}

impl Harness {
    pub fn new(options: HarnessOptions) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let audio_dir = dir.path().join("audios");
        std::fs::create_dir_all(&audio_dir).unwrap();
        write_canned(&audio_dir);

        let log = EventLog::default();
        let prompts = Arc::new(Mutex::new(Vec::new()));

        let generator = options.with_model.then(|| {
            ResponseGenerator::new(Arc::new(ScriptedModel {
                reply: options.reply.clone(),
                log: log.clone(),
                prompts: prompts.clone(),
            }))
        });
        let speech = options.with_speech.then(|| {
            let speech: Arc<dyn SpeechSynthesizer> = Arc::new(FakeSpeech {
                log: log.clone(),
                fail_on: options.fail_synthesis_on,
                stall: options.stall_synthesis,
            });
            speech
        });

        let pipeline = ChatPipeline {
            directory: Arc::new(default_directory().unwrap()),
            knowledge: Arc::new(KnowledgeBase::from_documents([(
                "calendario.md",
                "Las clases inician el 3 de febrero.",
            )])),
            knowledge_budget: 2000,
            generator,
            speech,
            lipsync: LipSyncGenerator::new(
                Arc::new(FakeTranscoder { log: log.clone() }),
                Arc::new(FakeAnalyzer { log: log.clone() }),
            ),
            voice_id: "86V9x9hrQds83qf7zaGn".to_string(),
            audio_dir,
        };

        Self {
            dir,
            log,
            prompts,
            pipeline,
        }
    }

    pub fn audio_dir(&self) -> &Path {
        &self.pipeline.audio_dir
    }

    /// Request directories left behind under the audio directory.
    pub fn leftover_requests(&self) -> usize {
        match std::fs::read_dir(self.audio_dir().join("requests")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    /// Moves the pipeline into server state, keeping the temp dir alive.
    pub fn into_state(self) -> (AppState, TempDir, EventLog) {
        let formats_dir = self.dir.path().join("formats");
        std::fs::create_dir_all(&formats_dir).unwrap();
        std::fs::write(formats_dir.join("constancia.pdf"), b"%PDF-1.4").unwrap();

        let state = AppState {
            pipeline: self.pipeline,
            formats_dir,
        };
        (state, self.dir, self.log)
    }
}
