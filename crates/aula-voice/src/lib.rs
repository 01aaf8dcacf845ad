//! Voice output for the Aula assistant.
//!
//! Turns message text into speech through a text-to-speech provider, then
//! derives viseme timing for the avatar's lip-sync: the synthesized audio is
//! transcoded to WAV and run through a phonetic lip-sync analyzer.
//!
//! Each external collaborator sits behind a one-method trait
//! ([`SpeechSynthesizer`], [`AudioTranscoder`], [`VisemeAnalyzer`]) so the
//! real provider and command-line tools can be swapped for fakes.

pub mod config;
pub mod error;
pub mod lipsync;
mod process;
pub mod transcode;
pub mod tts;

pub use config::ElevenLabsConfig;
pub use error::VoiceError;
pub use lipsync::{LipSyncGenerator, RhubarbAnalyzer, VisemeAnalyzer};
pub use transcode::{AudioTranscoder, FfmpegTranscoder};
pub use tts::{ElevenLabsSynthesizer, SpeechSynthesizer};
