//! Response generation for the Aula assistant.
//!
//! Builds the prompt from the directory, the knowledge snippet and the
//! user's question, sends it to a chat-completion model, and parses the
//! model's JSON reply into at most [`aula_types::MAX_MESSAGES`] draft
//! messages.
//!
//! The model sits behind the [`ChatModel`] trait so the HTTP client can be
//! replaced by a scripted fake in tests.

pub mod error;
pub mod generator;
pub mod openai;
pub mod prompt;
pub mod reply;

pub use error::AgentError;
pub use generator::{ChatModel, ResponseGenerator};
pub use openai::{OpenAiChatModel, OpenAiConfig};
pub use prompt::{build_prompt, ChatPrompt};
pub use reply::parse_reply;
