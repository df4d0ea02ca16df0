//! Language-model clients for the murmur voice companion.
//!
//! Two logical models run per turn: the augmentation model that distils
//! conversation memory into advisory text, and the primary model that
//! produces the spoken reply. Both are OpenAI-compatible chat
//! completions, reached through the same [`ChatModel`] trait so the
//! session core can be exercised with a scripted model in tests.

mod chat;
mod error;

pub use chat::{ChatModel, ModelConfig, OpenAiChatModel};
pub use error::LlmError;
