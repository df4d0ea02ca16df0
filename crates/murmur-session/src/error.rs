//! Error types for the session core.

use thiserror::Error;

/// Errors that can occur while augmenting a turn.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The augmentation model call failed.
    #[error(transparent)]
    Llm(#[from] murmur_llm::LlmError),

    /// Conversation memory could not be read or appended.
    #[error(transparent)]
    Memory(#[from] murmur_memory::MemoryError),

    /// A blocking storage task was cancelled or panicked.
    #[error("storage task failed: {0}")]
    Storage(#[from] tokio::task::JoinError),
}
