//! The memory-backed augmentation chain.
//!
//! The fetch and the write are separate operations:
//! [`AugmentationChain::fetch_advisory`] is pure
//! with respect to memory, [`AugmentationChain::record_turn`] performs
//! exactly two appends, and [`AugmentationChain::augment`] composes the
//! two. Each side's failure handling is independently testable.

use std::sync::Arc;

use tracing::{debug, warn};

use murmur_llm::ChatModel;
use murmur_memory::MemoryStore;
use murmur_types::Turn;

use crate::error::SessionError;
use crate::prompt::{build_prompt, COMPANION_PERSONA};

/// Produces advisory text for a turn from the session's memory
/// partition, and records the exchange back into it.
pub struct AugmentationChain {
    model: Arc<dyn ChatModel>,
    store: MemoryStore,
    persona: String,
}

impl AugmentationChain {
    pub fn new(model: Arc<dyn ChatModel>, store: MemoryStore) -> Self {
        Self {
            model,
            store,
            persona: COMPANION_PERSONA.to_string(),
        }
    }

    /// Replaces the default persona preamble.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Reads the partition and asks the augmentation model for advisory
    /// text. Does not write to memory.
    ///
    /// A memory-read failure degrades to an empty memory view rather
    /// than failing the turn: the advisory is then produced from the
    /// persona and the latest utterance alone.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Llm` if the model call fails.
    pub async fn fetch_advisory(
        &self,
        partition_key: &str,
        latest_user_text: &str,
    ) -> Result<String, SessionError> {
        let store = self.store.clone();
        let key = partition_key.to_string();
        let memory: Vec<Turn> = match tokio::task::spawn_blocking(move || store.read(&key)).await {
            Ok(Ok(stored)) => stored.into_iter().map(|t| t.into_turn()).collect(),
            Ok(Err(e)) => {
                warn!(partition = partition_key, error = %e, "memory read failed, augmenting from an empty view");
                Vec::new()
            }
            Err(e) => {
                warn!(partition = partition_key, error = %e, "memory read task failed, augmenting from an empty view");
                Vec::new()
            }
        };

        debug!(
            partition = partition_key,
            remembered_turns = memory.len(),
            "fetching advisory"
        );

        let prompt = build_prompt(&self.persona, &memory, latest_user_text);
        let advisory = self.model.complete(&prompt).await?;
        Ok(advisory)
    }

    /// Appends the utterance and the advisory to the partition, in that
    /// order. Exactly two rows per call. The appends run on the
    /// blocking pool so the sqlite calls never stall the async runtime.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Memory` if either append fails.
    pub async fn record_turn(
        &self,
        partition_key: &str,
        latest_user_text: &str,
        advisory: &str,
    ) -> Result<(), SessionError> {
        let store = self.store.clone();
        let key = partition_key.to_string();
        let human = Turn::human(latest_user_text);
        let assistant = Turn::assistant(advisory);
        tokio::task::spawn_blocking(move || {
            store.append(&key, &human)?;
            store.append(&key, &assistant)?;
            Ok::<(), murmur_memory::MemoryError>(())
        })
        .await??;
        Ok(())
    }

    /// Full chain: fetch the advisory, then record the exchange.
    ///
    /// The append is best-effort: if it fails the advisory is still
    /// returned and the failure is logged, so a storage outage degrades
    /// the companion's memory rather than the current turn.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Llm` if the model call fails.
    pub async fn augment(
        &self,
        partition_key: &str,
        latest_user_text: &str,
    ) -> Result<String, SessionError> {
        let advisory = self.fetch_advisory(partition_key, latest_user_text).await?;

        if let Err(e) = self
            .record_turn(partition_key, latest_user_text, &advisory)
            .await
        {
            warn!(partition = partition_key, error = %e, "failed to record turn in memory");
        }

        Ok(advisory)
    }
}
