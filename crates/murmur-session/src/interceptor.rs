//! The pre-generation hook that injects advisory text.

use std::time::Duration;

use tracing::{debug, warn};

use murmur_types::ChatContext;

use crate::chain::AugmentationChain;
use crate::prompt::CONTEXT_PREFIX;

/// Default bound on the augmentation call. A slow chain delays the
/// spoken reply, so past this the turn proceeds unaugmented.
pub const DEFAULT_AUGMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs once per user turn, immediately before the primary model
/// generates: fetches advisory text for the latest utterance and
/// rewrites the context's system slot with it.
pub struct TurnInterceptor {
    chain: AugmentationChain,
    partition_key: Option<String>,
    timeout: Duration,
}

impl TurnInterceptor {
    /// `partition_key` is the resolved identity token. `None` means
    /// identity resolution failed; the session then runs memory-less
    /// and every turn passes through unmodified.
    pub fn new(chain: AugmentationChain, partition_key: Option<String>) -> Self {
        Self {
            chain,
            partition_key,
            timeout: DEFAULT_AUGMENT_TIMEOUT,
        }
    }

    /// Overrides the augmentation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether this session has a memory partition bound.
    pub fn is_partitioned(&self) -> bool {
        self.partition_key.is_some()
    }

    /// Rewrites the context's system slot with advisory text for the
    /// latest human message.
    ///
    /// Returns `true` if the slot was rewritten. On a missing partition
    /// key, a missing human message, a chain error, or a timeout the
    /// context is left exactly as it was, and the primary model still
    /// generates, at worst as a plain memory-less assistant.
    pub async fn before_generate(&self, ctx: &mut ChatContext) -> bool {
        let Some(partition_key) = self.partition_key.as_deref() else {
            debug!("no identity bound, skipping augmentation");
            return false;
        };

        let Some(user_text) = ctx.latest_human_text().map(str::to_string) else {
            debug!("no human message in context, skipping augmentation");
            return false;
        };

        match tokio::time::timeout(self.timeout, self.chain.augment(partition_key, &user_text))
            .await
        {
            Ok(Ok(advisory)) => {
                ctx.set_system(format!("{CONTEXT_PREFIX}\n\n{advisory}"));
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "augmentation failed, generating without it");
                false
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "augmentation timed out, generating without it"
                );
                false
            }
        }
    }
}
