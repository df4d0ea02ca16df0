//! Turn augmentation for the murmur voice companion.
//!
//! This crate is the reproducible core of the system: per user turn, the
//! [`AugmentationChain`] reads the session's conversation memory, asks a
//! secondary model for short advisory text, and records the exchange;
//! the [`TurnInterceptor`] runs that chain under a bounded timeout and
//! rewrites the primary context's system slot with the advisory before
//! the primary model generates.
//!
//! Every failure mode degrades to a plain, memory-less assistant: an
//! unresolved identity skips augmentation entirely, and a chain error or
//! timeout leaves the system slot untouched for that turn.

mod chain;
mod error;
mod interceptor;
mod prompt;

pub use chain::AugmentationChain;
pub use error::SessionError;
pub use interceptor::{TurnInterceptor, DEFAULT_AUGMENT_TIMEOUT};
pub use prompt::{COMPANION_PERSONA, CONTEXT_PREFIX, GREETING, PRIMARY_SYSTEM_PROMPT};

#[cfg(test)]
mod tests;
