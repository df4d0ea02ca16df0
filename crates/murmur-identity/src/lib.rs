//! Identity resolution for the murmur voice companion.
//!
//! A session's conversation memory is partitioned by an email address
//! served by an external identity endpoint. Resolution happens once at
//! session start; every failure mode (network error, non-2xx status,
//! missing or empty field) collapses to `None` with a logged
//! diagnostic, and the session then runs without memory augmentation.

mod resolver;

pub use resolver::{IdentityResolver, DEFAULT_RESOLVE_TIMEOUT};
