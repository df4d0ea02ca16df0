//! Shared conversation types for the murmur voice companion.
//!
//! This crate provides the foundational types used across all murmur
//! crates: the role-tagged [`Turn`] record that both the durable memory
//! log and the language-model clients exchange, and the in-process
//! [`ChatContext`] whose first slot is reserved for the mutable system
//! message rewritten by the turn interceptor.
//!
//! No crate in the workspace depends on anything *except* `murmur-types`
//! for cross-cutting type definitions. This keeps the dependency graph
//! clean and prevents circular dependencies.

mod context;
mod turn;

pub use context::ChatContext;
pub use turn::{Role, Turn};
