//! Durable conversation memory for the murmur voice companion.
//!
//! Stores role-tagged turns in an append-only SQLite log, partitioned by
//! the identity token of the person speaking. Reads return turns in
//! insertion order; appends assign a per-partition sequence number
//! atomically, so two sessions sharing a partition key cannot corrupt
//! ordering. There is no update, delete, TTL, or compaction path;
//! partitions only grow.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: no external database process required.
//!   WAL allows concurrent readers with a single writer, which matches
//!   the one-writer-per-turn access pattern of a voice session.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management.
//! - **Embedded migrations**: the schema ships inside the binary via
//!   `include_str!` and cannot drift from the code that depends on it.

mod error;
mod migrations;
mod pool;
mod store;

pub use error::MemoryError;
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings};
pub use store::{append_turn, read_turns, MemoryStore, StoredTurn};
