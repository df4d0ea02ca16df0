//! Persistence operations for the conversation log.
//!
//! All writes go through [`append_turn`], which assigns a per-partition
//! sequence number and inserts in a single statement. Reads go through
//! [`read_turns`], which returns a partition's turns in insertion order.
//! [`MemoryStore`] wraps both behind a connection pool for callers that
//! do not manage their own connections.

use rusqlite::{params, Connection};

use murmur_types::{Role, Turn};

use crate::error::MemoryError;
use crate::migrations;
use crate::pool::{create_pool, DbPool, DbRuntimeSettings};

/// One persisted conversation turn, as read back from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTurn {
    pub id: i64,
    pub partition_key: String,
    pub role: Role,
    pub content: String,
    pub seq: i64,
    pub created_at: String,
}

impl StoredTurn {
    /// Discards storage metadata, leaving the role-tagged message.
    pub fn into_turn(self) -> Turn {
        Turn {
            role: self.role,
            content: self.content,
        }
    }
}

/// Appends a turn to a partition and returns its sequence number.
///
/// The sequence number is computed inside the INSERT itself
/// (`COALESCE(MAX(seq), 0) + 1` over the same partition), so two
/// sessions appending to a shared partition cannot observe the same
/// `MAX(seq)` and produce duplicate ordering.
///
/// # Errors
///
/// Returns `MemoryError::Database` on SQL failure.
pub fn append_turn(
    conn: &Connection,
    partition_key: &str,
    turn: &Turn,
) -> Result<i64, MemoryError> {
    let seq = conn.query_row(
        "INSERT INTO conversation_log (partition_key, role, content, seq)
         VALUES (
            ?1, ?2, ?3,
            (SELECT COALESCE(MAX(seq), 0) + 1 FROM conversation_log WHERE partition_key = ?1)
         )
         RETURNING seq",
        params![partition_key, turn.role.as_str(), turn.content],
        |row| row.get::<_, i64>(0),
    )?;

    Ok(seq)
}

/// Reads every turn in a partition, oldest first.
///
/// # Errors
///
/// Returns `MemoryError::Database` on SQL failure, or
/// `MemoryError::UnknownRole` if a row carries a role name this build
/// does not recognise.
pub fn read_turns(conn: &Connection, partition_key: &str) -> Result<Vec<StoredTurn>, MemoryError> {
    let mut stmt = conn.prepare(
        "SELECT id, partition_key, role, content, seq, created_at
         FROM conversation_log
         WHERE partition_key = ?1
         ORDER BY seq ASC",
    )?;

    let rows = stmt.query_map([partition_key], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut turns = Vec::new();
    for row in rows {
        let (id, partition_key, role_name, content, seq, created_at) = row?;
        let role = Role::from_str(&role_name).ok_or(MemoryError::UnknownRole(role_name))?;
        turns.push(StoredTurn {
            id,
            partition_key,
            role,
            content,
            seq,
            created_at,
        });
    }

    Ok(turns)
}

/// Pooled handle to the conversation log.
///
/// Cheap to clone; clones share the underlying pool.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pool: DbPool,
}

impl MemoryStore {
    /// Opens (creating if necessary) the log at `db_path` and applies
    /// pending migrations.
    pub fn open(db_path: &str, settings: DbRuntimeSettings) -> Result<Self, MemoryError> {
        let pool = create_pool(db_path, settings)?;

        {
            let conn = pool.get()?;
            let applied = migrations::run_migrations(&conn)?;
            if applied > 0 {
                tracing::info!(count = applied, "applied conversation log migrations");
            }
        }

        Ok(Self { pool })
    }

    /// Wraps an existing pool. The caller is responsible for migrations.
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Reads a partition's turns in insertion order.
    pub fn read(&self, partition_key: &str) -> Result<Vec<StoredTurn>, MemoryError> {
        let conn = self.pool.get()?;
        read_turns(&conn, partition_key)
    }

    /// Appends one turn and returns its sequence number.
    pub fn append(&self, partition_key: &str, turn: &Turn) -> Result<i64, MemoryError> {
        let conn = self.pool.get()?;
        append_turn(&conn, partition_key, turn)
    }
}
