//! Role-tagged conversation turns.

use serde::{Deserialize, Serialize};

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Instructions or injected context for a model.
    System,
    /// The person speaking to the assistant.
    Human,
    /// The assistant (or the augmentation model speaking as it).
    Assistant,
}

impl Role {
    /// Returns the storage name for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "human",
            Role::Assistant => "assistant",
        }
    }

    /// Attempts to convert a storage name back to a `Role`.
    ///
    /// Returns `None` for unknown names.
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "system" => Some(Role::System),
            "human" => Some(Role::Human),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// One role-tagged message in a conversation.
///
/// Turns are immutable once appended to the durable memory log; the only
/// mutable message anywhere in the system is the reserved system slot of
/// [`crate::ChatContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
