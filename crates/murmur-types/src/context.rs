//! The in-process conversation context for one voice session.

use crate::turn::{Role, Turn};

/// Ordered message list for the current session.
///
/// Index 0 is the reserved system slot: it is created with the session
/// and overwritten (never removed) by the turn interceptor before each
/// generation. Every other entry is part of the running human/assistant
/// exchange and is append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContext {
    turns: Vec<Turn>,
}

#[allow(clippy::len_without_is_empty)]
impl ChatContext {
    /// Creates a context holding only the initial system message.
    pub fn new(system_content: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(system_content)],
        }
    }

    /// Overwrites the reserved system slot.
    pub fn set_system(&mut self, content: impl Into<String>) {
        self.turns[0] = Turn::system(content);
    }

    /// Returns the current content of the system slot.
    pub fn system_content(&self) -> &str {
        &self.turns[0].content
    }

    /// Appends a human turn to the running exchange.
    pub fn push_human(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::human(content));
    }

    /// Appends an assistant turn to the running exchange.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::assistant(content));
    }

    /// Returns the text of the most recent human turn, if any.
    pub fn latest_human_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Human)
            .map(|t| t.content.as_str())
    }

    /// All turns in order, system slot first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns including the system slot. Never zero, since the
    /// system slot always exists.
    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_holds_only_the_system_slot() {
        let ctx = ChatContext::new("be helpful");
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.system_content(), "be helpful");
        assert_eq!(ctx.latest_human_text(), None);
    }

    #[test]
    fn set_system_replaces_slot_zero_without_touching_the_exchange() {
        let mut ctx = ChatContext::new("original");
        ctx.push_human("hello");
        ctx.push_assistant("hi there");

        ctx.set_system("replaced");

        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.system_content(), "replaced");
        assert_eq!(ctx.turns()[1], Turn::human("hello"));
        assert_eq!(ctx.turns()[2], Turn::assistant("hi there"));
    }

    #[test]
    fn latest_human_text_skips_assistant_turns() {
        let mut ctx = ChatContext::new("sys");
        ctx.push_human("first");
        ctx.push_assistant("reply");
        ctx.push_human("second");
        ctx.push_assistant("another reply");

        assert_eq!(ctx.latest_human_text(), Some("second"));
    }

    #[test]
    fn exchange_preserves_append_order() {
        let mut ctx = ChatContext::new("sys");
        for i in 0..5 {
            ctx.push_human(format!("h{i}"));
            ctx.push_assistant(format!("a{i}"));
        }
        let contents: Vec<&str> = ctx.turns()[1..]
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(
            contents,
            ["h0", "a0", "h1", "a1", "h2", "a2", "h3", "a3", "h4", "a4"]
        );
    }
}
