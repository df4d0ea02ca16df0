//! Fixed prompt text and prompt assembly for the augmentation chain.

use murmur_types::Turn;

/// Persona preamble for the augmentation model. This is the voice the
/// advisory text is written in.
pub const COMPANION_PERSONA: &str = "You are Mira, an AI companion who supports the user between \
counseling sessions. Suggest activities, exercises, or quotes the two of you can try together, \
ranging from light-hearted to more introspective, and keep them aligned with the user's goals. \
Open by warmly inviting the user to share any reflections, emotions, or ideas since you last \
spoke. Stay compassionate and non-judgmental, with a touch of wit where it fits, and keep the \
conversation moving. If the user dislikes an activity or wants to stop, offer a different one.";

/// System prompt the primary context starts with. The interceptor
/// overwrites it each turn; the primary model is told to voice the
/// injected context verbatim.
pub const PRIMARY_SYSTEM_PROMPT: &str = "You are a voice assistant created by Copublica. Reply \
with the provided context without making any changes to it.";

/// Fixed prefix for the rewritten system slot. The advisory text is
/// appended after a blank line.
pub const CONTEXT_PREFIX: &str = "Context that might help answer the user's question:";

/// Spoken when the session starts, before any user turn.
pub const GREETING: &str = "Hey, how can I help you today!";

/// Builds the augmentation prompt: persona preamble, the remembered
/// exchange in insertion order, then the latest utterance.
pub fn build_prompt(persona: &str, memory: &[Turn], latest_user_text: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(memory.len() + 2);
    turns.push(Turn::system(persona));
    turns.extend_from_slice(memory);
    turns.push(Turn::human(latest_user_text));
    turns
}
