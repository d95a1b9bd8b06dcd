//! Conversation memory — a bounded rolling buffer of chat turns.
//!
//! One instance per user session, owned exclusively by that session's
//! agent. The buffer itself is unbounded; boundedness comes from callers
//! only ever surfacing the last-N window to the model. Appends truncate
//! overlong content so a single pasted wall of text cannot blow up the
//! prompt.

use crate::message::{ChatMessage, Role};
use crate::text::truncate_chars;

/// Marker appended to message content cut at the character cap.
pub const TRUNCATION_MARKER: &str = "... [truncado]";

/// Default number of messages surfaced to the model.
pub const DEFAULT_WINDOW: usize = 8;

/// Default per-message character cap for stored content.
pub const DEFAULT_MAX_CHARS: usize = 800;

/// Rolling conversation buffer with per-message truncation.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    entries: Vec<ChatMessage>,
    window: usize,
    max_chars: usize,
}

impl ConversationMemory {
    /// Create a memory surfacing at most `window` messages, storing at most
    /// `max_chars` characters per message.
    pub fn new(window: usize, max_chars: usize) -> Self {
        Self {
            entries: Vec::new(),
            window,
            max_chars,
        }
    }

    /// Append a turn, truncating content beyond the cap. Never fails.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        let content = truncate_chars(&content.into(), self.max_chars, TRUNCATION_MARKER);
        self.entries.push(ChatMessage { role, content });
    }

    /// The last `n` messages in insertion order. Does not mutate the buffer.
    pub fn recent(&self, n: usize) -> &[ChatMessage] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// The last messages within the configured window.
    pub fn window(&self) -> &[ChatMessage] {
        self.recent(self.window)
    }

    /// Every stored message, oldest first.
    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coarse token estimate: total stored characters divided by 4.
    pub fn approx_tokens(&self) -> usize {
        let chars: usize = self.entries.iter().map(|m| m.content.chars().count()).sum();
        chars / 4
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_CHARS)
    }
}
