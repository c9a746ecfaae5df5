//! Conversation window: the full session log plus the bounded view sent to
//! the model.
//!
//! Every appended turn lands in both sequences. Only the context view is
//! ever trimmed; the log keeps every turn, in order, for the transcript.

use lucy_core::message::{Role, Turn};

#[derive(Debug, Clone, Default)]
pub struct ConversationWindow {
    log: Vec<Turn>,
    context: Vec<Turn>,
}

impl ConversationWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the context with system turns. They are not part of the log.
    pub fn with_preamble(mut self, turns: impl IntoIterator<Item = Turn>) -> Self {
        let mut preamble: Vec<Turn> = turns.into_iter().collect();
        preamble.append(&mut self.context);
        self.context = preamble;
        self
    }

    /// Append a turn, stamped now, to both the log and the context.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> &Turn {
        let turn = Turn::new(role, content);
        self.context.push(turn.clone());
        self.log.push(turn);
        &self.log[self.log.len() - 1]
    }

    /// The most recent `max_turns` context entries, oldest first.
    ///
    /// A plain tail slice: it can cut off the leading system turn, so it is
    /// for inspection only. Requests to the model use [`Self::turns`].
    pub fn context(&self, max_turns: usize) -> &[Turn] {
        let start = self.context.len().saturating_sub(max_turns);
        &self.context[start..]
    }

    /// The whole context view. This is what the model sees: `trim_to`
    /// keeps it bounded and always headed by the system turn.
    pub fn turns(&self) -> &[Turn] {
        &self.context
    }

    /// Every turn appended this session.
    pub fn log(&self) -> &[Turn] {
        &self.log
    }

    /// When the context holds more than `max_size` turns, replace it with
    /// `system_turn` followed by the last `keep_tail` turns.
    ///
    /// Returns whether anything was dropped.
    pub fn trim_to(&mut self, system_turn: Turn, max_size: usize, keep_tail: usize) -> bool {
        if self.context.len() <= max_size {
            return false;
        }
        let tail = self.context.split_off(self.context.len().saturating_sub(keep_tail));
        self.context.clear();
        self.context.push(system_turn);
        self.context.extend(tail);
        true
    }
}
