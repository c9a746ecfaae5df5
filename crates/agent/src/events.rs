//! Events emitted while a turn is processed.
//!
//! Streaming transports forward these to their clients as they happen. The
//! wire names match the browser chat protocol: `system`, `user`, `thinking`,
//! `tool`, `tool_result`, `assistant`, `error`.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// Transport-level notice (connection banner and the like).
    System { content: String },

    /// Echo of the utterance being processed.
    User { content: String },

    /// A backend call is about to be made.
    Thinking,

    /// The model asked for a tool.
    Tool { tool: String, args: String },

    /// The tool finished (successfully or with an error string).
    ToolResult { tool: String, result: String },

    /// The final answer for this turn.
    Assistant { content: String },

    /// A user-visible failure.
    Error { content: String },
}

/// Optional sink; sending never blocks and a closed receiver is ignored.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<UnboundedSender<TurnEvent>>);

impl EventSink {
    pub fn new(tx: UnboundedSender<TurnEvent>) -> Self {
        Self(Some(tx))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn emit(&self, event: TurnEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}
