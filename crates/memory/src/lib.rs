//! Memory for the Lucy companion.
//!
//! - [`FactStore`]: long-term facts, one JSON document shared across sessions
//! - [`ConversationWindow`]: the session log and the bounded model context
//! - [`Session`]: transcript bookkeeping, flushed once on teardown

pub mod facts;
pub mod transcript;
pub mod window;

pub use facts::{Fact, FactStore, DEFAULT_CATEGORIES, EMPTY_SUMMARY};
pub use transcript::{Session, Transcript};
pub use window::ConversationWindow;
