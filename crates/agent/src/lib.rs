//! The companion agent loop.
//!
//! Each turn follows the same path:
//!
//! 1. **Receive** an utterance from a transport (terminal, browser, voice)
//! 2. **Build context** (system prompt + memory note + recent turns)
//! 3. **Ask the backend** with the sampling profile of the current mode
//! 4. **If the reply is `TOOL:`**: run the tool, append the result, loop back
//!    to step 3
//! 5. **Otherwise**: learn what can be learned from the utterance, trim the
//!    context and hand the reply back to the transport
//!
//! The tool loop stops on `SUMMARY:`, a plain reply, an unknown tool, or the
//! iteration limit.

pub mod audit;
pub mod companion;
pub mod dispatch;
pub mod events;
pub mod extractor;
pub mod idle;
pub mod profile;
pub mod protocol;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use audit::Audit;
pub use companion::{CompanionAgent, FALLBACK_REPLY};
pub use dispatch::{LoopOutcome, LoopResult, PlainReplyPolicy, ToolLoop};
pub use events::{EventSink, TurnEvent};
pub use extractor::{ExtractedFact, extract};
pub use idle::{IDLE_THOUGHTS, IdlePolicy};
pub use profile::SamplingProfile;
pub use protocol::{Invocation, ReplyShape};
