//! # Lucy Core
//!
//! Domain types, traits, and error definitions for the Lucy companion runtime.
//! Every other crate depends inward on this one.
//!
//! ## Design Philosophy
//!
//! Each seam with the outside world is a trait defined here:
//! - [`Provider`] for the LLM backend
//! - [`Tool`] for agent-invocable capabilities
//! - [`FaceNotifier`] for pushing face state to the renderer
//!
//! Implementations live in their own crates, so tests can swap in scripted
//! providers, fake tools, and a silent face.

pub mod error;
pub mod face;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, MemoryError, ProviderError, Result, ToolError};
pub use face::{FaceNotifier, FaceState, NoopFace};
pub use message::{Role, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use tool::{Tool, ToolOutcome, ToolRegistry};
