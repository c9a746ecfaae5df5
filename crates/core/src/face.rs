//! Face state: what the renderer needs to animate the companion.
//!
//! The renderer only cares about two booleans. Pushing them is best-effort:
//! implementations swallow every failure, so a missing face never affects
//! the conversation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The two-field state consumed by the face renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceState {
    pub talking: bool,
    pub listening: bool,
}

impl FaceState {
    pub const IDLE: FaceState = FaceState { talking: false, listening: false };
    pub const TALKING: FaceState = FaceState { talking: true, listening: false };
    pub const LISTENING: FaceState = FaceState { talking: false, listening: true };

    /// Parse a state name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "idle" => Some(Self::IDLE),
            "talking" | "talk" => Some(Self::TALKING),
            "listening" | "listen" => Some(Self::LISTENING),
            _ => None,
        }
    }
}

/// Side-effect interface for pushing face state.
#[async_trait]
pub trait FaceNotifier: Send + Sync {
    /// Push a state. Returns whether it was delivered; never errors.
    async fn set(&self, state: FaceState) -> bool;
}

/// A notifier that drops every update. Default for tests and headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFace;

#[async_trait]
impl FaceNotifier for NoopFace {
    async fn set(&self, _state: FaceState) -> bool {
        false
    }
}
