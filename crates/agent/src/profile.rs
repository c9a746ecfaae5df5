//! Sampling profiles for the different conversation modes.

use lucy_core::message::Turn;
use lucy_core::provider::ProviderRequest;

/// Per-mode backend parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingProfile {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl SamplingProfile {
    /// Short, lively replies for talking with a child.
    pub const CHAT: SamplingProfile = SamplingProfile {
        temperature: 0.8,
        max_tokens: Some(150),
        timeout_secs: 30,
    };

    /// Tool-enabled assistant turns.
    pub const ASSIST: SamplingProfile = SamplingProfile {
        temperature: 0.7,
        max_tokens: Some(500),
        timeout_secs: 120,
    };

    /// Near-deterministic system audit.
    pub const AUDIT: SamplingProfile = SamplingProfile {
        temperature: 0.1,
        max_tokens: None,
        timeout_secs: 120,
    };

    pub fn request(&self, model: &str, messages: Vec<Turn>) -> ProviderRequest {
        ProviderRequest {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
            ..ProviderRequest::new(model, messages)
        }
    }
}

impl Default for SamplingProfile {
    fn default() -> Self {
        Self::CHAT
    }
}
