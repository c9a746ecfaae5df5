//! Shared test helpers for agent tests.

use async_trait::async_trait;
use lucy_core::error::{ProviderError, ToolError};
use lucy_core::provider::{Provider, ProviderRequest, ProviderResponse};
use lucy_core::tool::Tool;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A provider that returns a sequence of scripted results and records every
/// request it receives.
///
/// Panics if more calls are made than results provided.
pub struct ScriptedProvider {
    results: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(results: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds with the given replies, in order.
    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(ProviderResponse::text(*r))).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(ProviderError::Network("connection refused".into()))])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        requests.push(request);

        self.results.lock().unwrap().pop_front().unwrap_or_else(|| {
            panic!("ScriptedProvider: no more results (call #{call})")
        })
    }
}

/// A tool that echoes its arguments.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Repeat the arguments"
    }

    fn usage(&self) -> Option<&str> {
        Some("<text>")
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        Ok(format!("echo: {args}"))
    }
}

/// A tool that always fails.
pub struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn invoke(&self, _args: &str) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "broken".into(),
            reason: "disk on fire".into(),
        })
    }
}
