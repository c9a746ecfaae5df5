//! Autonomous system audit.
//!
//! A single kickoff prompt, then the tool loop under the audit profile with
//! a nudge for every reply that neither calls a tool nor summarizes.

use crate::dispatch::{LoopResult, PlainReplyPolicy, ToolLoop};
use crate::events::EventSink;
use crate::profile::SamplingProfile;
use crate::protocol;
use lucy_core::error::ProviderError;
use lucy_core::message::{Role, Turn};
use lucy_core::provider::Provider;
use lucy_core::tool::ToolRegistry;
use lucy_memory::window::ConversationWindow;
use std::sync::Arc;
use tracing::info;

pub const AUDIT_KICKOFF: &str = "Lucy, perform your standard system audit. Ensure everything is running correctly. If the service is stopped, restart it.";
pub const AUDIT_NUDGE: &str = "Please continue with the audit protocol using TOOL calls.";

pub struct Audit {
    tool_loop: ToolLoop,
    system_prompt: String,
    tools: Arc<ToolRegistry>,
}

impl Audit {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        max_iterations: usize,
    ) -> Self {
        let tool_loop = ToolLoop::new(provider, tools.clone(), model)
            .with_profile(SamplingProfile::AUDIT)
            .with_max_iterations(max_iterations)
            .with_plain_reply(PlainReplyPolicy::Nudge(AUDIT_NUDGE.to_string()));
        Self {
            tool_loop,
            system_prompt: system_prompt.into(),
            tools,
        }
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.tool_loop = self.tool_loop.with_events(events);
        self
    }

    /// Run the audit; returns the loop result and the full exchange.
    pub async fn run(&self) -> Result<(LoopResult, ConversationWindow), ProviderError> {
        let system = Turn::system(format!(
            "{}\n\n{}\n{}",
            self.system_prompt,
            self.tools.describe(),
            protocol::protocol_instructions()
        ));
        let mut window = ConversationWindow::new().with_preamble([system]);
        window.append(Role::User, AUDIT_KICKOFF);

        info!(tools = self.tools.len(), "Starting system audit");
        let result = self.tool_loop.run(&mut window).await?;
        info!(iterations = result.iterations, tools_used = ?result.tools_used, "Audit finished");
        Ok((result, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::LoopOutcome;
    use crate::test_helpers::{EchoTool, ScriptedProvider};

    fn tools() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        Arc::new(registry)
    }

    #[tokio::test]
    async fn audit_nudges_then_summarizes() {
        let provider = Arc::new(ScriptedProvider::replies(&[
            "Everything looks okay to me.",
            "TOOL: echo | ARGS: service status",
            "SUMMARY: service is active",
        ]));
        let audit = Audit::new(provider.clone(), tools(), "m", "You are Lucy", 10);

        let (result, window) = audit.run().await.unwrap();
        assert_eq!(result.outcome, LoopOutcome::Summary("service is active".into()));
        assert_eq!(result.iterations, 3);

        let log: Vec<&str> = window.log().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(log[0], AUDIT_KICKOFF);
        assert_eq!(log[2], AUDIT_NUDGE);
        assert_eq!(log[4], "TOOL RESULT: echo: service status");

        let request = &provider.requests()[0];
        assert!((request.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(request.timeout_secs, 120);
    }

    #[tokio::test]
    async fn audit_respects_iteration_budget() {
        let provider = Arc::new(ScriptedProvider::replies(&["hmm", "hmm"]));
        let audit = Audit::new(provider.clone(), tools(), "m", "You are Lucy", 2);

        let (result, _) = audit.run().await.unwrap();
        assert_eq!(result.outcome, LoopOutcome::Exhausted { last_result: None });
        assert_eq!(provider.call_count(), 2);
    }
}
