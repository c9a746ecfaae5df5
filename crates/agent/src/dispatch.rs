//! Tool dispatch loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  context ──► backend ──► reply               │
//! │                            │                 │
//! │            SUMMARY: ───────┼──► done         │
//! │            TOOL: ──► registry ──► result     │
//! │                            │     appended as │
//! │                            │     user turn   │
//! │                            └──► loop         │
//! │            plain ──► finish, or nudge & loop │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Every reply and tool result is appended to the window before the next
//! backend call. The loop never runs more than `max_iterations` backend
//! calls.

use crate::events::{EventSink, TurnEvent};
use crate::profile::SamplingProfile;
use crate::protocol::{self, ReplyShape};
use lucy_core::error::ProviderError;
use lucy_core::message::Role;
use lucy_core::provider::Provider;
use lucy_core::tool::{ToolOutcome, ToolRegistry};
use lucy_memory::window::ConversationWindow;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const TOOL_RESULT_PREFIX: &str = "TOOL RESULT: ";

/// What to do with a reply that is neither a tool call nor a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlainReplyPolicy {
    /// Treat it as the final answer.
    Finish,
    /// Append it, follow up with this user turn, and keep going.
    Nudge(String),
}

/// How a dispatch run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model wrote `SUMMARY:`.
    Summary(String),
    /// A plain reply under [`PlainReplyPolicy::Finish`].
    Reply(String),
    /// The model named a tool that is not registered.
    UnknownTool(String),
    /// The iteration budget ran out.
    Exhausted { last_result: Option<String> },
}

impl LoopOutcome {
    /// The user-visible text for this outcome.
    pub fn text(&self) -> String {
        match self {
            LoopOutcome::Summary(text) | LoopOutcome::Reply(text) => text.clone(),
            LoopOutcome::UnknownTool(name) => format!("❌ Unknown tool: {name}"),
            LoopOutcome::Exhausted { last_result: Some(result) } => result.clone(),
            LoopOutcome::Exhausted { last_result: None } => {
                "I ran out of steps before finishing.".to_string()
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoopOutcome::UnknownTool(_))
    }
}

/// The result of one dispatch run.
#[derive(Debug, Clone)]
pub struct LoopResult {
    pub outcome: LoopOutcome,
    /// Backend calls made
    pub iterations: usize,
    /// Names of the tools that ran, in order
    pub tools_used: Vec<String>,
}

/// Drives the reply protocol against a tool registry.
pub struct ToolLoop {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    model: String,
    profile: SamplingProfile,
    max_iterations: usize,
    plain_reply: PlainReplyPolicy,
    events: EventSink,
}

impl ToolLoop {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, model: impl Into<String>) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            profile: SamplingProfile::ASSIST,
            max_iterations: 5,
            plain_reply: PlainReplyPolicy::Finish,
            events: EventSink::none(),
        }
    }

    pub fn with_profile(mut self, profile: SamplingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_plain_reply(mut self, policy: PlainReplyPolicy) -> Self {
        self.plain_reply = policy;
        self
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Run until a terminal reply, an unknown tool, or the iteration budget.
    ///
    /// The caller appends the triggering user turn first. Backend failures
    /// are returned as-is; turns appended before the failure stay in the
    /// window.
    pub async fn run(&self, window: &mut ConversationWindow) -> Result<LoopResult, ProviderError> {
        let mut tools_used = Vec::new();
        let mut last_result = None;

        for iteration in 1..=self.max_iterations {
            self.events.emit(TurnEvent::Thinking);
            let request = self.profile.request(&self.model, window.turns().to_vec());
            let reply = self.provider.complete(request).await?.content;
            debug!(iteration, reply = %reply, "Backend reply");
            if reply.trim().is_empty() {
                return Err(ProviderError::MalformedResponse("Empty reply".into()));
            }

            let outcome = match protocol::parse(&reply) {
                ReplyShape::Terminal(summary) => {
                    window.append(Role::Assistant, &reply);
                    Some(LoopOutcome::Summary(summary))
                }

                ReplyShape::Invoke(invocation) => {
                    let args = invocation.args.unwrap_or_default();
                    self.events.emit(TurnEvent::Tool {
                        tool: invocation.name.clone(),
                        args: args.clone(),
                    });

                    match self.tools.invoke(&invocation.name, &args).await {
                        ToolOutcome::Completed { output, success } => {
                            debug!(tool = %invocation.name, success, "Tool finished");
                            self.events.emit(TurnEvent::ToolResult {
                                tool: invocation.name.clone(),
                                result: output.clone(),
                            });
                            window.append(Role::Assistant, &reply);
                            window.append(Role::User, format!("{TOOL_RESULT_PREFIX}{output}"));
                            tools_used.push(invocation.name);
                            last_result = Some(output);
                            None
                        }
                        ToolOutcome::Unknown => {
                            warn!(tool = %invocation.name, "Model asked for an unknown tool");
                            window.append(Role::Assistant, &reply);
                            window.append(
                                Role::User,
                                format!("ERROR: Unknown tool '{}'", invocation.name),
                            );
                            let outcome = LoopOutcome::UnknownTool(invocation.name);
                            self.events.emit(TurnEvent::Error { content: outcome.text() });
                            Some(outcome)
                        }
                    }
                }

                ReplyShape::PlainReply(text) => {
                    window.append(Role::Assistant, &reply);
                    match &self.plain_reply {
                        PlainReplyPolicy::Finish => Some(LoopOutcome::Reply(text)),
                        PlainReplyPolicy::Nudge(nudge) => {
                            window.append(Role::User, nudge);
                            None
                        }
                    }
                }
            };

            if let Some(outcome) = outcome {
                return Ok(LoopResult {
                    outcome,
                    iterations: iteration,
                    tools_used,
                });
            }
        }

        info!(max = self.max_iterations, "Tool loop hit its iteration limit");
        Ok(LoopResult {
            outcome: LoopOutcome::Exhausted { last_result },
            iterations: self.max_iterations,
            tools_used,
        })
    }
}
