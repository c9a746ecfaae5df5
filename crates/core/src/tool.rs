//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools let the model trigger side effects by writing
//! `TOOL: name | ARGS: args` in its reply. Every tool takes a single string
//! argument (possibly empty) and produces a human-readable string.
//!
//! The registry is the error boundary: tool errors and timeouts are turned
//! into `❌`-prefixed strings, so a failing tool never crashes the agent loop.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};
use crate::error::ToolError;

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name the model uses to call this tool (e.g., "list_files").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// Argument placeholder shown to the model, e.g. `<command>` or `[path]`.
    /// `None` for tools that take no argument.
    fn usage(&self) -> Option<&str> {
        None
    }

    /// Run the tool. `args` is empty when the model gave no `ARGS:` part.
    async fn invoke(&self, args: &str) -> std::result::Result<String, ToolError>;
}

/// The result of dispatching one invocation through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The tool ran; `output` is its result or a rendered error string.
    Completed { output: String, success: bool },
    /// No tool with that name is registered.
    Unknown,
}

/// A registry of named tools.
///
/// Built once at startup from the builtin set merged with any extension
/// sets, then shared behind an `Arc` and never mutated again.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
    timeout: Duration,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the upper bound on a single invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Move every tool of `other` into this registry (later sets win).
    pub fn merge(&mut self, other: ToolRegistry) {
        self.tools.extend(other.tools);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render the tool list in the text protocol the model is asked to follow.
    pub fn describe(&self) -> String {
        let mut out = String::from("Available tools:\n");
        for tool in self.tools.values() {
            match tool.usage() {
                Some(usage) => out.push_str(&format!(
                    "- TOOL: {} | ARGS: {} - {}\n",
                    tool.name(),
                    usage,
                    tool.description()
                )),
                None => out.push_str(&format!(
                    "- TOOL: {} - {}\n",
                    tool.name(),
                    tool.description()
                )),
            }
        }
        out
    }

    /// Invoke a tool by name, converting every failure into a string.
    pub async fn invoke(&self, name: &str, args: &str) -> ToolOutcome {
        let Some(tool) = self.tools.get(name) else {
            return ToolOutcome::Unknown;
        };

        debug!(tool = %name, args = %args, "Invoking tool");
        let result = match tokio::time::timeout(self.timeout, tool.invoke(args)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                tool_name: name.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
        };

        match result {
            Ok(output) => ToolOutcome::Completed { output, success: true },
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool failed");
                ToolOutcome::Completed {
                    output: format!("❌ {e}"),
                    success: false,
                }
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn usage(&self) -> Option<&str> { Some("<text>") }
        async fn invoke(&self, args: &str) -> std::result::Result<String, ToolError> {
            Ok(args.to_string())
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str { "broken" }
        fn description(&self) -> &str { "Always fails" }
        async fn invoke(&self, _args: &str) -> std::result::Result<String, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "disk on fire".into(),
            })
        }
    }

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str { "slow" }
        fn description(&self) -> &str { "Never finishes in time" }
        async fn invoke(&self, _args: &str) -> std::result::Result<String, ToolError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("late".into())
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[test]
    fn merge_combines_sets() {
        let mut builtin = ToolRegistry::new();
        builtin.register(Box::new(EchoTool));
        let mut extension = ToolRegistry::new();
        extension.register(Box::new(BrokenTool));

        builtin.merge(extension);
        assert_eq!(builtin.len(), 2);
        assert!(builtin.contains("broken"));
    }

    #[test]
    fn describe_uses_text_protocol() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(BrokenTool));
        let text = registry.describe();
        assert!(text.contains("- TOOL: echo | ARGS: <text> - Echoes back the input"));
        assert!(text.contains("- TOOL: broken - Always fails"));
    }

    #[tokio::test]
    async fn invoke_returns_output() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let outcome = registry.invoke("echo", "hello world").await;
        assert_eq!(
            outcome,
            ToolOutcome::Completed { output: "hello world".into(), success: true }
        );
    }

    #[tokio::test]
    async fn invoke_missing_tool_is_unknown() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.invoke("nope", "").await, ToolOutcome::Unknown);
    }

    #[tokio::test]
    async fn failing_tool_becomes_error_string() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(BrokenTool));
        match registry.invoke("broken", "").await {
            ToolOutcome::Completed { output, success } => {
                assert!(!success);
                assert!(output.starts_with("❌"));
                assert!(output.contains("disk on fire"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tool_times_out() {
        let mut registry = ToolRegistry::new().with_timeout(Duration::from_secs(2));
        registry.register(Box::new(SlowTool));
        match registry.invoke("slow", "").await {
            ToolOutcome::Completed { output, success } => {
                assert!(!success);
                assert!(output.contains("timed out"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
