//! Run command tool: execute whitelisted system commands.
//!
//! Only the first word is checked against the allowlist. On Unix the
//! command is spawned directly with whitespace-split arguments, no shell;
//! on Windows the allowlisted names (`dir`, `echo`, `time`) are `cmd`
//! builtins, so they go through `cmd /C`. Output is capped so a chatty
//! command cannot flood the model context.

use async_trait::async_trait;
use lucy_core::error::ToolError;
use lucy_core::tool::Tool;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

const OUTPUT_LIMIT: usize = 500;

/// Characters that would let a whitelisted command chain into another one.
const SHELL_METACHARACTERS: &[char] = &[';', '&', '|', '<', '>', '`', '$', '\n'];

pub struct RunCommandTool {
    allowed_commands: Vec<String>,
    timeout: Duration,
}

impl RunCommandTool {
    pub fn new(allowed_commands: Vec<String>, timeout: Duration) -> Self {
        Self {
            allowed_commands,
            timeout,
        }
    }

    fn base_command(command: &str) -> Option<String> {
        command.split_whitespace().next().map(str::to_lowercase)
    }

    fn is_command_allowed(&self, command: &str) -> bool {
        if command.contains(SHELL_METACHARACTERS) {
            return false;
        }
        match Self::base_command(command) {
            Some(base) => self.allowed_commands.iter().any(|a| *a == base),
            None => false,
        }
    }
}

/// Keep at most `limit` characters without splitting a code point.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(windows)]
fn build_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn build_command(command: &str) -> Command {
    let mut words = command.split_whitespace();
    let mut cmd = Command::new(words.next().unwrap_or_default());
    cmd.args(words);
    cmd
}

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Run safe shell commands (ls, pwd, etc.)"
    }

    fn usage(&self) -> Option<&str> {
        Some("<command>")
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let command = args.trim();
        let Some(base) = Self::base_command(command) else {
            return Err(ToolError::InvalidArguments("Empty command".into()));
        };

        if !self.is_command_allowed(command) {
            return Err(ToolError::PermissionDenied {
                tool_name: self.name().into(),
                reason: format!(
                    "Command '{base}' not in safe list: {}",
                    self.allowed_commands.join(", ")
                ),
            });
        }

        debug!(command = %command, "Executing command");

        let mut cmd = build_command(command);
        let child = cmd.kill_on_drop(true).output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::ExecutionFailed {
                    tool_name: self.name().into(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                warn!(command = %command, "Command timed out");
                return Err(ToolError::Timeout {
                    tool_name: self.name().into(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = if stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            stdout.to_string()
        };

        Ok(format!("🔧 Output:\n{}", truncate_chars(&text, OUTPUT_LIMIT)))
    }
}
