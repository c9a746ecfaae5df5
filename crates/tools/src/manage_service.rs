//! Manage service tool: control the one systemd unit the companion looks after.

use async_trait::async_trait;
use lucy_core::error::ToolError;
use lucy_core::tool::Tool;
use tokio::process::Command;
use tracing::{debug, warn};

const ACTIONS: [&str; 4] = ["status", "start", "stop", "restart"];

pub struct ManageServiceTool {
    unit: String,
    program: String,
}

impl ManageServiceTool {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            program: "systemctl".into(),
        }
    }

    /// Use a different control program (tests substitute `echo`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl Tool for ManageServiceTool {
    fn name(&self) -> &str {
        "manage_service"
    }

    fn description(&self) -> &str {
        "Check, start, stop or restart the managed service"
    }

    fn usage(&self) -> Option<&str> {
        Some("<status|start|stop|restart>")
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let action = args.trim().to_lowercase();
        if !ACTIONS.contains(&action.as_str()) {
            return Err(ToolError::InvalidArguments(format!(
                "Unknown service action '{action}', expected one of: {}",
                ACTIONS.join(", ")
            )));
        }

        debug!(unit = %self.unit, action = %action, "Managing service");
        let output = Command::new(&self.program)
            .args([action.as_str(), self.unit.as_str()])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() && action != "status" {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(unit = %self.unit, action = %action, "Service command failed");
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: if stderr.is_empty() { stdout } else { stderr },
            });
        }

        let body = if stdout.is_empty() { "Completed.".to_string() } else { stdout };
        Ok(format!("⚙️ Service {action}:\n{body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unknown_action() {
        let tool = ManageServiceTool::new("greenhouse.service");
        let result = tool.invoke("reboot").await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passes_action_and_unit() {
        let tool = ManageServiceTool::new("greenhouse.service").with_program("echo");
        let out = tool.invoke(" Restart ").await.unwrap();
        assert_eq!(out, "⚙️ Service restart:\nrestart greenhouse.service");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_success_reads_completed() {
        let tool = ManageServiceTool::new("greenhouse.service").with_program("true");
        let out = tool.invoke("start").await.unwrap();
        assert_eq!(out, "⚙️ Service start:\nCompleted.");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_control_is_error() {
        let tool = ManageServiceTool::new("greenhouse.service").with_program("false");
        assert!(matches!(
            tool.invoke("stop").await,
            Err(ToolError::ExecutionFailed { .. })
        ));
    }
}
