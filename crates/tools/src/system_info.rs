//! System info tool.

use async_trait::async_trait;
use lucy_core::error::ToolError;
use lucy_core::tool::Tool;

pub struct SystemInfoTool;

#[async_trait]
impl Tool for SystemInfoTool {
    fn name(&self) -> &str {
        "system_info"
    }

    fn description(&self) -> &str {
        "Get system information (platform, version, etc.)"
    }

    async fn invoke(&self, _args: &str) -> Result<String, ToolError> {
        let info = serde_json::json!({
            "platform": std::env::consts::OS,
            "family": std::env::consts::FAMILY,
            "machine": std::env::consts::ARCH,
            "cpus": std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            "lucy": env!("CARGO_PKG_VERSION"),
        });
        let pretty = serde_json::to_string_pretty(&info).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })?;
        Ok(format!("💻 System Info:\n{pretty}"))
    }
}
