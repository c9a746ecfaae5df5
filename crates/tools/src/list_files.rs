//! List files tool: browse directories under the data root.

use crate::sandbox::resolve_under;
use async_trait::async_trait;
use lucy_core::error::ToolError;
use lucy_core::tool::Tool;
use std::path::PathBuf;

/// Entries shown before the listing is cut off.
const MAX_ENTRIES: usize = 20;

pub struct ListFilesTool {
    root: PathBuf,
}

impl ListFilesTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files in a directory"
    }

    fn usage(&self) -> Option<&str> {
        Some("[path]")
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let target = resolve_under(self.name(), &self.root, args)?;

        if !target.exists() {
            return Err(ToolError::InvalidArguments(format!(
                "Path does not exist: {}",
                target.display()
            )));
        }

        let mut reader = tokio::fs::read_dir(&target)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            entries.push((entry.file_name().to_string_lossy().to_string(), is_dir));
        }

        if entries.is_empty() {
            return Ok(format!("📁 Empty directory: {}", target.display()));
        }
        entries.sort();

        let mut out = format!("📁 Contents of {}:\n", target.display());
        for (name, is_dir) in entries.iter().take(MAX_ENTRIES) {
            let icon = if *is_dir { "📂" } else { "📄" };
            out.push_str(&format!("  {icon} {name}\n"));
        }
        if entries.len() > MAX_ENTRIES {
            out.push_str(&format!("  ... and {} more\n", entries.len() - MAX_ENTRIES));
        }
        Ok(out)
    }
}
