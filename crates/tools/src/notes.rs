//! Note tools: a scratchpad the assistant can write to and read back.
//!
//! Each note is one `note_YYYYmmdd_HHMMSS.txt` file, so name order is
//! chronological order.

use crate::run_command::truncate_chars;
use async_trait::async_trait;
use chrono::Local;
use lucy_core::error::ToolError;
use lucy_core::tool::Tool;
use std::path::{Path, PathBuf};

const RECENT_NOTES: usize = 5;
const PREVIEW_CHARS: usize = 200;

fn io_error(tool_name: &str, e: std::io::Error) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: tool_name.into(),
        reason: e.to_string(),
    }
}

pub struct WriteNoteTool {
    dir: PathBuf,
}

impl WriteNoteTool {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn next_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut path = self.dir.join(format!("note_{stamp}.txt"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("note_{stamp}_{n}.txt"));
            n += 1;
        }
        path
    }
}

#[async_trait]
impl Tool for WriteNoteTool {
    fn name(&self) -> &str {
        "write_note"
    }

    fn description(&self) -> &str {
        "Save a note to memory"
    }

    fn usage(&self) -> Option<&str> {
        Some("<content>")
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let content = args.trim();
        if content.is_empty() {
            return Err(ToolError::InvalidArguments("Note content is empty".into()));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(self.name(), e))?;

        let path = self.next_path();
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| io_error(self.name(), e))?;

        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        Ok(format!("📝 Note saved to: {name}"))
    }
}

pub struct ReadNotesTool {
    dir: PathBuf,
}

impl ReadNotesTool {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

async fn note_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut notes = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with("note_") && name.ends_with(".txt") {
            notes.push(entry.path());
        }
    }
    notes.sort();
    notes.reverse();
    Ok(notes)
}

#[async_trait]
impl Tool for ReadNotesTool {
    fn name(&self) -> &str {
        "read_notes"
    }

    fn description(&self) -> &str {
        "Read recent notes from memory"
    }

    async fn invoke(&self, _args: &str) -> Result<String, ToolError> {
        if !self.dir.exists() {
            return Ok("📝 No notes yet".into());
        }

        let notes = note_files(&self.dir)
            .await
            .map_err(|e| io_error(self.name(), e))?;
        if notes.is_empty() {
            return Ok("📝 No notes found".into());
        }

        let mut out = String::from("📝 Recent notes:\n\n");
        for path in notes.iter().take(RECENT_NOTES) {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| io_error(self.name(), e))?;
            let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            out.push_str(&format!(
                "--- {name} ---\n{}\n\n",
                truncate_chars(&content, PREVIEW_CHARS)
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let notes = dir.path().join("notes");

        let saved = WriteNoteTool::new(&notes).invoke("water the tomatoes").await.unwrap();
        assert!(saved.starts_with("📝 Note saved to: note_"));

        let out = ReadNotesTool::new(&notes).invoke("").await.unwrap();
        assert!(out.starts_with("📝 Recent notes:"));
        assert!(out.contains("water the tomatoes"));
    }

    #[tokio::test]
    async fn same_second_notes_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let tool = WriteNoteTool::new(dir.path());
        tool.invoke("one").await.unwrap();
        tool.invoke("two").await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn only_five_newest_with_previews() {
        let dir = TempDir::new().unwrap();
        for i in 0..7 {
            std::fs::write(
                dir.path().join(format!("note_20250101_00000{i}.txt")),
                format!("note {i} {}", "z".repeat(300)),
            )
            .unwrap();
        }

        let out = ReadNotesTool::new(dir.path()).invoke("").await.unwrap();
        assert!(out.contains("note_20250101_000006.txt"));
        assert!(out.contains("note_20250101_000002.txt"));
        assert!(!out.contains("note_20250101_000001.txt"));
        assert!(!out.contains(&"z".repeat(250)));
        assert!(out.find("000006").unwrap() < out.find("000005").unwrap());
    }

    #[tokio::test]
    async fn missing_directory() {
        let out = ReadNotesTool::new("/nonexistent/notes").invoke("").await.unwrap();
        assert_eq!(out, "📝 No notes yet");
    }

    #[tokio::test]
    async fn empty_note_rejected() {
        let dir = TempDir::new().unwrap();
        let result = WriteNoteTool::new(dir.path()).invoke("  ").await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
