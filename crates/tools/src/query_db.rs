//! Query database tool: read-only SQL against the greenhouse SQLite file.
//!
//! The connection is opened read-only, so statements that write fail at the
//! database rather than being filtered here.

use async_trait::async_trait;
use lucy_core::error::ToolError;
use lucy_core::tool::Tool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row};
use std::path::PathBuf;
use tracing::debug;

const MAX_ROWS: usize = 50;

pub struct QueryDbTool {
    path: PathBuf,
}

impl QueryDbTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn failed(&self, e: impl std::fmt::Display) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: "query_db".into(),
            reason: e.to_string(),
        }
    }
}

/// Render one cell whatever its storage class.
fn cell(row: &SqliteRow, idx: usize) -> String {
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.unwrap_or_else(|| "NULL".into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
        return v.to_string();
    }
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
        return v.to_string();
    }
    if let Ok(Some(v)) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return format!("<blob {} bytes>", v.len());
    }
    "?".into()
}

#[async_trait]
impl Tool for QueryDbTool {
    fn name(&self) -> &str {
        "query_db"
    }

    fn description(&self) -> &str {
        "Run a read-only SQL query against the greenhouse database"
    }

    fn usage(&self) -> Option<&str> {
        Some("<sql>")
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let query = args.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments("Empty query".into()));
        }
        if !self.path.exists() {
            return Err(self.failed(format!("Database not found: {}", self.path.display())));
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true);
        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| self.failed(e))?;

        debug!(query = %query, "Running database query");
        let rows = sqlx::query(query)
            .fetch_all(&mut conn)
            .await
            .map_err(|e| self.failed(e))?;
        let _ = conn.close().await;

        let Some(first) = rows.first() else {
            return Ok("📊 Results:\nNo data.".into());
        };

        let header: Vec<&str> = first.columns().iter().map(|c| c.name()).collect();
        let mut out = format!("📊 Results:\n{}\n", header.join(" | "));
        for row in rows.iter().take(MAX_ROWS) {
            let cells: Vec<String> = (0..row.len()).map(|i| cell(row, i)).collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
        if rows.len() > MAX_ROWS {
            out.push_str(&format!("... and {} more rows\n", rows.len() - MAX_ROWS));
        }
        Ok(out)
    }
}
