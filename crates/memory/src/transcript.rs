//! Session transcripts.
//!
//! One session per agent instance. On teardown the full turn log is written
//! to `conversations/conversation_YYYYmmdd_HHMMSS.json` under the memory
//! directory.

use chrono::{DateTime, Local, Utc};
use lucy_core::error::MemoryError;
use lucy_core::message::Turn;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// The persisted shape of one finished session.
#[derive(Debug, Serialize)]
pub struct Transcript<'a> {
    pub session_id: &'a str,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub messages: &'a [Turn],
    pub facts_learned: usize,
}

#[derive(Debug)]
pub struct Session {
    id: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    facts_learned: usize,
    dir: Option<PathBuf>,
}

impl Session {
    /// Start a session whose transcript goes into `dir`.
    pub fn start(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::ephemeral()
        }
    }

    /// A session that never writes a transcript.
    pub fn ephemeral() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            ended_at: None,
            facts_learned: 0,
            dir: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Count one fact write made during this session.
    pub fn record_fact(&mut self) {
        self.facts_learned += 1;
    }

    pub fn facts_learned(&self) -> usize {
        self.facts_learned
    }

    /// Close the session and flush `messages` to a transcript file.
    ///
    /// The first call closes the session; later calls do nothing. An empty
    /// log writes no file. Write failures are logged and swallowed.
    pub fn end(&mut self, messages: &[Turn]) -> Option<PathBuf> {
        if self.is_ended() {
            return None;
        }
        let ended_at = Utc::now();
        self.ended_at = Some(ended_at);

        if messages.is_empty() {
            return None;
        }
        let dir = self.dir.as_ref()?;

        let transcript = Transcript {
            session_id: &self.id,
            started_at: self.started_at,
            ended_at,
            messages,
            facts_learned: self.facts_learned,
        };

        match write_transcript(dir, &transcript) {
            Ok(path) => {
                info!(path = %path.display(), turns = messages.len(), "Conversation saved");
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, "Conversation transcript not saved");
                None
            }
        }
    }
}

fn write_transcript(dir: &Path, transcript: &Transcript<'_>) -> Result<PathBuf, MemoryError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| MemoryError::Storage(format!("Failed to create {}: {e}", dir.display())))?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut path = dir.join(format!("conversation_{stamp}.json"));
    // Two sessions ending in the same second must not clobber each other.
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("conversation_{stamp}_{n}.json"));
        n += 1;
    }

    let json = serde_json::to_string_pretty(transcript).map_err(|e| MemoryError::Serialization {
        what: "transcript".into(),
        reason: e.to_string(),
    })?;
    std::fs::write(&path, json)
        .map_err(|e| MemoryError::Storage(format!("Failed to write {}: {e}", path.display())))?;
    Ok(path)
}
