//! Fact store: durable key/value memories grouped by category.
//!
//! The whole store is one JSON document:
//!
//! ```json
//! { "kids": { "current_child_name": { "value": "Alice", "learned_at": "...", "mentions": 2 } },
//!   "world": {}, "preferences": {} }
//! ```
//!
//! It is loaded once when opened and written back synchronously after every
//! mutation. Persistence is best-effort: a corrupt document loads as an
//! empty store and write failures are logged, never returned.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use lucy_core::error::MemoryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Categories that always exist, even when empty.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["kids", "world", "preferences"];

/// Returned by [`FactStore::summary`] when nothing has been learned.
pub const EMPTY_SUMMARY: &str = "Nothing yet";

/// One remembered value. Identity is its `(category, key)` position in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub value: String,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub learned_at: DateTime<Utc>,
    pub mentions: u32,
}

pub type Category = BTreeMap<String, Fact>;

/// RFC 3339, or ISO-8601 without an offset read as local time.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(serde::de::Error::custom)?;
    Ok(naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc()))
}

/// A category → key → fact mapping with optional file backing.
#[derive(Debug)]
pub struct FactStore {
    path: Option<PathBuf>,
    categories: BTreeMap<String, Category>,
}

impl FactStore {
    /// Open the store backed by `path`, creating its directory if needed.
    ///
    /// A missing file starts empty; the file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Could not create memory directory");
            }
        }

        let mut categories = Self::load_from_disk(&path);
        Self::ensure_defaults(&mut categories);
        debug!(path = %path.display(), facts = count(&categories), "Fact store loaded");

        Self {
            path: Some(path),
            categories,
        }
    }

    /// A store with no backing file. Nothing is ever written to disk.
    pub fn in_memory() -> Self {
        let mut categories = BTreeMap::new();
        Self::ensure_defaults(&mut categories);
        Self {
            path: None,
            categories,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn ensure_defaults(categories: &mut BTreeMap<String, Category>) {
        for name in DEFAULT_CATEGORIES {
            categories.entry(name.to_string()).or_default();
        }
    }

    /// Read the document, skipping anything that does not parse.
    fn load_from_disk(path: &Path) -> BTreeMap<String, Category> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(),
        };

        let raw: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
            match serde_json::from_str(&content) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Fact document is corrupt, starting empty");
                    return BTreeMap::new();
                }
            };

        raw.into_iter()
            .map(|(category, facts)| {
                let facts = facts
                    .into_iter()
                    .filter_map(|(key, value)| match serde_json::from_value::<Fact>(value) {
                        Ok(fact) => Some((key, fact)),
                        Err(e) => {
                            warn!(category = %category, key = %key, error = %e, "Skipping corrupted fact");
                            None
                        }
                    })
                    .collect();
                (category, facts)
            })
            .collect()
    }

    fn flush(&self) -> Result<(), MemoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.categories).map_err(|e| {
            MemoryError::Serialization {
                what: "fact store".into(),
                reason: e.to_string(),
            }
        })?;

        std::fs::write(path, json)
            .map_err(|e| MemoryError::Storage(format!("Failed to write {}: {e}", path.display())))
    }

    /// Create or overwrite the fact at `(category, key)`.
    ///
    /// Re-learning bumps `mentions` and replaces `value` and `learned_at`.
    /// Returns the mention count after the write.
    pub fn remember(&mut self, category: &str, key: &str, value: &str) -> u32 {
        let facts = self.categories.entry(category.to_string()).or_default();
        let mentions = facts.get(key).map_or(1, |f| f.mentions + 1);
        facts.insert(
            key.to_string(),
            Fact {
                value: value.to_string(),
                learned_at: Utc::now(),
                mentions,
            },
        );
        debug!(category, key, mentions, "Remembered fact");

        if let Err(e) = self.flush() {
            warn!(error = %e, "Fact not persisted");
        }
        mentions
    }

    /// The whole store.
    pub fn recall_all(&self) -> &BTreeMap<String, Category> {
        &self.categories
    }

    /// One category, or an empty mapping when it was never written.
    pub fn recall(&self, category: &str) -> Category {
        self.categories.get(category).cloned().unwrap_or_default()
    }

    pub fn get(&self, category: &str, key: &str) -> Option<&Fact> {
        self.categories.get(category)?.get(key)
    }

    /// `"category: N things"` for every non-empty category, or [`EMPTY_SUMMARY`].
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .categories
            .iter()
            .filter(|(_, facts)| !facts.is_empty())
            .map(|(name, facts)| format!("{name}: {} things", facts.len()))
            .collect();

        if parts.is_empty() {
            EMPTY_SUMMARY.to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn fact_count(&self) -> usize {
        count(&self.categories)
    }
}

fn count(categories: &BTreeMap<String, Category>) -> usize {
    categories.values().map(BTreeMap::len).sum()
}
