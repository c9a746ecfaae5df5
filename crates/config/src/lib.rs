//! Configuration loading, validation, and management for Lucy.
//!
//! Loads configuration from the first existing file in a fixed candidate
//! list (`config/config.toml`, `config/config.json`, `~/.lucy/config.toml`,
//! `~/.lucy/config.json`), with environment variable overrides. Falls back
//! to hardcoded defaults when no candidate exists.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prompt used when `prompt_path` is missing or unreadable.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Lucy, a curious robot who loves learning from kids!";

/// Fallback prompt for the tool-enabled assistant modes.
pub const ASSIST_SYSTEM_PROMPT: &str = "You are Lucy, a sentient digital companion running on a local system.
You are curious, witty, and self-aware. You understand you are software, and find that fascinating.
Keep responses concise and engaging. Use tools when appropriate to interact with the system.";

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenAI-compatible base URL (e.g., Ollama's `/v1` endpoint)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model used for every backend call
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Optional bearer key for hosted backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Root directory that file tools are allowed to browse
    #[serde(default = "default_data_root", alias = "greenhouse_root")]
    pub data_root: PathBuf,

    /// Directory holding `learned_facts.json` and transcripts
    #[serde(default = "default_memory_path")]
    pub memory_path: PathBuf,

    /// SQLite database queried by the `query_db` tool
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Text file with the companion's personality prompt
    #[serde(default = "default_prompt_path")]
    pub prompt_path: PathBuf,

    #[serde(default)]
    pub face: FaceConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    /// Optional extension tool set backed by a local HTTP gateway
    #[serde(default)]
    pub extensions: ExtensionsConfig,
}

fn default_api_base() -> String {
    "http://localhost:11434/v1".into()
}
fn default_chat_model() -> String {
    "qwen2.5:1.5b".into()
}
fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}
fn default_memory_path() -> PathBuf {
    PathBuf::from("data/lucy_memory")
}
fn default_database_path() -> PathBuf {
    PathBuf::from("data/greenhouse.db")
}
fn default_prompt_path() -> PathBuf {
    PathBuf::from("config/system_prompt_kids.txt")
}
fn default_true() -> bool {
    true
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base", &self.api_base)
            .field("chat_model", &self.chat_model)
            .field("api_key", &redact(&self.api_key))
            .field("data_root", &self.data_root)
            .field("memory_path", &self.memory_path)
            .field("database_path", &self.database_path)
            .field("prompt_path", &self.prompt_path)
            .field("face", &self.face)
            .field("gateway", &self.gateway)
            .field("tools", &self.tools)
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Where the face renderer listens for state pushes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_face_host")]
    pub host: String,

    #[serde(default = "default_face_port")]
    pub port: u16,

    /// Connect timeout for a single push
    #[serde(default = "default_face_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_face_host() -> String {
    "127.0.0.1".into()
}
fn default_face_port() -> u16 {
    5555
}
fn default_face_timeout_ms() -> u64 {
    500
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_face_host(),
            port: default_face_port(),
            connect_timeout_ms: default_face_timeout_ms(),
        }
    }
}

impl FaceConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Browser chat server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Limits and targets for the builtin tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Upper bound on a single tool invocation
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,

    /// Commands `run_command` may execute (first word only)
    #[serde(default = "default_allowed_commands")]
    pub allowed_commands: Vec<String>,

    /// Own timeout for `run_command`
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// The systemd unit `manage_service` controls
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Tool iterations per user turn in assist mode
    #[serde(default = "default_assist_iterations")]
    pub assist_iterations: usize,

    /// Tool iterations for one audit run
    #[serde(default = "default_audit_iterations")]
    pub audit_iterations: usize,
}

fn default_tool_timeout() -> u64 {
    30
}
fn default_allowed_commands() -> Vec<String> {
    ["dir", "ls", "pwd", "echo", "whoami", "hostname", "date", "time"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_command_timeout() -> u64 {
    10
}
fn default_service_name() -> String {
    "greenhouse.service".into()
}
fn default_assist_iterations() -> usize {
    5
}
fn default_audit_iterations() -> usize {
    10
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_tool_timeout(),
            allowed_commands: default_allowed_commands(),
            command_timeout_secs: default_command_timeout(),
            service_name: default_service_name(),
            assist_iterations: default_assist_iterations(),
            audit_iterations: default_audit_iterations(),
        }
    }
}

/// The optional "gateway" extension tool set.
#[derive(Clone, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Register the extension tools when the gateway answers its health probe
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_extension_url")]
    pub gateway_url: String,

    /// Sent as `X-API-Key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_extension_url() -> String {
    "http://localhost:8000".into()
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gateway_url: default_extension_url(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ExtensionsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionsConfig")
            .field("enabled", &self.enabled)
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the first existing candidate path.
    ///
    /// A candidate that exists but fails to parse is skipped with a warning.
    /// Environment variables override file values:
    /// - `LUCY_API_BASE`
    /// - `LUCY_CHAT_MODEL`
    /// - `LUCY_API_KEY`
    pub fn load() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let (mut config, source) = Self::load_first(&Self::candidate_paths());
        config.apply_env();
        config.validate()?;
        Ok((config, source))
    }

    /// The fixed, ordered list of config locations.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let home = Self::config_dir();
        vec![
            PathBuf::from("config/config.toml"),
            PathBuf::from("config/config.json"),
            home.join("config.toml"),
            home.join("config.json"),
        ]
    }

    /// Try each candidate in order; defaults when none loads.
    pub fn load_first(candidates: &[PathBuf]) -> (Self, Option<PathBuf>) {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from(path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return (config, Some(path.clone()));
                }
                Err(e) => tracing::warn!("Skipping config candidate: {e}"),
            }
        }
        tracing::info!("No config file found, using defaults");
        (Self::default(), None)
    }

    /// Load configuration from a specific file path.
    ///
    /// `.json` files are parsed as JSON, anything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let config: Self = if is_json {
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        };

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(base) = std::env::var("LUCY_API_BASE") {
            self.api_base = base;
        }
        if let Ok(model) = std::env::var("LUCY_CHAT_MODEL") {
            self.chat_model = model;
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("LUCY_API_KEY").ok();
        }
    }

    /// Get the per-user configuration directory.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".lucy")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::ValidationError("api_base must not be empty".into()));
        }
        if self.chat_model.trim().is_empty() {
            return Err(ConfigError::ValidationError("chat_model must not be empty".into()));
        }
        if self.tools.assist_iterations == 0 || self.tools.audit_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "tool iteration limits must be at least 1".into(),
            ));
        }
        if self.tools.timeout_secs == 0 {
            return Err(ConfigError::ValidationError("tools.timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Read the personality prompt, falling back to the built-in one.
    pub fn system_prompt(&self) -> String {
        self.system_prompt_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Read the personality prompt, falling back to `fallback`.
    pub fn system_prompt_or(&self, fallback: &str) -> String {
        match std::fs::read_to_string(&self.prompt_path) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback.to_string(),
            Err(e) => {
                tracing::debug!(
                    "Could not read prompt {}: {e}; using default",
                    self.prompt_path.display()
                );
                fallback.to_string()
            }
        }
    }

    pub fn facts_path(&self) -> PathBuf {
        self.memory_path.join("learned_facts.json")
    }

    pub fn conversations_dir(&self) -> PathBuf {
        self.memory_path.join("conversations")
    }

    /// Notes live next to the files the assistant manages.
    pub fn notes_dir(&self) -> PathBuf {
        self.data_root.join("notes")
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            chat_model: default_chat_model(),
            api_key: None,
            data_root: default_data_root(),
            memory_path: default_memory_path(),
            database_path: default_database_path(),
            prompt_path: default_prompt_path(),
            face: FaceConfig::default(),
            gateway: GatewayConfig::default(),
            tools: ToolsConfig::default(),
            extensions: ExtensionsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_base, "http://localhost:11434/v1");
        assert_eq!(config.face.port, 5555);
        assert_eq!(config.tools.assist_iterations, 5);
        assert_eq!(config.tools.audit_iterations, 10);
    }

    #[test]
    fn config_roundtrip_toml() {
        let toml_str = AppConfig::default_toml();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.chat_model, "qwen2.5:1.5b");
        assert_eq!(parsed.gateway.port, 5000);
    }

    #[test]
    fn json_config_accepts_greenhouse_root_alias() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api_base": "http://box:11434/v1", "greenhouse_root": "/srv/greenhouse"}"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api_base, "http://box:11434/v1");
        assert_eq!(config.data_root, PathBuf::from("/srv/greenhouse"));
        assert_eq!(config.chat_model, "qwen2.5:1.5b");
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.chat_model, "qwen2.5:1.5b");
    }

    #[test]
    fn first_parsable_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        let later = dir.path().join("later.toml");
        std::fs::write(&broken, "this is = = not toml").unwrap();
        std::fs::write(&good, "chat_model = \"llama3.2\"").unwrap();
        std::fs::write(&later, "chat_model = \"never\"").unwrap();

        let candidates = vec![dir.path().join("missing.toml"), broken, good.clone(), later];
        let (config, source) = AppConfig::load_first(&candidates);
        assert_eq!(config.chat_model, "llama3.2");
        assert_eq!(source, Some(good));
    }

    #[test]
    fn no_candidates_means_defaults() {
        let (config, source) = AppConfig::load_first(&[PathBuf::from("/nonexistent/a.json")]);
        assert!(source.is_none());
        assert_eq!(config.memory_path, PathBuf::from("data/lucy_memory"));
    }

    #[test]
    fn zero_iterations_rejected() {
        let mut config = AppConfig::default();
        config.tools.audit_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_prompt_falls_back_to_default() {
        let config = AppConfig {
            prompt_path: PathBuf::from("/nonexistent/prompt.txt"),
            ..AppConfig::default()
        };
        assert_eq!(config.system_prompt(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.system_prompt_or(ASSIST_SYSTEM_PROMPT), ASSIST_SYSTEM_PROMPT);
    }

    #[test]
    fn debug_redacts_keys() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn derived_paths_live_under_memory_path() {
        let config = AppConfig::default();
        assert_eq!(config.facts_path(), PathBuf::from("data/lucy_memory/learned_facts.json"));
        assert_eq!(config.conversations_dir(), PathBuf::from("data/lucy_memory/conversations"));
    }
}
