//! Built-in tool implementations for Lucy.
//!
//! Tools give the assistant modes a way to touch the machine: browse the
//! data directory, run a few safe commands, look after the greenhouse
//! service and its database, and keep notes. An optional extension set
//! talks to a local tool gateway.

pub mod check_ollama;
pub mod gateway_ext;
pub mod list_files;
pub mod manage_service;
pub mod notes;
pub mod query_db;
pub mod run_command;
pub mod sandbox;
pub mod system_info;

use lucy_config::AppConfig;
use lucy_core::tool::ToolRegistry;
use std::time::Duration;

pub use gateway_ext::{GatewayClient, gateway_tools, probe_gateway_tools};

/// Create the builtin tool registry described by `config`.
pub fn builtin_registry(config: &AppConfig) -> ToolRegistry {
    let mut registry =
        ToolRegistry::new().with_timeout(Duration::from_secs(config.tools.timeout_secs));
    registry.register(Box::new(system_info::SystemInfoTool));
    registry.register(Box::new(check_ollama::CheckOllamaTool::new(&config.api_base)));
    registry.register(Box::new(list_files::ListFilesTool::new(&config.data_root)));
    registry.register(Box::new(run_command::RunCommandTool::new(
        config.tools.allowed_commands.clone(),
        Duration::from_secs(config.tools.command_timeout_secs),
    )));
    registry.register(Box::new(manage_service::ManageServiceTool::new(
        &config.tools.service_name,
    )));
    registry.register(Box::new(query_db::QueryDbTool::new(&config.database_path)));
    registry.register(Box::new(notes::WriteNoteTool::new(config.notes_dir())));
    registry.register(Box::new(notes::ReadNotesTool::new(config.notes_dir())));
    registry
}

/// Builtin tools plus any extension set that is enabled and reachable.
pub async fn full_registry(config: &AppConfig) -> ToolRegistry {
    let mut registry = builtin_registry(config);
    if let Some(extension) = probe_gateway_tools(&config.extensions).await {
        registry.merge(extension);
    }
    registry
}
