pub mod assist;
pub mod audit;
pub mod chat;
pub mod doctor;
pub mod face;
pub mod memory;
pub mod serve;
pub mod session;

use lucy_config::AppConfig;
use lucy_core::provider::Provider;
use lucy_providers::openai_compat::OpenAiCompatProvider;
use std::sync::Arc;

/// Load configuration, reporting where it came from.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let (config, source) = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    match source {
        Some(path) => tracing::debug!(path = %path.display(), "Using config file"),
        None => tracing::debug!("Using default configuration"),
    }
    Ok(config)
}

pub(crate) fn provider(config: &AppConfig) -> Arc<dyn Provider> {
    Arc::new(OpenAiCompatProvider::from_config(config))
}
