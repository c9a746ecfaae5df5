//! Gateway extension tools: capabilities served by a local tool gateway.
//!
//! The set is only registered when the gateway answers its `/healthz`
//! probe at startup. Every tool re-checks health before acting, since the
//! gateway may go away mid-session. Beyond the health report, the remote
//! calls are not wired yet and the tools say so.

use async_trait::async_trait;
use lucy_config::ExtensionsConfig;
use lucy_core::error::ToolError;
use lucy_core::tool::{Tool, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Shared HTTP client for the extension gateway.
pub struct GatewayClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ExtensionsConfig) -> Self {
        Self::new(&config.gateway_url, config.api_key.clone())
    }

    /// GET `/healthz`; the JSON body on success, the failure text otherwise.
    pub async fn health(&self) -> Result<serde_json::Value, String> {
        let mut request = self
            .client
            .get(format!("{}/healthz", self.base_url))
            .timeout(Duration::from_secs(3));
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status().as_u16()));
        }
        response.json().await.map_err(|e| e.to_string())
    }

    async fn require_online(&self, tool_name: &str, what: &str) -> Result<(), ToolError> {
        self.health().await.map(|_| ()).map_err(|_| ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: format!("Cannot {what}: Gateway offline"),
        })
    }
}

pub struct ZpcHealthTool(Arc<GatewayClient>);

#[async_trait]
impl Tool for ZpcHealthTool {
    fn name(&self) -> &str {
        "zpc_health"
    }

    fn description(&self) -> &str {
        "Check ZPC Gateway system status"
    }

    async fn invoke(&self, _args: &str) -> Result<String, ToolError> {
        match self.0.health().await {
            Ok(status) => {
                let pretty = serde_json::to_string_pretty(&status).unwrap_or_default();
                Ok(format!("✅ ZPC Gateway is online\n{pretty}"))
            }
            Err(e) => Err(ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: format!("ZPC Gateway offline: {e}"),
            }),
        }
    }
}

pub struct SearchVaultTool(Arc<GatewayClient>);

#[async_trait]
impl Tool for SearchVaultTool {
    fn name(&self) -> &str {
        "search_vault"
    }

    fn description(&self) -> &str {
        "Search the knowledge base vault"
    }

    fn usage(&self) -> Option<&str> {
        Some("<keyword>")
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let keyword = args.trim();
        if keyword.is_empty() {
            return Err(ToolError::InvalidArguments("Missing search keyword".into()));
        }
        self.0.require_online(self.name(), "search the vault").await?;
        Ok(format!("🔍 Searching knowledge base for: {keyword}\n(Integration pending)"))
    }
}

pub struct ComfyUiStatusTool(Arc<GatewayClient>);

#[async_trait]
impl Tool for ComfyUiStatusTool {
    fn name(&self) -> &str {
        "comfyui_status"
    }

    fn description(&self) -> &str {
        "Check if ComfyUI is running"
    }

    async fn invoke(&self, _args: &str) -> Result<String, ToolError> {
        self.0.require_online(self.name(), "check ComfyUI").await?;
        Ok("🎨 ComfyUI status check (integration pending)".into())
    }
}

pub struct ScreenshotTool(Arc<GatewayClient>);

#[async_trait]
impl Tool for ScreenshotTool {
    fn name(&self) -> &str {
        "screenshot"
    }

    fn description(&self) -> &str {
        "Capture screenshot (0=all, 1=primary, etc.)"
    }

    fn usage(&self) -> Option<&str> {
        Some("[monitor]")
    }

    async fn invoke(&self, args: &str) -> Result<String, ToolError> {
        let arg = args.trim();
        let monitor: u32 = if arg.is_empty() {
            0
        } else {
            arg.parse().map_err(|_| {
                ToolError::InvalidArguments("Monitor must be a number (0, 1, 2...)".into())
            })?
        };
        self.0.require_online(self.name(), "capture screenshot").await?;
        Ok(format!("📸 Screenshot of monitor {monitor} (integration pending)"))
    }
}

pub struct HaContextTool(Arc<GatewayClient>);

#[async_trait]
impl Tool for HaContextTool {
    fn name(&self) -> &str {
        "ha_context"
    }

    fn description(&self) -> &str {
        "Get Home Assistant device context"
    }

    async fn invoke(&self, _args: &str) -> Result<String, ToolError> {
        self.0.require_online(self.name(), "get HA context").await?;
        Ok("🏠 Home Assistant context (integration pending)".into())
    }
}

/// The extension set, unconditionally.
pub fn gateway_tools(client: Arc<GatewayClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ZpcHealthTool(client.clone())));
    registry.register(Box::new(SearchVaultTool(client.clone())));
    registry.register(Box::new(ComfyUiStatusTool(client.clone())));
    registry.register(Box::new(ScreenshotTool(client.clone())));
    registry.register(Box::new(HaContextTool(client)));
    registry
}

/// The extension set if it is enabled and the gateway is reachable now.
pub async fn probe_gateway_tools(config: &ExtensionsConfig) -> Option<ToolRegistry> {
    if !config.enabled {
        return None;
    }
    let client = Arc::new(GatewayClient::from_config(config));
    match client.health().await {
        Ok(_) => {
            info!(url = %config.gateway_url, "Gateway extension tools enabled");
            Some(gateway_tools(client))
        }
        Err(e) => {
            warn!(url = %config.gateway_url, error = %e, "Gateway unreachable, extension tools disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;

    async fn serve_gateway() -> String {
        let router = Router::new().route(
            "/healthz",
            get(|headers: HeaderMap| async move {
                match headers.get("X-API-Key").and_then(|v| v.to_str().ok()) {
                    Some("secret") => Ok(axum::Json(serde_json::json!({"status": "ok"}))),
                    _ => Err(StatusCode::UNAUTHORIZED),
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn config(url: String, key: Option<&str>) -> ExtensionsConfig {
        ExtensionsConfig {
            enabled: true,
            gateway_url: url,
            api_key: key.map(String::from),
        }
    }

    #[tokio::test]
    async fn probe_registers_five_tools_when_online() {
        let url = serve_gateway().await;
        let registry = probe_gateway_tools(&config(url, Some("secret"))).await.unwrap();
        assert_eq!(
            registry.names(),
            vec!["comfyui_status", "ha_context", "screenshot", "search_vault", "zpc_health"]
        );

        let outcome = registry.invoke("zpc_health", "").await;
        assert!(matches!(
            outcome,
            lucy_core::ToolOutcome::Completed { ref output, success: true } if output.contains("online")
        ));
    }

    #[tokio::test]
    async fn probe_skips_when_unauthorized_or_disabled() {
        let url = serve_gateway().await;
        assert!(probe_gateway_tools(&config(url.clone(), None)).await.is_none());

        let mut disabled = config(url, Some("secret"));
        disabled.enabled = false;
        assert!(probe_gateway_tools(&disabled).await.is_none());
    }

    #[tokio::test]
    async fn screenshot_validates_monitor() {
        let client = Arc::new(GatewayClient::new("http://127.0.0.1:9", None));
        let result = ScreenshotTool(client).invoke("left").await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn offline_gateway_is_reported() {
        let client = Arc::new(GatewayClient::new("http://127.0.0.1:9", None));
        match HaContextTool(client).invoke("").await {
            Err(ToolError::ExecutionFailed { reason, .. }) => {
                assert!(reason.contains("Gateway offline"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
