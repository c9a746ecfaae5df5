//! Browser chat for Lucy.
//!
//! - `GET /`            embedded chat page
//! - `GET /api/status`  model, tools and connection count
//! - `GET /ws`          one companion agent per WebSocket connection
//!
//! Built on Axum. There is no authentication; bind to localhost.

pub mod frontend;
pub mod ws;

use axum::{Router, extract::State, response::Json, routing::get};
use lucy_config::AppConfig;
use lucy_core::provider::Provider;
use lucy_core::tool::ToolRegistry;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub provider: Arc<dyn Provider>,
    pub tools: Arc<ToolRegistry>,
    active_connections: AtomicUsize,
}

impl GatewayState {
    pub fn new(config: AppConfig, provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            config,
            provider,
            tools,
            active_connections: AtomicUsize::new(0),
        }
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Whether the gateway extension tool set made it into the registry.
    pub fn extensions_online(&self) -> bool {
        self.tools.contains("zpc_health")
    }

    /// Count a connection until the returned guard is dropped.
    pub(crate) fn connection(self: &Arc<Self>) -> ConnectionGuard {
        self.active_connections.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard(self.clone())
    }
}

pub(crate) struct ConnectionGuard(Arc<GatewayState>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.active_connections.fetch_sub(1, Ordering::SeqCst);
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .merge(frontend::frontend_router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider: Arc<dyn Provider> =
        Arc::new(lucy_providers::openai_compat::OpenAiCompatProvider::from_config(&config));
    let tools = Arc::new(lucy_tools::full_registry(&config).await);
    let state = Arc::new(GatewayState::new(config, provider, tools));

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    model: String,
    api_base: String,
    tools_available: Vec<String>,
    zpc_integration: bool,
    active_connections: usize,
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        model: state.config.chat_model.clone(),
        api_base: state.config.api_base.clone(),
        tools_available: state.tools.names().into_iter().map(String::from).collect(),
        zpc_integration: state.extensions_online(),
        active_connections: state.active_connections(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn status_reports_model_and_tools() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_support::state(&[], dir.path());
        let app = build_router(state);

        let req = Request::builder()
            .uri("/api/status")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "online");
        assert_eq!(json["model"], "qwen2.5:1.5b");
        assert_eq!(json["api_base"], "http://localhost:11434/v1");
        assert_eq!(json["zpc_integration"], false);
        assert_eq!(json["active_connections"], 0);
        let tools: Vec<&str> = json["tools_available"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap())
            .collect();
        assert!(tools.contains(&"list_files"));
        assert!(tools.contains(&"write_note"));
    }

    #[tokio::test]
    async fn connection_guard_counts() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_support::state(&[], dir.path());
        let first = state.connection();
        let second = state.connection();
        assert_eq!(state.active_connections(), 2);
        drop(first);
        drop(second);
        assert_eq!(state.active_connections(), 0);
    }
}
