//! Check Ollama tool: is the local model server up, and what can it run?

use async_trait::async_trait;
use lucy_core::error::ToolError;
use lucy_core::tool::Tool;
use serde::Deserialize;
use std::time::Duration;

pub struct CheckOllamaTool {
    tags_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

impl CheckOllamaTool {
    /// `api_base` is the OpenAI-compatible base; the native API sits beside it.
    pub fn new(api_base: &str) -> Self {
        let root = api_base.trim_end_matches('/').trim_end_matches("/v1");
        Self {
            tags_url: format!("{root}/api/tags"),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Tool for CheckOllamaTool {
    fn name(&self) -> &str {
        "check_ollama"
    }

    fn description(&self) -> &str {
        "Check if Ollama is running and list available models"
    }

    async fn invoke(&self, _args: &str) -> Result<String, ToolError> {
        let response = self
            .client
            .get(&self.tags_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: if e.is_connect() {
                    "Ollama is not running. Start it with: ollama serve".into()
                } else {
                    format!("Error checking Ollama: {e}")
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            return Ok(format!(
                "⚠️ Ollama responded but unexpected status: {}",
                status.as_u16()
            ));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: format!("Error checking Ollama: {e}"),
        })?;
        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        Ok(format!(
            "✅ Ollama is running\n📦 Available models: {}",
            names.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::routing::get;

    #[test]
    fn tags_url_drops_v1() {
        let tool = CheckOllamaTool::new("http://localhost:11434/v1/");
        assert_eq!(tool.tags_url, "http://localhost:11434/api/tags");
    }

    #[tokio::test]
    async fn lists_models() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async {
                axum::Json(serde_json::json!({
                    "models": [{"name": "qwen2.5:1.5b"}, {"name": "llama3.2:3b"}]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        let out = CheckOllamaTool::new(&format!("http://{addr}/v1"))
            .invoke("")
            .await
            .unwrap();
        assert_eq!(
            out,
            "✅ Ollama is running\n📦 Available models: qwen2.5:1.5b, llama3.2:3b"
        );
    }

    #[tokio::test]
    async fn down_server_is_error() {
        let result = CheckOllamaTool::new("http://127.0.0.1:9/v1").invoke("").await;
        assert!(matches!(result, Err(ToolError::ExecutionFailed { .. })));
    }
}
