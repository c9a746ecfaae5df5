//! TCP face notifier.

use async_trait::async_trait;
use lucy_config::FaceConfig;
use lucy_core::face::{FaceNotifier, FaceState};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

/// Pushes face state to the renderer, one connection per update.
///
/// Every failure (renderer not running, slow connect, broken pipe) is
/// swallowed and reported as `false`.
#[derive(Debug, Clone)]
pub struct TcpFaceNotifier {
    address: String,
    connect_timeout: Duration,
}

impl TcpFaceNotifier {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &FaceConfig) -> Self {
        Self::new(config.address()).with_connect_timeout(Duration::from_millis(config.connect_timeout_ms))
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn push(&self, state: FaceState) -> std::io::Result<()> {
        let payload = serde_json::to_vec(&state)?;
        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"))??;
        stream.write_all(&payload).await?;
        stream.shutdown().await
    }
}

#[async_trait]
impl FaceNotifier for TcpFaceNotifier {
    async fn set(&self, state: FaceState) -> bool {
        match self.push(state).await {
            Ok(()) => true,
            Err(e) => {
                debug!(address = %self.address, error = %e, "Face not reachable");
                false
            }
        }
    }
}
