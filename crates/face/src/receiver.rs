//! Face state receiver.
//!
//! The listening half of the push protocol. Used by `lucy face watch` to
//! debug the protocol without the renderer.

use lucy_core::face::FaceState;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A single push never exceeds this many bytes.
const MAX_PAYLOAD: usize = 1024;

pub struct FaceReceiver {
    listener: TcpListener,
}

impl FaceReceiver {
    pub async fn bind(addr: impl ToSocketAddrs) -> std::io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr).await?,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept pushes in the background and forward each decoded state.
    ///
    /// Malformed payloads are logged and dropped. The task ends when the
    /// returned receiver is dropped.
    pub fn start(self) -> mpsc::Receiver<FaceState> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            loop {
                let (mut conn, peer) = match self.listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "Face receiver accept failed");
                        continue;
                    }
                };

                let mut buf = Vec::with_capacity(64);
                let read = (&mut conn).take(MAX_PAYLOAD as u64).read_to_end(&mut buf).await;
                if let Err(e) = read {
                    debug!(%peer, error = %e, "Face push read failed");
                    continue;
                }

                match decode(&buf) {
                    Some(state) => {
                        if tx.send(state).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        warn!(%peer, payload = %String::from_utf8_lossy(&buf), "Malformed face state");
                    }
                }
            }
        });

        rx
    }
}

/// Decode one push. Missing fields default to `false`.
pub fn decode(payload: &[u8]) -> Option<FaceState> {
    let value: serde_json::Value = serde_json::from_slice(payload).ok()?;
    let object = value.as_object()?;
    let flag = |name: &str| object.get(name).and_then(|v| v.as_bool()).unwrap_or(false);
    Some(FaceState {
        talking: flag("talking"),
        listening: flag("listening"),
    })
}
