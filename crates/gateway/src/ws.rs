//! `GET /ws`: browser chat over WebSocket.
//!
//! Protocol:
//! - Client → Server: `{ "type": "chat", "message": "..." }`
//! - Server → Client: `TurnEvent` JSON frames (`system`, `user`, `thinking`,
//!   `tool`, `tool_result`, `assistant`, `error`), each with a `timestamp`
//!
//! Every connection gets its own companion agent, so conversations never
//! mix. The transcript is written when the socket closes.

use crate::SharedState;
use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use lucy_agent::{CompanionAgent, EventSink, SamplingProfile, TurnEvent};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// WebSocket message from the client.
#[derive(Deserialize)]
struct ClientFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    message: String,
}

/// Serialize an event as a wire frame with a local timestamp.
pub fn frame(event: &TurnEvent) -> String {
    let mut value = serde_json::to_value(event).unwrap_or_default();
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "timestamp".into(),
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string().into(),
        );
    }
    value.to_string()
}

async fn handle_ws_connection(socket: WebSocket, state: SharedState) {
    let _connection = state.connection();
    info!(active = state.active_connections(), "WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let events = EventSink::new(tx);

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sender.send(WsMessage::Text(frame(&event).into())).await.is_err() {
                break; // client disconnected
            }
        }
    });

    let mut agent = CompanionAgent::from_config(&state.config, state.provider.clone())
        .with_tools(state.tools.clone(), state.config.tools.assist_iterations)
        .with_profile(SamplingProfile::ASSIST)
        .with_events(events.clone());

    events.emit(TurnEvent::System {
        content: format!("Connected to Lucy ({})", state.config.chat_model),
    });

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => continue, // ignore binary, ping, pong
            Err(_) => break,
        };

        let client_frame: ClientFrame = match serde_json::from_str(&text) {
            Ok(f) => f,
            Err(e) => {
                events.emit(TurnEvent::Error {
                    content: format!("Invalid message: {e}"),
                });
                continue;
            }
        };

        if client_frame.frame_type != "chat" {
            debug!(frame_type = %client_frame.frame_type, "Ignoring client frame");
            continue;
        }

        let message = client_frame.message.trim();
        if message.is_empty() {
            continue;
        }

        events.emit(TurnEvent::User {
            content: message.to_string(),
        });
        agent.process_message(message).await;
    }

    agent.end();
    drop(agent);
    drop(events);
    let _ = writer.await;

    info!("WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_router, test_support};
    use tokio_tungstenite::{connect_async, tungstenite::Message};

    #[test]
    fn frames_carry_type_and_timestamp() {
        let json: serde_json::Value = serde_json::from_str(&frame(&TurnEvent::Tool {
            tool: "list_files".into(),
            args: ".".into(),
        }))
        .unwrap();
        assert_eq!(json["type"], "tool");
        assert_eq!(json["tool"], "list_files");
        assert_eq!(json["args"], ".");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    async fn next_frame<S>(stream: &mut S) -> serde_json::Value
    where
        S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            match stream.next().await.unwrap().unwrap() {
                Message::Text(text) => return serde_json::from_str(&text).unwrap(),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn chat_over_websocket() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_support::state(&["Hi! I'm Lucy!"], dir.path());
        let app = build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();

        let welcome = next_frame(&mut ws).await;
        assert_eq!(welcome["type"], "system");
        assert_eq!(welcome["content"], "Connected to Lucy (qwen2.5:1.5b)");
        assert_eq!(state.active_connections(), 1);

        ws.send(Message::Text(r#"{"type":"chat","message":"  hello  "}"#.into()))
            .await
            .unwrap();

        let user = next_frame(&mut ws).await;
        assert_eq!(user["type"], "user");
        assert_eq!(user["content"], "hello");
        assert_eq!(next_frame(&mut ws).await["type"], "thinking");
        let reply = next_frame(&mut ws).await;
        assert_eq!(reply["type"], "assistant");
        assert_eq!(reply["content"], "Hi! I'm Lucy!");

        // Script exhausted: the fallback arrives as an error frame
        ws.send(Message::Text(r#"{"type":"chat","message":"again"}"#.into()))
            .await
            .unwrap();
        assert_eq!(next_frame(&mut ws).await["type"], "user");
        assert_eq!(next_frame(&mut ws).await["type"], "thinking");
        let error = next_frame(&mut ws).await;
        assert_eq!(error["type"], "error");
        assert_eq!(error["content"], lucy_agent::FALLBACK_REPLY);

        ws.send(Message::Text("not json".into())).await.unwrap();
        let invalid = next_frame(&mut ws).await;
        assert_eq!(invalid["type"], "error");
        assert!(invalid["content"].as_str().unwrap().starts_with("Invalid message"));

        ws.close(None).await.unwrap();
        for _ in 0..50 {
            if state.active_connections() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(state.active_connections(), 0);

        // One transcript for the session
        let transcripts = std::fs::read_dir(dir.path().join("memory").join("conversations"))
            .unwrap()
            .count();
        assert_eq!(transcripts, 1);
    }
}
