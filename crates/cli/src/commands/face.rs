//! `lucy face`: push or watch face state without the renderer.

use lucy_core::face::{FaceNotifier, FaceState};
use lucy_face::{FaceReceiver, TcpFaceNotifier};

pub async fn set(state: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let state = FaceState::from_name(state)
        .ok_or_else(|| format!("Unknown face state '{state}' (use idle, talking or listening)"))?;

    let notifier = TcpFaceNotifier::from_config(&config.face);
    if notifier.set(state).await {
        println!("  ✅ Sent {state:?} to {}", notifier.address());
    } else {
        println!("  ⚠️  Face not reachable at {}", notifier.address());
    }

    Ok(())
}

pub async fn watch(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let port = port_override.unwrap_or(config.face.port);

    let receiver = FaceReceiver::bind((config.face.host.as_str(), port)).await?;
    println!("👀 Watching face state on {}", receiver.local_addr()?);
    println!("   Ctrl+C to stop.\n");

    let mut states = receiver.start();
    loop {
        tokio::select! {
            state = states.recv() => {
                let Some(state) = state else { break };
                let label = match (state.talking, state.listening) {
                    (true, _) => "talking",
                    (false, true) => "listening",
                    (false, false) => "idle",
                };
                println!(
                    "  [{}] {label:<9} talking={} listening={}",
                    chrono::Local::now().format("%H:%M:%S"),
                    state.talking,
                    state.listening
                );
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
