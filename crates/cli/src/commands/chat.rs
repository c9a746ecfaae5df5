//! `lucy chat`: talk with Lucy in the terminal, face and memory included.

use super::session::{self, SessionEnd, SessionOptions};
use lucy_agent::CompanionAgent;
use lucy_core::face::{FaceNotifier, FaceState, NoopFace};
use lucy_face::TcpFaceNotifier;
use std::sync::Arc;

pub async fn run(iterations: Option<usize>, no_face: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    let face: Arc<dyn FaceNotifier> = if config.face.enabled && !no_face {
        Arc::new(TcpFaceNotifier::from_config(&config.face))
    } else {
        Arc::new(NoopFace)
    };

    let mut lucy = CompanionAgent::from_config(&config, super::provider(&config)).with_face(face.clone());

    println!();
    println!("{}", "=".repeat(60));
    println!("Lucy - Curious Robot Companion");
    println!("{}", "=".repeat(60));
    println!("Model:  {}", config.chat_model);
    println!("Memory: {}", config.memory_path.display());
    println!("\nLucy is ready to chat! She'll remember what you tell her.");
    println!("Commands: 'exit' to quit, 'memory' to see what Lucy remembers");
    println!("          'idle' to trigger idle behavior");
    println!("{}\n", "=".repeat(60));

    let greeting = lucy.greet().await;
    session::speak(face.as_ref(), &greeting).await;

    let options = SessionOptions {
        max_turns: iterations,
        ..SessionOptions::default()
    };
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let end = session::converse(&mut lucy, face.as_ref(), stdin, &options).await?;

    if end == SessionEnd::Goodbye {
        let farewell = lucy.farewell().await;
        session::speak(face.as_ref(), &farewell).await;
    }

    if let Some(path) = lucy.end() {
        println!("[Memory] Conversation saved to {}", path.display());
    }
    println!("[Memory] Total facts remembered: {}", lucy.facts().summary());
    face.set(FaceState::IDLE).await;

    Ok(())
}
