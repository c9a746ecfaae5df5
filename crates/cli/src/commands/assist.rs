//! `lucy assist`: the tool-enabled assistant in the terminal.

use super::session::{self, SessionEnd, SessionOptions};
use lucy_agent::{CompanionAgent, SamplingProfile};
use lucy_config::ASSIST_SYSTEM_PROMPT;
use lucy_core::face::NoopFace;
use lucy_memory::{FactStore, Session};
use std::sync::Arc;

pub async fn run(iterations: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let tools = Arc::new(lucy_tools::full_registry(&config).await);

    println!("💬 Lucy Assistant Online");
    println!("   Model: {}", config.chat_model);
    println!("   Tools: {}", tools.names().join(", "));
    println!("   Type 'exit' to quit.\n");

    let mut lucy = CompanionAgent::new(
        super::provider(&config),
        config.chat_model.clone(),
        config.system_prompt_or(ASSIST_SYSTEM_PROMPT),
        FactStore::open(config.facts_path()),
        Session::start(config.conversations_dir()),
    )
    .with_tools(tools, config.tools.assist_iterations)
    .with_profile(SamplingProfile::ASSIST);

    let greeting = lucy.greet().await;
    session::speak(&NoopFace, &greeting).await;

    let options = SessionOptions {
        max_turns: iterations,
        idle_checks: false,
        ..SessionOptions::default()
    };
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let end = session::converse(&mut lucy, &NoopFace, stdin, &options).await?;

    if end == SessionEnd::Goodbye {
        let farewell = lucy.farewell().await;
        session::speak(&NoopFace, &farewell).await;
    }
    lucy.end();

    Ok(())
}
