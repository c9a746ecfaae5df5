//! `lucy audit`: run the autonomous system audit once and report.

use lucy_agent::{Audit, EventSink, LoopOutcome, TurnEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let tools = Arc::new(lucy_tools::full_registry(&config).await);

    println!(
        "🛡️ Lucy Guardian: Commencing System Audit at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    // Print steps as they happen
    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        let mut step = 0;
        while let Some(event) = rx.recv().await {
            match event {
                TurnEvent::Tool { tool, args } => {
                    step += 1;
                    println!("🤖 Step {step}: {tool} {args}");
                }
                TurnEvent::ToolResult { result, .. } => println!("🔧 Tool Result: {result}"),
                _ => {}
            }
        }
    });

    let audit = Audit::new(
        super::provider(&config),
        tools,
        config.chat_model.clone(),
        config.system_prompt(),
        config.tools.audit_iterations,
    )
    .with_events(EventSink::new(tx));

    let outcome = audit.run().await;
    drop(audit);
    let _ = printer.await;

    let (result, _) = outcome.map_err(|e| format!("Audit aborted: {e}"))?;
    match &result.outcome {
        LoopOutcome::Summary(summary) => println!("\n✅ AUDIT COMPLETE: {summary}\n"),
        LoopOutcome::Exhausted { .. } => {
            println!("\n⚠️ Audit stopped after {} steps.", result.iterations);
            println!("Last result: {}\n", result.outcome.text());
        }
        LoopOutcome::UnknownTool(_) | LoopOutcome::Reply(_) => println!("{}", result.outcome.text()),
    }

    Ok(())
}
