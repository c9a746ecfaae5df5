//! Lucy CLI: the main entry point.
//!
//! Commands:
//! - `chat`    talk with Lucy in the terminal (face, memory, idle behaviour)
//! - `assist`  terminal chat with the system tools enabled
//! - `audit`   one autonomous system health check
//! - `serve`   browser chat over WebSocket
//! - `face`    push or watch face state
//! - `memory`  show remembered facts
//! - `doctor`  diagnose the local setup

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lucy", about = "Lucy, a curious robot companion", version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with Lucy
    Chat {
        /// Stop after this many turns
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Do not drive the animated face
        #[arg(long)]
        no_face: bool,
    },

    /// Chat with Lucy's system tools enabled
    Assist {
        /// Stop after this many turns
        #[arg(short, long)]
        iterations: Option<usize>,
    },

    /// Run an autonomous system audit
    Audit,

    /// Start the web chat server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Drive or observe the face renderer protocol
    Face {
        #[command(subcommand)]
        action: FaceAction,
    },

    /// Show what Lucy remembers
    Memory {
        /// Print the raw fact store as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose system health
    Doctor,
}

#[derive(Subcommand)]
enum FaceAction {
    /// Send one state (idle, talking, listening)
    Set { state: String },

    /// Listen on the face port and print every state received
    Watch {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Chat sessions stay quiet unless asked; logs would interleave with the prompt
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Chat { .. } | Commands::Assist { .. }, false) => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { iterations, no_face } => commands::chat::run(iterations, no_face).await?,
        Commands::Assist { iterations } => commands::assist::run(iterations).await?,
        Commands::Audit => commands::audit::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Face { action } => match action {
            FaceAction::Set { state } => commands::face::set(&state).await?,
            FaceAction::Watch { port } => commands::face::watch(port).await?,
        },
        Commands::Memory { json } => commands::memory::show(json).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
