// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Necsus - command-line client for Necsus chat rooms.
//!
//! This is the binary entry point: it loads configuration, installs logging,
//! and dispatches to the subcommand modules.

mod bots;
mod tail;
mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use necsus_config::NecsusConfig;
use necsus_core::NecsusError;
use necsus_sync::Outbox;
use necsus_transport::HttpActionSubmitter;

/// Necsus - follow and post to a chat room from the terminal.
#[derive(Parser, Debug)]
#[command(name = "necsus", version, about, long_about = None)]
struct Cli {
    /// Read this file instead of searching the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Room to join, overriding `client.room`.
    #[arg(long, global = true)]
    room: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Follow the room's message stream until interrupted.
    Tail,
    /// Post one message as `client.author`.
    Post {
        /// Message text.
        text: String,
    },
    /// Export or import the room's bot roster.
    Bots {
        #[command(subcommand)]
        action: BotsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BotsCommand {
    /// Print the roster as JSON.
    Export,
    /// Reconcile the roster against a JSON file.
    Import {
        /// File produced by `necsus bots export`.
        file: PathBuf,
        /// Show the plan without changing anything.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => necsus_config::load_and_validate_path(path),
        None => necsus_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            necsus_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    if let Some(room) = cli.room {
        config.client.room = room;
    }

    init_tracing(&config.client.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &NecsusConfig) -> Result<(), NecsusError> {
    match command {
        Commands::Tail => tail::run_tail(config).await,
        Commands::Post { text } => {
            let outbox = outbox(config)?;
            match outbox.post_message(&text).await? {
                Some(message) => println!("posted message {}", message.id),
                None => eprintln!("nothing to post"),
            }
            Ok(())
        }
        Commands::Bots { action } => {
            let outbox = outbox(config)?;
            match action {
                BotsCommand::Export => bots::run_export(&outbox).await,
                BotsCommand::Import { file, dry_run } => {
                    bots::run_import(&outbox, &file, dry_run).await
                }
            }
        }
    }
}

fn outbox(config: &NecsusConfig) -> Result<Outbox<HttpActionSubmitter>, NecsusError> {
    let submitter = HttpActionSubmitter::new(&config.client.server_url)?;
    Ok(Outbox::new(
        submitter,
        config.client.room.clone(),
        config.client.author.clone(),
    ))
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("necsus={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
