// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sq-remote: reference delivery endpoint for the studyq action queue.
//!
//! Accepts `deliver` frames over WebSocket, records each action key in an
//! append-only ledger, and acks redeliveries as duplicates so clients can
//! retry safely.

mod ledger;
mod server;
mod state;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// sq-remote: studyq delivery server
#[derive(Parser, Debug)]
#[command(name = "sq-remote")]
#[command(about = "WebSocket delivery endpoint for studyq action queues")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Directory for the delivery ledger
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting sq-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Data directory: {}", args.data.display());

    let state = state::ServerState::new(&args.data)?;
    info!("  Known deliveries: {}", state.applied_count().await);

    server::run(args.bind, state).await?;

    Ok(())
}
