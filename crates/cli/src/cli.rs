// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser)]
#[command(name = "sq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline action queue for the study planner")]
#[command(
    long_about = "Offline action queue for the study planner.\n\n\
    Record study actions while offline and deliver them to the remote when it is reachable."
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// What `sq purge` removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PurgeTarget {
    Completed,
    Failed,
}

/// Argument for `sq offline`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize an action queue in the current directory
    Init {
        /// Remote endpoint to deliver actions to (ws:// or wss://)
        #[arg(long)]
        remote: Option<String>,

        /// Directory to initialize (default: current directory)
        #[arg(long)]
        path: Option<String>,
    },

    /// Queue an action for delivery
    #[command(after_help = "\
Examples:
  sq enqueue task_completed '{\"task_id\":\"t1\",\"actual_minutes\":25}'
  sq enqueue friend-added '{\"friend_id\":\"u42\"}'
  sq enqueue settings_updated '{\"key\":\"theme\",\"value\":\"dark\"}'")]
    Enqueue {
        /// Action type (e.g. task_completed, group_joined)
        #[arg(value_parser = non_empty_string)]
        action_type: String,

        /// Action fields as a JSON object
        #[arg(value_parser = non_empty_string)]
        data: String,
    },

    /// List actions waiting for delivery
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List actions that will not be retried
    Failed {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show queue counts and last sync time
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one sync pass against the configured remote
    Sync,

    /// Keep syncing: on reconnect, periodically, and after retry delays
    Watch,

    /// Delete completed or failed actions
    Purge {
        #[arg(value_enum)]
        target: PurgeTarget,
    },

    /// Delete one failed action
    #[command(arg_required_else_help = true)]
    Discard {
        /// Action ID
        id: String,
    },

    /// Treat the network as unavailable (on) or use it normally (off)
    Offline {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Delete every action, in any state
    Reset {
        /// Confirm deletion
        #[arg(long, short)]
        yes: bool,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
