// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  hearth enqueue -k create -e contact -p '{\"id\":\"c1\"}'   Queue a change
  hearth pending                                          List queued changes
  hearth status                                           Show sync state";

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Inspect and manage the offline sync queue")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Directory holding hearth.db and hearth.toml (default: user data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show connectivity, queue size and last sync time
    Status,

    /// List queued operations in delivery order
    Pending,

    /// Queue an operation for later delivery
    #[command(after_help = "Examples:\n  \
        hearth enqueue -k update -e contact -p '{\"id\":\"c1\",\"name\":\"Rosa\"}'\n  \
        hearth enqueue -k delete -e medication_log -p '{\"id\":\"m9\"}' --max-attempts 5")]
    Enqueue {
        /// Operation kind (create, update, delete)
        #[arg(long, short)]
        kind: String,

        /// Collection the operation applies to
        #[arg(long, short)]
        entity: String,

        /// JSON payload
        #[arg(long, short)]
        payload: String,

        /// Delivery attempts before the operation is dropped
        #[arg(long)]
        max_attempts: Option<u32>,
    },

    /// Discard every queued operation without sending it
    Clear,
}
