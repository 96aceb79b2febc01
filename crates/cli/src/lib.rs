// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hearth - command line access to the offline sync queue.
//!
//! The CLI opens the queue stored in a state directory (`hearth.db`, plus an
//! optional `hearth.toml`) and lets you inspect it, queue operations by hand,
//! or discard it. It never talks to a remote: queued operations are delivered
//! by the application embedding [`hearth_sync::SyncEngine`].

mod cli;
mod commands;
pub mod error;

pub use cli::{Cli, Command, OutputFormat};
pub use error::{Error, Result};

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let state_dir = commands::resolve_state_dir(cli.state_dir)?;
    let engine = commands::open_engine(&state_dir)?;

    match cli.command {
        Command::Status => commands::status::run(&engine, cli.output),
        Command::Pending => commands::pending::run(&engine, cli.output),
        Command::Enqueue {
            kind,
            entity,
            payload,
            max_attempts,
        } => commands::enqueue::run(&engine, &kind, &entity, &payload, max_attempts, cli.output),
        Command::Clear => commands::clear::run(&engine, cli.output),
    }
}
