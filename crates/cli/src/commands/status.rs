// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use hearth_sync::{SyncEngine, SyncStatus};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::error::Result;

pub fn run(engine: &SyncEngine, output: OutputFormat) -> Result<()> {
    println!("{}", render(&engine.status(), output)?);
    Ok(())
}

pub(crate) fn render(status: &SyncStatus, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text => {
            let last_sync = status
                .last_sync_time
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            Ok(format!(
                "online: {}\npending: {}\nsyncing: {}\nlast sync: {}",
                yes_no(status.is_online),
                status.pending_count,
                yes_no(status.is_syncing),
                last_sync
            ))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "is_online": status.is_online,
            "pending_count": status.pending_count,
            "last_sync_time": status.last_sync_time,
            "is_syncing": status.is_syncing,
        }))?),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
