// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use hearth_core::OperationRecord;
use hearth_sync::SyncEngine;

use crate::cli::OutputFormat;
use crate::error::Result;

pub fn run(engine: &SyncEngine, output: OutputFormat) -> Result<()> {
    let rendered = render(&engine.pending(), output)?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

pub(crate) fn render(records: &[OperationRecord], output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text => Ok(records.iter().map(format_line).collect::<Vec<_>>().join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
    }
}

/// `<id> <kind> <entity> [attempts/max] <payload>`
fn format_line(record: &OperationRecord) -> String {
    format!(
        "{} {} {} [{}/{}] {}",
        record.id, record.kind, record.entity, record.attempts, record.max_attempts, record.payload
    )
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
