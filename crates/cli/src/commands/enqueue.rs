// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use hearth_core::{OpId, OpKind};
use hearth_sync::SyncEngine;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::error::{Error, Result};

pub fn run(
    engine: &SyncEngine,
    kind: &str,
    entity: &str,
    payload: &str,
    max_attempts: Option<u32>,
    output: OutputFormat,
) -> Result<()> {
    let id = queue(engine, kind, entity, payload, max_attempts)?;
    match output {
        OutputFormat::Text => println!("Queued {} {} {}", id, kind.to_lowercase(), entity),
        OutputFormat::Json => println!("{}", json!({ "id": id.to_string() })),
    }
    Ok(())
}

pub(crate) fn queue(
    engine: &SyncEngine,
    kind: &str,
    entity: &str,
    payload: &str,
    max_attempts: Option<u32>,
) -> Result<OpId> {
    let kind: OpKind = kind.parse()?;
    let entity = entity.trim();
    if entity.is_empty() {
        return Err(hearth_core::Error::InvalidInput("entity cannot be empty".to_string()).into());
    }
    let payload: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| Error::InvalidPayload(e.to_string()))?;

    let max_attempts = max_attempts.unwrap_or(engine.config().default_max_attempts);
    Ok(engine.enqueue_with(kind, entity, payload, max_attempts)?)
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
