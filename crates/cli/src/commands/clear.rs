// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use hearth_sync::SyncEngine;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::error::Result;

pub fn run(engine: &SyncEngine, output: OutputFormat) -> Result<()> {
    let discarded = engine.status().pending_count;
    engine.clear()?;

    match output {
        OutputFormat::Text => println!("Cleared {} pending operation(s)", discarded),
        OutputFormat::Json => println!("{}", json!({ "cleared": discarded })),
    }
    Ok(())
}
