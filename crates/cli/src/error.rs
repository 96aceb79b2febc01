// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the `hearth` CLI.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no state directory found\n  hint: pass --state-dir DIR")]
    NoStateDir,

    #[error("invalid payload: {0}\n  hint: the payload must be a JSON document, e.g. '{{\"id\":\"c1\"}}'")]
    InvalidPayload(String),

    #[error(transparent)]
    Core(#[from] hearth_core::Error),

    #[error(transparent)]
    Sync(#[from] hearth_sync::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
