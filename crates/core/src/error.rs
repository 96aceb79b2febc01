// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for hearth-core operations.

use thiserror::Error;

/// All possible errors that can occur in hearth-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid operation id: {0}")]
    InvalidOpId(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for hearth-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
