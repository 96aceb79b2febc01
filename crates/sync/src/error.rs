// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sync engine.

use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// Delivery failures never appear here: they are retried and reported
/// through [`SyncEvent::Failed`](crate::SyncEvent::Failed), never returned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] hearth_core::Error),

    #[error("offline: cannot sync while disconnected\n  hint: changes stay queued and sync when the connection returns")]
    Offline,

    #[error("{0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("no async runtime: {0}")]
    Runtime(String),
}

/// A specialized Result type for sync engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
