// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod enqueue;
pub mod pending;
pub mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hearth_core::{OpKind, SqliteKv};
use hearth_sync::{
    DeliveryError, DeliveryFuture, RemoteExecutor, SharedConnectivity, SyncConfig, SyncEngine,
};

use crate::error::{Error, Result};

/// Database file inside the state directory.
pub const DB_FILE_NAME: &str = "hearth.db";

/// Pick the state directory: the explicit one, else `<data dir>/hearth`.
pub fn resolve_state_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => dirs::data_dir()
            .map(|dir| dir.join("hearth"))
            .ok_or(Error::NoStateDir),
    }
}

/// Open the engine over the queue stored in `state_dir`.
///
/// The CLI has no transport, so the engine always reports offline and
/// never attempts delivery.
pub fn open_engine(state_dir: &Path) -> Result<SyncEngine> {
    let config = SyncConfig::load(state_dir)?;
    let kv = SqliteKv::open(&state_dir.join(DB_FILE_NAME))?;
    tracing::debug!(state_dir = %state_dir.display(), "opened queue database");

    let engine = SyncEngine::builder(
        Arc::new(kv),
        Arc::new(SharedConnectivity::new(false)),
        Arc::new(NoRemote),
    )
    .config(config)
    .build()?;
    Ok(engine)
}

/// Executor for sessions without a remote.
struct NoRemote;

impl RemoteExecutor for NoRemote {
    fn deliver<'a>(
        &'a self,
        _kind: OpKind,
        _entity: &'a str,
        _payload: &'a serde_json::Value,
    ) -> DeliveryFuture<'a> {
        Box::pin(async { Err(DeliveryError::Unreachable("no remote configured".to_string())) })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
