// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted queue store.
//!
//! The queue lives under two keys of a [`KvStore`]: `sync_queue` holds a JSON
//! array of operation records and `last_sync_time` holds an ISO-8601 string.
//! Missing keys mean first run. Malformed values are logged and treated as
//! absent so a corrupt queue can never keep the application from starting.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use hearth_core::{KvStore, OperationRecord};

use crate::error::Result;

/// Key holding the serialized queue.
pub const QUEUE_KEY: &str = "sync_queue";
/// Key holding the last completed flush time.
pub const LAST_SYNC_KEY: &str = "last_sync_time";

/// State recovered from storage on startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub queue: Vec<OperationRecord>,
    pub last_sync_time: Option<DateTime<Utc>>,
}

/// Reads and writes the queue through a key-value store.
#[derive(Clone)]
pub struct QueueStore {
    kv: Arc<dyn KvStore>,
}

impl QueueStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        QueueStore { kv }
    }

    /// Loads the queue and last sync time.
    ///
    /// Only failures of the storage medium are errors; bad contents are not.
    pub fn load(&self) -> Result<PersistedState> {
        let queue = match self.kv.get(QUEUE_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<OperationRecord>>(&raw) {
                Ok(queue) => retain_valid(queue),
                Err(e) => {
                    tracing::warn!("discarding malformed sync queue: {}", e);
                    Vec::new()
                }
            },
        };

        let last_sync_time = match self.kv.get(LAST_SYNC_KEY)? {
            None => None,
            Some(raw) => match serde_json::from_str::<DateTime<Utc>>(&raw) {
                Ok(time) => Some(time),
                Err(e) => {
                    tracing::warn!("discarding malformed last sync time: {}", e);
                    None
                }
            },
        };

        Ok(PersistedState { queue, last_sync_time })
    }

    /// Writes the queue and, when known, the last sync time.
    pub fn save(
        &self,
        queue: &[OperationRecord],
        last_sync_time: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let json = serde_json::to_string(queue).map_err(hearth_core::Error::from)?;
        self.kv.set(QUEUE_KEY, &json)?;

        match last_sync_time {
            Some(time) => {
                let json = serde_json::to_string(&time).map_err(hearth_core::Error::from)?;
                self.kv.set(LAST_SYNC_KEY, &json)?;
            }
            None => self.kv.remove(LAST_SYNC_KEY)?,
        }
        Ok(())
    }

    /// Writes only the queue, leaving the last sync time untouched.
    pub fn save_queue(&self, queue: &[OperationRecord]) -> Result<()> {
        let json = serde_json::to_string(queue).map_err(hearth_core::Error::from)?;
        self.kv.set(QUEUE_KEY, &json)?;
        Ok(())
    }
}

/// Drops records that break the queue invariants: a zero budget, more
/// attempts than the budget allows, or an id already seen earlier.
fn retain_valid(queue: Vec<OperationRecord>) -> Vec<OperationRecord> {
    let mut seen = HashSet::new();
    queue
        .into_iter()
        .filter(|record| {
            let problem = if record.max_attempts == 0 {
                Some("zero max_attempts")
            } else if record.attempts > record.max_attempts {
                Some("attempts exceed max_attempts")
            } else if !seen.insert(record.id) {
                Some("duplicate id")
            } else {
                None
            };
            if let Some(problem) = problem {
                tracing::warn!(id = %record.id, "discarding malformed queued operation: {}", problem);
            }
            problem.is_none()
        })
        .collect()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
