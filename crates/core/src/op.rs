// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued mutations awaiting delivery to the remote.
//!
//! An [`OperationRecord`] describes one pending create/update/delete against
//! a named collection. The payload is opaque: the sync engine stores,
//! persists and forwards it but never looks inside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::op_id::OpId;

/// Retry budget used when the caller does not pick one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The kind of mutation an operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Create,
    Update,
    Delete,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Create => "create",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(OpKind::Create),
            "update" => Ok(OpKind::Update),
            "delete" => Ok(OpKind::Delete),
            _ => Err(Error::InvalidInput(format!(
                "invalid operation kind: '{s}'\n  hint: valid kinds are: create, update, delete"
            ))),
        }
    }
}

/// One pending mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationRecord {
    /// Unique id, also used by the remote for deduplication.
    pub id: OpId,
    pub kind: OpKind,
    /// Logical collection the mutation applies to (e.g. "contact").
    pub entity: String,
    pub payload: serde_json::Value,
    /// When the operation was enqueued.
    pub created_at: DateTime<Utc>,
    /// Delivery attempts made so far.
    #[serde(default)]
    pub attempts: u32,
    /// Attempts allowed before the operation is evicted.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl OperationRecord {
    /// Creates a fresh record with no attempts made.
    ///
    /// Fails if `max_attempts` is zero.
    pub fn new(
        id: OpId,
        kind: OpKind,
        entity: impl Into<String>,
        payload: serde_json::Value,
        created_at: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::InvalidInput(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(OperationRecord {
            id,
            kind,
            entity: entity.into(),
            payload,
            created_at,
            attempts: 0,
            max_attempts,
        })
    }

    /// Records one failed delivery.
    ///
    /// Returns true when the retry budget is now spent and the record must
    /// be evicted.
    pub fn record_failure(&mut self) -> bool {
        self.attempts = self.attempts.saturating_add(1);
        self.is_exhausted()
    }

    /// True once `attempts` has reached `max_attempts`.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Attempts left before eviction.
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
