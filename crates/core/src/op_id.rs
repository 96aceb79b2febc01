// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operation identifiers and the clock that mints them.
//!
//! An [`OpId`] is a hybrid logical timestamp: wall clock milliseconds plus a
//! logical counter plus a node id. Ids minted by one [`OpIdClock`] are unique
//! and strictly increasing, even when the wall clock stalls or goes backwards.
//!
//! Format: `{wall_ms}-{counter}-{node_id}`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Unique identifier of a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpId {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Logical counter for ids minted at the same wall time.
    pub counter: u32,
    /// Node identifier for deterministic tiebreaking.
    pub node_id: u32,
}

impl OpId {
    /// Creates an id from its components.
    pub fn new(wall_ms: u64, counter: u32, node_id: u32) -> Self {
        OpId { wall_ms, counter, node_id }
    }

    /// Parses an id from its string representation.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl Ord for OpId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wall_ms
            .cmp(&other.wall_ms)
            .then_with(|| self.counter.cmp(&other.counter))
            .then_with(|| self.node_id.cmp(&other.node_id))
    }
}

impl PartialOrd for OpId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wall_ms, self.counter, self.node_id)
    }
}

impl FromStr for OpId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidOpId(format!(
                "expected format 'wall_ms-counter-node_id', got '{s}'"
            )));
        }

        let wall_ms = parts[0]
            .parse::<u64>()
            .map_err(|_| Error::InvalidOpId(format!("invalid wall_ms '{}' in '{s}'", parts[0])))?;

        let counter = parts[1]
            .parse::<u32>()
            .map_err(|_| Error::InvalidOpId(format!("invalid counter '{}' in '{s}'", parts[1])))?;

        let node_id = parts[2]
            .parse::<u32>()
            .map_err(|_| Error::InvalidOpId(format!("invalid node_id '{}' in '{s}'", parts[2])))?;

        Ok(OpId::new(wall_ms, counter, node_id))
    }
}

// Persisted as the compact string form so stored queues stay readable.
impl Serialize for OpId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OpId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Trait for getting the current wall clock time.
///
/// This allows injecting a mock clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;

    /// Returns the current time as a UTC timestamp.
    fn now_utc(&self) -> DateTime<Utc> {
        let ms = i64::try_from(self.now_ms()).unwrap_or(i64::MAX);
        DateTime::from_timestamp_millis(ms).unwrap_or_default()
    }
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

impl<C: ClockSource + ?Sized> ClockSource for std::sync::Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Mints monotonically increasing [`OpId`]s.
///
/// Thread-safe. The last issued `(wall_ms, counter)` pair is kept under one
/// lock so concurrent callers never receive the same id.
pub struct OpIdClock<C: ClockSource> {
    clock: C,
    node_id: u32,
    last: Mutex<(u64, u32)>,
}

impl<C: ClockSource> OpIdClock<C> {
    /// Creates a clock with a custom clock source.
    pub fn with_clock(clock: C, node_id: u32) -> Self {
        OpIdClock { clock, node_id, last: Mutex::new((0, 0)) }
    }

    /// Returns the underlying clock source.
    pub fn source(&self) -> &C {
        &self.clock
    }

    /// Mints the next id.
    pub fn next_id(&self) -> OpId {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        let (wall_ms, counter) = if physical > last.0 {
            (physical, 0)
        } else {
            // Clock stalled or went backwards: stay on the last wall time
            (last.0, last.1.saturating_add(1))
        };
        *last = (wall_ms, counter);

        OpId::new(wall_ms, counter, self.node_id)
    }

    /// Advances the clock past an id minted elsewhere (e.g. loaded from disk).
    ///
    /// Every id minted afterwards compares greater than `seen`.
    pub fn observe(&self, seen: &OpId) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if (seen.wall_ms, seen.counter) > *last {
            *last = (seen.wall_ms, seen.counter);
        }
    }
}

#[cfg(test)]
#[path = "op_id_tests.rs"]
mod tests;
