// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed sync lifecycle events.
//!
//! The engine publishes [`SyncEvent`]s on a broadcast channel. Every
//! subscriber sees every event in publish order; a subscriber that falls
//! more than the configured capacity behind skips the oldest ones.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use hearth_core::OperationRecord;

use crate::classify::FailureReport;

/// Outcome counts for one flush cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushSummary {
    /// Deliveries that succeeded.
    pub succeeded: usize,
    /// Deliveries that failed, whether retried later or evicted.
    pub failed: usize,
    /// Records removed after exhausting their retry budget.
    pub evicted: usize,
    /// True when the cycle ended early because a stop was requested.
    pub stopped: bool,
}

/// Something that happened inside the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A record was appended to the queue.
    Queued(OperationRecord),
    /// A flush cycle began.
    Started,
    /// A record was delivered and removed.
    Synced(OperationRecord),
    /// A record exhausted its retry budget and was evicted.
    Failed {
        record: OperationRecord,
        report: FailureReport,
    },
    /// A flush cycle finished.
    Completed(FlushSummary),
    /// The queue was discarded.
    Cleared,
}

/// Discriminant of [`SyncEvent`], for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncEventKind {
    Queued,
    Started,
    Synced,
    Failed,
    Completed,
    Cleared,
}

impl SyncEvent {
    pub fn kind(&self) -> SyncEventKind {
        match self {
            SyncEvent::Queued(_) => SyncEventKind::Queued,
            SyncEvent::Started => SyncEventKind::Started,
            SyncEvent::Synced(_) => SyncEventKind::Synced,
            SyncEvent::Failed { .. } => SyncEventKind::Failed,
            SyncEvent::Completed(_) => SyncEventKind::Completed,
            SyncEvent::Cleared => SyncEventKind::Cleared,
        }
    }

    /// The record this event is about, if any.
    pub fn record(&self) -> Option<&OperationRecord> {
        match self {
            SyncEvent::Queued(r) | SyncEvent::Synced(r) => Some(r),
            SyncEvent::Failed { record, .. } => Some(record),
            SyncEvent::Started | SyncEvent::Completed(_) | SyncEvent::Cleared => None,
        }
    }
}

/// Publishing side of the event channel.
#[derive(Clone)]
pub struct EventNotifier {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        EventNotifier { tx }
    }

    /// Publish to every current subscriber.
    pub fn publish(&self, event: SyncEvent) {
        tracing::trace!(kind = ?event.kind(), "publishing sync event");
        // Having no subscribers is normal
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver { rx: self.tx.subscribe() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiving side of the event channel.
pub struct EventReceiver {
    rx: broadcast::Receiver<SyncEvent>,
}

impl EventReceiver {
    /// Waits for the next event. Returns `None` once the engine is gone.
    pub async fn recv(&mut self) -> Option<SyncEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("sync event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Waits for the next event of the given kind, discarding others.
    pub async fn recv_kind(&mut self, kind: SyncEventKind) -> Option<SyncEvent> {
        while let Some(event) = self.recv().await {
            if event.kind() == kind {
                return Some(event);
            }
        }
        None
    }

    /// Returns the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<SyncEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("sync event subscriber lagged, skipped {} events", skipped);
                }
                Err(_) => return None,
            }
        }
    }

    /// Drains every buffered event.
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
