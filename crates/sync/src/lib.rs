// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hearth-sync: Offline-first sync engine.
//!
//! Local writes are queued as operation records and delivered to a remote
//! backend when connectivity allows, with bounded retries per record.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Engine    │────►│  Executor   │────►│   Remote    │
//! │(SyncEngine) │◄────│   (trait)   │◄────│   Backend   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!    │      ▲  │
//!    │      │  └──────────────► EventNotifier (broadcast)
//!    ▼      │
//! ┌─────────────┐     ┌─────────────┐
//! │ QueueStore  │     │ Lifecycle   │◄── ConnectivityMonitor
//! │  (KvStore)  │     │ (timer task)│
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Durable FIFO queue persisted through any [`hearth_core::KvStore`]
//! - Flush on enqueue, on reconnect, on a timer, or on demand
//! - Per-record retry budget with eviction and a classified failure report
//! - Typed lifecycle events for UI and tests
//! - Injectable executor, connectivity monitor, classifier and clock

mod classify;
mod config;
mod connectivity;
mod engine;
mod error;
mod events;
mod executor;
mod lifecycle;
mod store;

pub use classify::{DefaultClassifier, ErrorClassifier, FailureReport, SYNC_CATEGORY};
pub use config::{SyncConfig, CONFIG_FILE_NAME};
pub use connectivity::{ConnectivityMonitor, RestoredReceiver, SharedConnectivity};
pub use engine::{FlushOutcome, SkipReason, SyncEngine, SyncEngineBuilder, SyncStatus};
pub use error::{Error, Result};
pub use events::{EventNotifier, EventReceiver, FlushSummary, SyncEvent, SyncEventKind};
pub use executor::{DeliveryError, DeliveryFuture, RemoteExecutor};
pub use store::{PersistedState, QueueStore, LAST_SYNC_KEY, QUEUE_KEY};

#[cfg(test)]
mod test_helpers;
