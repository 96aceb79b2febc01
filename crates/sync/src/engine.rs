// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync engine: durable queue, flush cycle, retry and eviction.
//!
//! # Flush cycle
//!
//! ```text
//!   Idle ──flush()──► guard ──fail──► Skipped
//!                       │
//!                       ▼
//!                  Flushing: snapshot queue, deliver each record in order
//!                       │     ok   → remove, Synced
//!                       │     err  → attempts += 1, evict at max → Failed
//!                       ▼
//!                  persist queue + last_sync_time, Completed ──► Idle
//! ```
//!
//! Records enqueued while a cycle runs join the live queue but not the
//! cycle's snapshot; the next trigger picks them up. A record that fails
//! keeps its position in the queue.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use hearth_core::{
    ClockSource, KvStore, OpId, OpIdClock, OpKind, OperationRecord, SystemClock,
};

use crate::classify::{DefaultClassifier, ErrorClassifier, SYNC_CATEGORY};
use crate::config::SyncConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::error::{Error, Result};
use crate::events::{EventNotifier, EventReceiver, FlushSummary, SyncEvent};
use crate::executor::{DeliveryError, RemoteExecutor};
use crate::lifecycle::{self, Lifecycle};
use crate::store::QueueStore;

/// Point-in-time view of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub is_online: bool,
    pub pending_count: usize,
    /// End of the most recent completed flush cycle.
    pub last_sync_time: Option<DateTime<Utc>>,
    pub is_syncing: bool,
}

/// Why a flush did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadySyncing,
    Offline,
    EmptyQueue,
}

/// Result of a call to [`SyncEngine::flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// A guard declined to start a cycle. No events were emitted.
    Skipped(SkipReason),
    /// A cycle ran to completion (or until stopped).
    Completed(FlushSummary),
}

impl FlushOutcome {
    pub fn summary(&self) -> Option<FlushSummary> {
        match self {
            FlushOutcome::Completed(summary) => Some(*summary),
            FlushOutcome::Skipped(_) => None,
        }
    }
}

struct QueueState {
    queue: Vec<OperationRecord>,
    last_sync_time: Option<DateTime<Utc>>,
}

struct EngineInner {
    config: SyncConfig,
    store: QueueStore,
    connectivity: Arc<dyn ConnectivityMonitor>,
    executor: Arc<dyn RemoteExecutor>,
    classifier: Arc<dyn ErrorClassifier>,
    ids: OpIdClock<Arc<dyn ClockSource>>,
    state: Mutex<QueueState>,
    /// Held (true) for the whole of a flush cycle.
    syncing: AtomicBool,
    stop_requested: AtomicBool,
    events: EventNotifier,
    lifecycle: Mutex<Option<Lifecycle>>,
}

impl EngineInner {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now(&self) -> DateTime<Utc> {
        self.ids.source().now_utc()
    }

    fn persist_queue(&self) -> Result<()> {
        let state = self.lock_state();
        self.store.save_queue(&state.queue)
    }

    fn is_queued(&self, id: OpId) -> bool {
        self.lock_state().queue.iter().any(|r| r.id == id)
    }

    /// Removes a delivered record. Returns false if it was already gone.
    fn remove_record(&self, id: OpId) -> bool {
        let mut state = self.lock_state();
        let before = state.queue.len();
        state.queue.retain(|r| r.id != id);
        state.queue.len() != before
    }

    /// Counts a failed delivery against the live record.
    ///
    /// Returns the updated record and whether it was evicted, or `None` when
    /// the record left the queue mid-cycle (e.g. a concurrent `clear`).
    fn record_failure(&self, id: OpId) -> Option<(OperationRecord, bool)> {
        let mut state = self.lock_state();
        let index = state.queue.iter().position(|r| r.id == id)?;
        let exhausted = state.queue[index].record_failure();
        if exhausted {
            Some((state.queue.remove(index), true))
        } else {
            Some((state.queue[index].clone(), false))
        }
    }
}

/// Resets the syncing flag when a cycle ends, including when its future is
/// dropped mid-delivery.
struct FlushGuard<'a> {
    inner: &'a EngineInner,
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.inner.stop_requested.store(false, Ordering::Release);
        self.inner.syncing.store(false, Ordering::Release);
    }
}

/// Offline-first mutation queue with retrying delivery.
///
/// Cheap to clone; clones share one queue. Build with
/// [`SyncEngine::builder`].
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

/// Weak handle held by the background task so it never keeps the engine alive.
#[derive(Clone)]
pub(crate) struct WeakEngine(Weak<EngineInner>);

impl WeakEngine {
    pub(crate) fn upgrade(&self) -> Option<SyncEngine> {
        self.0.upgrade().map(|inner| SyncEngine { inner })
    }
}

/// Collects collaborators for a [`SyncEngine`].
pub struct SyncEngineBuilder {
    kv: Arc<dyn KvStore>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    executor: Arc<dyn RemoteExecutor>,
    classifier: Arc<dyn ErrorClassifier>,
    clock: Arc<dyn ClockSource>,
    config: SyncConfig,
}

impl SyncEngineBuilder {
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Loads persisted state and returns the engine.
    ///
    /// The background task is not started; call
    /// [`SyncEngine::initialize`] for that.
    pub fn build(self) -> Result<SyncEngine> {
        let store = QueueStore::new(self.kv);
        let persisted = store.load()?;

        let ids = OpIdClock::with_clock(self.clock, self.config.node_id);
        for record in &persisted.queue {
            ids.observe(&record.id);
        }

        tracing::info!(
            pending = persisted.queue.len(),
            last_sync = ?persisted.last_sync_time,
            "sync engine loaded"
        );

        let events = EventNotifier::new(self.config.event_capacity);
        Ok(SyncEngine {
            inner: Arc::new(EngineInner {
                config: self.config,
                store,
                connectivity: self.connectivity,
                executor: self.executor,
                classifier: self.classifier,
                ids,
                state: Mutex::new(QueueState {
                    queue: persisted.queue,
                    last_sync_time: persisted.last_sync_time,
                }),
                syncing: AtomicBool::new(false),
                stop_requested: AtomicBool::new(false),
                events,
                lifecycle: Mutex::new(None),
            }),
        })
    }
}

impl SyncEngine {
    /// Start building an engine from its required collaborators.
    pub fn builder(
        kv: Arc<dyn KvStore>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        executor: Arc<dyn RemoteExecutor>,
    ) -> SyncEngineBuilder {
        SyncEngineBuilder {
            kv,
            connectivity,
            executor,
            classifier: Arc::new(DefaultClassifier),
            clock: Arc::new(SystemClock),
            config: SyncConfig::default(),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakEngine {
        WeakEngine(Arc::downgrade(&self.inner))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Queue a mutation with the configured default retry budget.
    pub fn enqueue(
        &self,
        kind: OpKind,
        entity: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<OpId> {
        self.enqueue_with(kind, entity, payload, self.inner.config.default_max_attempts)
    }

    /// Queue a mutation.
    ///
    /// Returns once the record is appended and persisted; delivery happens
    /// later. If online and idle, a flush is spawned on the current tokio
    /// runtime. A persistence failure is returned and the record is not
    /// queued.
    pub fn enqueue_with(
        &self,
        kind: OpKind,
        entity: impl Into<String>,
        payload: serde_json::Value,
        max_attempts: u32,
    ) -> Result<OpId> {
        let inner = &self.inner;
        let id = inner.ids.next_id();
        let record = OperationRecord::new(id, kind, entity, payload, inner.now(), max_attempts)
            .map_err(|e| match e {
                hearth_core::Error::InvalidInput(msg) => Error::InvalidInput(msg),
                other => Error::Storage(other),
            })?;

        {
            let mut state = inner.lock_state();
            state.queue.push(record.clone());
            if let Err(e) = inner.store.save_queue(&state.queue) {
                state.queue.retain(|r| r.id != id);
                tracing::error!(%id, "failed to persist enqueued operation: {}", e);
                return Err(e);
            }
        }

        tracing::debug!(%id, %kind, entity = %record.entity, "operation queued");
        inner.events.publish(SyncEvent::Queued(record));

        if inner.connectivity.is_connected() && !inner.syncing.load(Ordering::Acquire) {
            self.spawn_flush();
        }
        Ok(id)
    }

    fn spawn_flush(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let engine = self.clone();
                handle.spawn(async move {
                    if let Err(e) = engine.flush().await {
                        tracing::error!("background flush failed: {}", e);
                    }
                });
            }
            Err(_) => tracing::debug!("no async runtime; flush deferred to next trigger"),
        }
    }

    /// Run one flush cycle, unless a guard declines.
    ///
    /// Only storage failures while persisting the cycle's result are
    /// returned as errors; the in-memory queue is still correct then.
    pub async fn flush(&self) -> Result<FlushOutcome> {
        let inner = &*self.inner;

        if inner.syncing.load(Ordering::Acquire) {
            tracing::debug!("flush skipped: already syncing");
            return Ok(FlushOutcome::Skipped(SkipReason::AlreadySyncing));
        }
        if !inner.connectivity.is_connected() {
            tracing::debug!("flush skipped: offline");
            return Ok(FlushOutcome::Skipped(SkipReason::Offline));
        }
        if inner.lock_state().queue.is_empty() {
            return Ok(FlushOutcome::Skipped(SkipReason::EmptyQueue));
        }
        if inner
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("flush skipped: already syncing");
            return Ok(FlushOutcome::Skipped(SkipReason::AlreadySyncing));
        }
        let guard = FlushGuard { inner };
        // A stop aimed at a cycle that already ended must not leak into this one
        inner.stop_requested.store(false, Ordering::Release);

        let snapshot = inner.lock_state().queue.clone();
        if snapshot.is_empty() {
            // Cleared between the guard check and acquiring the flag
            return Ok(FlushOutcome::Skipped(SkipReason::EmptyQueue));
        }

        inner.events.publish(SyncEvent::Started);
        tracing::debug!(count = snapshot.len(), "flush cycle started");

        let mut summary = FlushSummary::default();
        for record in &snapshot {
            if inner.stop_requested.load(Ordering::Acquire) {
                tracing::info!("flush cycle stopped on request");
                summary.stopped = true;
                break;
            }
            if !inner.is_queued(record.id) {
                // Discarded by a concurrent clear
                continue;
            }

            match inner.executor.deliver(record.kind, &record.entity, &record.payload).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    if !inner.remove_record(record.id) {
                        tracing::debug!(id = %record.id, "delivered operation already left the queue");
                    }
                    inner.events.publish(SyncEvent::Synced(record.clone()));
                }
                Err(error) => {
                    summary.failed += 1;
                    self.handle_failure(record.id, &error, &mut summary);
                }
            }

            if inner.config.checkpoint_each_delivery {
                if let Err(e) = inner.persist_queue() {
                    tracing::warn!("failed to checkpoint sync queue: {}", e);
                }
            }
        }

        let persisted = {
            let mut state = inner.lock_state();
            if !summary.stopped {
                state.last_sync_time = Some(inner.now());
            }
            inner.store.save(&state.queue, state.last_sync_time)
        };

        drop(guard);
        inner.events.publish(SyncEvent::Completed(summary));
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            evicted = summary.evicted,
            "flush cycle completed"
        );

        match persisted {
            Ok(()) => Ok(FlushOutcome::Completed(summary)),
            Err(e) => {
                tracing::error!("failed to persist sync queue after flush: {}", e);
                Err(e)
            }
        }
    }

    fn handle_failure(&self, id: OpId, error: &DeliveryError, summary: &mut FlushSummary) {
        let inner = &self.inner;
        match inner.record_failure(id) {
            None => {
                tracing::debug!(%id, "failed operation already left the queue: {}", error);
            }
            Some((record, false)) => {
                tracing::warn!(
                    %id,
                    attempts = record.attempts,
                    max_attempts = record.max_attempts,
                    "delivery failed, will retry: {}",
                    error
                );
            }
            Some((record, true)) => {
                summary.evicted += 1;
                tracing::error!(
                    %id,
                    attempts = record.attempts,
                    "delivery failed, evicting operation: {}",
                    error
                );
                let report = inner.classifier.classify(error, SYNC_CATEGORY);
                inner.events.publish(SyncEvent::Failed { record, report });
            }
        }
    }

    /// Flush now, failing with [`Error::Offline`] instead of skipping when
    /// disconnected.
    pub async fn force_sync_now(&self) -> Result<FlushOutcome> {
        if !self.inner.connectivity.is_connected() {
            return Err(Error::Offline);
        }
        self.flush().await
    }

    /// Ask the running cycle to stop before its next delivery.
    ///
    /// An in-flight delivery is never interrupted. Does nothing when idle.
    pub fn stop_sync(&self) {
        if self.inner.syncing.load(Ordering::Acquire) {
            tracing::debug!("stop requested for running flush cycle");
            self.inner.stop_requested.store(true, Ordering::Release);
        }
    }

    pub fn status(&self) -> SyncStatus {
        let state = self.inner.lock_state();
        SyncStatus {
            is_online: self.inner.connectivity.is_connected(),
            pending_count: state.queue.len(),
            last_sync_time: state.last_sync_time,
            is_syncing: self.inner.syncing.load(Ordering::Acquire),
        }
    }

    /// Copy of the queue in delivery order.
    pub fn pending(&self) -> Vec<OperationRecord> {
        self.inner.lock_state().queue.clone()
    }

    /// Discard every queued operation.
    ///
    /// The remote is not told about discarded operations. On a storage
    /// failure the queue is left as it was.
    pub fn clear(&self) -> Result<()> {
        let inner = &self.inner;
        {
            let mut state = inner.lock_state();
            let previous = std::mem::take(&mut state.queue);
            if let Err(e) = inner.store.save_queue(&state.queue) {
                state.queue = previous;
                tracing::error!("failed to persist cleared sync queue: {}", e);
                return Err(e);
            }
            tracing::info!(discarded = previous.len(), "sync queue cleared");
        }
        inner.events.publish(SyncEvent::Cleared);
        Ok(())
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.inner.events.subscribe()
    }

    /// Start the background task: periodic flush plus flush on reconnect.
    ///
    /// Must be called from within a tokio runtime. Calling it again while
    /// running does nothing.
    pub fn initialize(&self) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Runtime(e.to_string()))?;

        let mut slot = self.inner.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Ok(());
        }
        let restored = self.inner.connectivity.on_restored();
        *slot = Some(lifecycle::spawn(
            &handle,
            self.downgrade(),
            restored,
            self.inner.config.flush_interval(),
        ));
        tracing::info!("sync engine started");
        Ok(())
    }

    /// Stop the background task and wait for it to finish.
    ///
    /// A cycle in progress stops before its next delivery.
    pub async fn shutdown(&self) {
        let running = self
            .inner
            .lifecycle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        self.stop_sync();
        if let Some(lifecycle) = running {
            lifecycle.stop().await;
            tracing::info!("sync engine stopped");
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
