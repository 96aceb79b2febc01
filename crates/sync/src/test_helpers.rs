// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync engine tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use hearth_core::{ClockSource, KvStore, MemoryKv, OpId, OpKind, OperationRecord};
use serde_json::json;
use tokio::sync::Notify;

use crate::config::SyncConfig;
use crate::connectivity::SharedConnectivity;
use crate::engine::SyncEngine;
use crate::events::{EventReceiver, SyncEvent, SyncEventKind};
use crate::executor::{DeliveryError, DeliveryFuture, RemoteExecutor};

/// Mock clock for testing with controllable time.
#[derive(Default)]
pub struct MockClock {
    time_ms: AtomicU64,
}

impl MockClock {
    pub fn new(initial_ms: u64) -> Self {
        MockClock { time_ms: AtomicU64::new(initial_ms) }
    }

    pub fn set(&self, ms: u64) {
        self.time_ms.store(ms, Ordering::SeqCst);
    }
}

impl ClockSource for MockClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(Ordering::SeqCst)
    }
}

/// Converts milliseconds since epoch into a UTC timestamp.
pub fn utc_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap()
}

/// Create a test record with the given wall clock timestamp.
pub fn make_test_record(wall_ms: u64) -> OperationRecord {
    OperationRecord::new(
        OpId::new(wall_ms, 0, 1),
        OpKind::Update,
        "contact",
        json!({"id": format!("c{}", wall_ms)}),
        utc_ms(wall_ms as i64),
        3,
    )
    .unwrap()
}

/// In-memory store whose writes can be made to fail.
#[derive(Clone, Default)]
pub struct FlakyKv {
    inner: MemoryKv,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyKv {
    pub fn new(inner: MemoryKv) -> Self {
        FlakyKv { inner, fail_writes: Arc::new(AtomicBool::new(false)) }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> hearth_core::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full").into());
        }
        Ok(())
    }
}

impl KvStore for FlakyKv {
    fn get(&self, key: &str) -> hearth_core::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> hearth_core::Result<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> hearth_core::Result<()> {
        self.check()?;
        self.inner.remove(key)
    }
}

/// One delivery seen by [`MockExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Delivered {
    pub kind: OpKind,
    pub entity: String,
    pub payload: serde_json::Value,
}

/// Scripted remote executor.
///
/// Outcomes are scripted per payload `"id"` field; once a script runs out the
/// executor succeeds. Deliveries of a gated payload id wait for the gate to be
/// notified; a gate that is never notified simulates a hung request.
#[derive(Clone, Default)]
pub struct MockExecutor {
    calls: Arc<Mutex<Vec<Delivered>>>,
    scripts: Arc<Mutex<HashMap<String, VecDeque<Result<(), DeliveryError>>>>>,
    always_fail: Arc<Mutex<HashSet<String>>>,
    gates: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` deliveries of payload `id`, then succeed.
    pub fn fail_times(&self, id: &str, times: usize) {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.entry(id.to_string()).or_default();
        for n in 0..times {
            script.push_back(Err(DeliveryError::Unreachable(format!("attempt {} refused", n + 1))));
        }
    }

    /// Fail every delivery of payload `id`.
    pub fn always_fail(&self, id: &str) {
        self.always_fail.lock().unwrap().insert(id.to_string());
    }

    /// Hold deliveries of payload `id` until the returned gate is notified.
    pub fn gate(&self, id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(id.to_string(), Arc::clone(&gate));
        gate
    }

    /// Payload ids in delivery order.
    pub fn delivered_ids(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.payload["id"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn calls(&self) -> Vec<Delivered> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, id: &str) -> usize {
        self.delivered_ids().iter().filter(|d| d.as_str() == id).count()
    }
}

impl RemoteExecutor for MockExecutor {
    fn deliver<'a>(
        &'a self,
        kind: OpKind,
        entity: &'a str,
        payload: &'a serde_json::Value,
    ) -> DeliveryFuture<'a> {
        let id = payload["id"].as_str().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(Delivered {
            kind,
            entity: entity.to_string(),
            payload: payload.clone(),
        });

        let gate = self.gates.lock().unwrap().get(&id).cloned();
        let outcome = if self.always_fail.lock().unwrap().contains(&id) {
            Err(DeliveryError::Rejected(format!("{} rejected", id)))
        } else {
            self.scripts
                .lock()
                .unwrap()
                .get_mut(&id)
                .and_then(|s| s.pop_front())
                .unwrap_or(Ok(()))
        };

        Box::pin(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            outcome
        })
    }
}

/// Collaborators for an engine under test, kept so a test can drive them
/// and "restart" the engine over the same storage.
pub struct Harness {
    pub kv: FlakyKv,
    pub monitor: SharedConnectivity,
    pub executor: MockExecutor,
    pub clock: Arc<MockClock>,
    pub config: SyncConfig,
}

impl Harness {
    /// Offline harness with the timer disabled and the clock at 1000ms.
    pub fn new() -> Self {
        Harness {
            kv: FlakyKv::new(MemoryKv::new()),
            monitor: SharedConnectivity::new(false),
            executor: MockExecutor::new(),
            clock: Arc::new(MockClock::new(1000)),
            config: SyncConfig { flush_interval_secs: 0, ..SyncConfig::default() },
        }
    }

    /// Build an engine over the harness storage.
    pub fn engine(&self) -> SyncEngine {
        SyncEngine::builder(
            Arc::new(self.kv.clone()),
            Arc::new(self.monitor.clone()),
            Arc::new(self.executor.clone()),
        )
        .config(self.config.clone())
        .clock(self.clock.clone())
        .build()
        .unwrap()
    }
}

/// Receive events until (and including) the next `Completed`.
pub async fn events_until_completed(rx: &mut EventReceiver) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let done = event.kind() == SyncEventKind::Completed;
        events.push(event);
        if done {
            break;
        }
    }
    events
}

/// Count events of one kind.
pub fn count_kind(events: &[SyncEvent], kind: SyncEventKind) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}
