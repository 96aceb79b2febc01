// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background task driving timer and reconnect flushes.
//!
//! One task per initialized engine. It waits on three things at once:
//! cancellation, the periodic interval, and connectivity-restored events,
//! and runs a flush for either trigger. Flushes run inline, so the task
//! itself never overlaps two cycles; the engine's guard covers the other
//! triggers.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::connectivity::RestoredReceiver;
use crate::engine::WeakEngine;

/// What woke the background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Timer,
    Restored,
}

/// Handle to a running background task.
pub(crate) struct Lifecycle {
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

impl Lifecycle {
    /// Cancel the task and wait for it to exit.
    ///
    /// A flush already running completes first.
    pub(crate) async fn stop(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("sync background task ended abnormally: {}", e);
        }
    }
}

pub(crate) fn spawn(
    handle: &Handle,
    engine: WeakEngine,
    restored: RestoredReceiver,
    interval: Option<Duration>,
) -> Lifecycle {
    let cancel_token = CancellationToken::new();
    let task = handle.spawn(run(engine, restored, interval, cancel_token.clone()));
    Lifecycle { cancel_token, task }
}

async fn run(
    engine: WeakEngine,
    mut restored: RestoredReceiver,
    interval: Option<Duration>,
    cancel_token: CancellationToken,
) {
    let mut ticker = interval.map(|period| {
        // First tick one full period after start, not immediately
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut restored_open = true;

    loop {
        let trigger = tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = next_tick(&mut ticker) => Trigger::Timer,
            event = restored.recv(), if restored_open => match event {
                Some(()) => Trigger::Restored,
                None => {
                    tracing::debug!("connectivity monitor closed; timer flushes only");
                    restored_open = false;
                    continue;
                }
            },
        };

        let Some(engine) = engine.upgrade() else {
            break;
        };

        if trigger == Trigger::Timer {
            let status = engine.status();
            if !status.is_online || status.pending_count == 0 {
                continue;
            }
        }

        tracing::debug!(?trigger, "background flush");
        if let Err(e) = engine.flush().await {
            tracing::error!(?trigger, "background flush failed: {}", e);
        }
    }

    tracing::debug!("sync background task exiting");
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
