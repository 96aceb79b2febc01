// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitoring.
//!
//! The engine asks a [`ConnectivityMonitor`] whether it is online before
//! every flush, and listens for "restored" transitions to trigger one.
//! Lost connectivity needs no subscription: flushes simply start skipping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// Source of online/offline state.
pub trait ConnectivityMonitor: Send + Sync {
    /// Current state.
    fn is_connected(&self) -> bool;

    /// Subscribe to disconnected→connected transitions.
    fn on_restored(&self) -> RestoredReceiver;
}

/// Subscription to connectivity-restored transitions.
pub struct RestoredReceiver {
    rx: broadcast::Receiver<()>,
}

impl RestoredReceiver {
    pub fn new(rx: broadcast::Receiver<()>) -> Self {
        RestoredReceiver { rx }
    }

    /// Waits for the next restored transition.
    ///
    /// Returns `None` once the monitor is gone. Missed transitions collapse
    /// into one, since a single flush covers them all.
    pub async fn recv(&mut self) -> Option<()> {
        match self.rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => Some(()),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

/// Connectivity state driven by the host application.
///
/// Cheap to clone; all clones share one state. Call
/// [`set_connected`](Self::set_connected) from whatever platform hook
/// reports network changes.
#[derive(Clone)]
pub struct SharedConnectivity {
    inner: Arc<Inner>,
}

struct Inner {
    connected: AtomicBool,
    restored_tx: broadcast::Sender<()>,
}

impl SharedConnectivity {
    /// Create a monitor with the given initial state.
    pub fn new(connected: bool) -> Self {
        let (restored_tx, _) = broadcast::channel(16);
        SharedConnectivity {
            inner: Arc::new(Inner { connected: AtomicBool::new(connected), restored_tx }),
        }
    }

    /// Record a connectivity change.
    ///
    /// Only an offline→online change notifies restored subscribers.
    pub fn set_connected(&self, connected: bool) {
        let was = self.inner.connected.swap(connected, Ordering::AcqRel);
        if was == connected {
            return;
        }
        if connected {
            tracing::info!("connectivity restored");
            // No subscribers is fine
            let _ = self.inner.restored_tx.send(());
        } else {
            tracing::info!("connectivity lost");
        }
    }
}

impl Default for SharedConnectivity {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConnectivityMonitor for SharedConnectivity {
    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    fn on_restored(&self) -> RestoredReceiver {
        RestoredReceiver::new(self.inner.restored_tx.subscribe())
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
