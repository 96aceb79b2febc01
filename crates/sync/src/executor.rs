// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote executor abstraction.
//!
//! The engine hands each queued operation to a [`RemoteExecutor`], which
//! owns the actual API call. Any wire protocol, authentication or timeout
//! policy lives behind this trait; the engine only sees success or failure.

use std::future::Future;
use std::pin::Pin;

use hearth_core::OpKind;

/// Error returned by a failed delivery.
///
/// The engine retries every variant the same way; the distinction only
/// feeds the [`ErrorClassifier`](crate::ErrorClassifier).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The remote could not be reached.
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// The remote refused the mutation.
    #[error("remote rejected operation: {0}")]
    Rejected(String),

    /// Anything else.
    #[error("delivery failed: {0}")]
    Other(String),
}

/// Future returned by [`RemoteExecutor::deliver`].
pub type DeliveryFuture<'a> = Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>;

/// Delivers one operation to the backend.
///
/// Implementations must be idempotent on the remote side with respect to
/// retries: the same operation may be delivered more than once.
pub trait RemoteExecutor: Send + Sync {
    fn deliver<'a>(
        &'a self,
        kind: OpKind,
        entity: &'a str,
        payload: &'a serde_json::Value,
    ) -> DeliveryFuture<'a>;
}
