// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error classification for user-facing failure reports.

use serde::{Deserialize, Serialize};

use crate::executor::DeliveryError;

/// Category tag used for sync failures.
pub const SYNC_CATEGORY: &str = "sync";

/// Annotation attached to a [`SyncEvent::Failed`](crate::SyncEvent::Failed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// The raw error text.
    pub error: String,
    /// Message suitable for showing to the user.
    pub message: String,
    /// Whether retrying later could succeed.
    pub recoverable: bool,
}

/// Turns delivery errors into user-facing reports.
///
/// Classification never influences retry policy.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &DeliveryError, category: &str) -> FailureReport;
}

/// Plain-language messages for the three delivery error kinds.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultClassifier;

impl ErrorClassifier for DefaultClassifier {
    fn classify(&self, error: &DeliveryError, category: &str) -> FailureReport {
        let (message, recoverable) = match error {
            DeliveryError::Unreachable(_) => (
                "Could not reach the server. Your change will be tried again when you are back online.",
                true,
            ),
            DeliveryError::Rejected(_) => ("This change could not be saved.", false),
            DeliveryError::Other(_) => ("Something went wrong while saving your change.", true),
        };
        tracing::debug!(category, recoverable, "classified delivery error: {}", error);

        FailureReport {
            error: error.to_string(),
            message: message.to_string(),
            recoverable,
        }
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
