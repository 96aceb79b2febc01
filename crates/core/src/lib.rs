// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hearth-core: Shared primitives for the hearth sync engine
//!
//! This crate provides the operation record, operation ids, and the durable
//! key-value storage used by the sync engine and the `hearth` CLI.

pub mod error;
pub mod kv;
pub mod op;
pub mod op_id;

pub use error::{Error, Result};
pub use kv::{KvStore, MemoryKv, SqliteKv};
pub use op::{OpKind, OperationRecord, DEFAULT_MAX_ATTEMPTS};
pub use op_id::{ClockSource, OpId, OpIdClock, SystemClock};
