// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    invalid_input = { Error::InvalidInput("max_attempts must be at least 1".into()), "max_attempts" },
    invalid_op_id = { Error::InvalidOpId("bad".into()), "invalid operation id" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn error_from_database() {
    let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, Error::Database(_)));
    assert!(err.to_string().starts_with("database error"));
}
