// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `hearth` pointed at the given state directory.
pub fn hearth(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("hearth");
    cmd.arg("--state-dir").arg(temp.path());
    cmd
}

/// Queue an operation and return its id.
pub fn enqueue(temp: &TempDir, kind: &str, entity: &str, payload: &str) -> String {
    let output = hearth(temp)
        .args(["--output", "json", "enqueue", "--kind", kind, "--entity", entity])
        .args(["--payload", payload])
        .output()
        .unwrap();
    assert!(output.status.success(), "enqueue failed: {:?}", output);

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value["id"].as_str().unwrap().to_string()
}
