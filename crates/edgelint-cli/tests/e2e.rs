// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests driving the `edgelint` binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Creates a scratch directory unique to one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("edgelint-e2e-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn edgelint() -> Command {
    Command::new(env!("CARGO_BIN_EXE_edgelint"))
}

#[test]
fn clean_file_exits_zero() {
    let dir = scratch_dir("clean");
    let file = dir.join("main.vcl");
    fs::write(
        &file,
        "sub vcl_recv {\n  set req.http.X-Trace = \"1\";\n  return(lookup);\n}\n",
    )
    .unwrap();

    let output = edgelint()
        .args(["lint", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn type_mismatch_exits_nonzero_and_names_rule() {
    let dir = scratch_dir("mismatch");
    let file = dir.join("main.vcl");
    fs::write(
        &file,
        "sub vcl_recv {\n  set req.http.X = 1 + \"a\";\n}\n",
    )
    .unwrap();

    let output = edgelint()
        .args(["lint", "--format", "json", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next().expect("one JSON diagnostic");
    let json: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(json["rule"], "type-mismatch");
    assert_eq!(json["severity"], "error");
}

#[test]
fn syntax_error_is_fatal_with_one_report() {
    let dir = scratch_dir("syntax");
    let file = dir.join("broken.vcl");
    fs::write(&file, "sub vcl_recv { set ; }\n").unwrap();

    let output = edgelint()
        .args(["lint", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("syntax error"), "stderr: {stderr}");
}

#[test]
fn strict_flag_surfaces_unused_local() {
    let dir = scratch_dir("strict");
    let file = dir.join("main.vcl");
    fs::write(
        &file,
        "sub vcl_recv {\n  declare local var.unused STRING;\n}\n",
    )
    .unwrap();

    // Non-strict: clean.
    let relaxed = edgelint()
        .args(["lint", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(relaxed.status.success());

    // Strict: the warning appears, but warnings alone still exit zero.
    let strict = edgelint()
        .args(["lint", "--strict", "--format", "json", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(strict.status.success());
    let stdout = String::from_utf8_lossy(&strict.stdout);
    assert!(stdout.contains("unused-local"), "stdout: {stdout}");
}

#[test]
fn snippets_snapshot_resolves_hosted_declarations() {
    let dir = scratch_dir("snippets");
    let snapshot = dir.join("snapshot.json");
    fs::write(
        &snapshot,
        r#"{
            "dictionaries": [
                {"name": "redirects", "items": [{"key": "/old", "value": "/new"}]}
            ],
            "access_lists": [],
            "backends": [{"name": "origin", "shield": null}]
        }"#,
    )
    .unwrap();

    let file = dir.join("main.vcl");
    fs::write(
        &file,
        "sub vcl_recv {\n  set req.http.Location = table.lookup(redirects, req.url, \"/\");\n  set req.backend = F_origin;\n}\n",
    )
    .unwrap();

    let output = edgelint()
        .args([
            "lint",
            "--snippets",
            snapshot.to_str().unwrap(),
            file.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn check_subcommand_only_parses() {
    let dir = scratch_dir("check");
    let file = dir.join("main.vcl");
    // Semantically wrong (undeclared variable) but syntactically valid:
    // `check` accepts it, `lint` would not.
    fs::write(&file, "sub vcl_recv {\n  set req.http.X = var.ghost;\n}\n").unwrap();

    let output = edgelint()
        .args(["check", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
}
