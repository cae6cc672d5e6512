// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! End-to-end tests for the s2doc binary: file naming and exit codes.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const TACTICAL: &str = "
bounded_context:
  id: bc_payments
  name: Payments
  aggregates: [{id: agg_payment, name: Payment}]
";

const STRATEGIC: &str = "
system:
  id: sys_shop
  name: Shop
  domains: [{id: dom_sales, name: Sales, bounded_contexts: [bc_ghost]}]
";

fn s2doc(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_s2doc"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run s2doc")
}

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

#[test]
fn names_tactical_output_after_bounded_context() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "model.yaml", TACTICAL);
    write(dir.path(), "shop.yml", STRATEGIC);

    let out = s2doc(&["-o", "docs", "model.yaml", "shop.yml"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let docs = dir.path().join("docs");
    assert!(docs.join("bc_payments.md").exists());
    assert!(docs.join("shop.md").exists());
    assert!(!docs.join("model.md").exists());

    let markdown = fs::read_to_string(docs.join("bc_payments.md")).unwrap();
    assert!(markdown.starts_with("# Payments"));
}

#[test]
fn converts_directories_recursively() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("models/nested")).unwrap();
    write(&dir.path().join("models/nested"), "shop.yaml", STRATEGIC);
    write(&dir.path().join("models"), "README.md", "not a model");

    let out = s2doc(&["-o", "out", "models"], dir.path());
    assert!(out.status.success());
    assert!(dir.path().join("out/shop.md").exists());
    assert!(!dir.path().join("out/README.md").exists());
}

#[test]
fn unknown_schema_exits_with_2() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "notes.yaml", "title: just notes\n");

    let out = s2doc(&["notes.yaml"], dir.path());
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("could not detect schema type"));
    assert!(stderr.contains("supported schemas:"));
}

#[test]
fn invalid_yaml_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.yaml", "system: [unclosed\n");

    let out = s2doc(&["broken.yaml"], dir.path());
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn missing_input_exits_with_4() {
    let dir = tempfile::tempdir().unwrap();
    let out = s2doc(&["absent.yaml"], dir.path());
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn check_reports_findings_with_3() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shop.yaml", STRATEGIC);

    let out = s2doc(&["--check", "shop.yaml"], dir.path());
    assert_eq!(out.status.code(), Some(3));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("shop.yaml: domain dom_sales: bounded_contexts references unknown id 'bc_ghost'"));
    assert!(!dir.path().join("shop.md").exists());

    write(dir.path(), "model.yaml", TACTICAL);
    let clean = s2doc(&["--check", "model.yaml"], dir.path());
    assert!(clean.status.success());
}

#[test]
fn dash_output_prints_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "model.yaml", TACTICAL);

    let out = s2doc(&["-o", "-", "--no-diagrams", "model.yaml"], dir.path());
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("# Payments"));
    assert!(!stdout.contains("```mermaid"));
    assert!(!dir.path().join("bc_payments.md").exists());
}

#[test]
fn existing_output_is_kept_without_force() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shop.yaml", STRATEGIC);
    write(dir.path(), "shop.md", "hand edited");

    let out = s2doc(&["shop.yaml"], dir.path());
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("use --force to overwrite"));
    assert_eq!(fs::read_to_string(dir.path().join("shop.md")).unwrap(), "hand edited");

    let forced = s2doc(&["--force", "-q", "shop.yaml"], dir.path());
    assert!(forced.status.success());
    assert!(forced.stderr.is_empty());
    assert!(fs::read_to_string(dir.path().join("shop.md")).unwrap().starts_with("# Shop"));
}

#[test]
fn zero_diagram_cap_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shop.yaml", STRATEGIC);

    let out = s2doc(&["--diagram-cap", "0", "shop.yaml"], dir.path());
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("diagram-cap must be at least 1"));
}

#[test]
fn context_id_cannot_leave_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "model.yaml",
        "bounded_context:\n  id: ../escaped\n  aggregates: []\n",
    );

    let out = s2doc(&["-o", "docs", "model.yaml"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.path().join("docs/_escaped.md").exists());
    assert!(!dir.path().join("escaped.md").exists());
}
