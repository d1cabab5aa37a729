//! Integration tests for CLI commands

#![allow(deprecated)]

use assert_cmd::{assert::OutputAssertExt, cargo::CommandCargoExt};
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Temp dir holding a config file with the given content
fn config_with(content: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    (tmp, path)
}

fn qp(config: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("qp").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("qp").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("templates"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("tui"));
}

#[test]
fn test_templates_lists_builtins_with_default_questions() {
    let (_tmp, config) = config_with("");

    qp(&config)
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Net revenue drivers"))
        .stdout(predicate::str::contains(
            "What are the top Net Revenue drivers in France for Oreo in QTD?",
        ))
        .stdout(predicate::str::contains("subBrand: Oreo | Chips Ahoy! | Milka | Ritz"));
}

#[test]
fn test_ask_with_selection() {
    let (_tmp, config) = config_with("");

    qp(&config)
        .args(["ask", "--template", "1", "--set", "country=Germany"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "What are the top Net Revenue drivers in Germany for Oreo in QTD?",
        ));
}

#[test]
fn test_ask_rejects_value_outside_options() {
    let (_tmp, config) = config_with("");

    qp(&config)
        .args(["ask", "--template", "1", "--set", "country=Spain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Spain"));
}

#[test]
fn test_ask_rejects_unknown_template() {
    let (_tmp, config) = config_with("");

    qp(&config)
        .args(["ask", "--template", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no template #9"));
}

#[test]
fn test_ask_uses_configured_templates_and_defaults() {
    let (_tmp, config) = config_with(
        r#"
[[templates]]
title = "Volume by region"
fragments = [
    "Show ",
    { key = "metric", options = ["Net Revenue", "Volume"], default = "Volume" },
    " for ",
    { key = "region", options = ["EMEA", "APAC"] },
]
"#,
    );

    qp(&config)
        .args(["ask", "--set", "region=APAC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Show Volume for APAC"));
}

#[test]
fn test_validate_reports_bad_template() {
    let (_tmp, config) = config_with(
        r#"
[[templates]]
title = "Twice"
fragments = [
    { key = "country", options = ["France"] },
    " and ",
    { key = "country", options = ["Germany"] },
]
"#,
    );

    qp(&config)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("template #1 (Twice)"));
}

#[test]
fn test_validate_builtin_ok() {
    let (_tmp, config) = config_with("[widget]\npresentation = \"popup\"\n");

    qp(&config)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 built-in templates OK"));
}

#[test]
fn test_init_writes_loadable_config() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("config.toml");

    qp(&path).arg("init").assert().success();
    assert!(path.exists());

    qp(&path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 configured templates OK"));

    // refuses to clobber without --force
    qp(&path).arg("init").assert().failure();
    qp(&path).args(["init", "--force"]).assert().success();
}
