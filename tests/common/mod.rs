//! Utility helpers shared across integration tests.
#![allow(dead_code, reason = "each test crate uses a different subset")]

use assert_cmd::{Command, assert::Assert};
use serde_json::{Value, json};

/// The fenced block that replaces a table whose rows serialise to
/// `json_line` once line breaks are removed.
pub fn fenced(json_line: &str) -> String {
    format!("\n```json\n{json_line}\n```\n")
}

pub fn cli() -> Command {
    Command::cargo_bin("mdtablejson").expect("failed to create cargo command for mdtablejson")
}

pub fn run_cli_with_stdin(args: &[&str], input: &str) -> Assert {
    cli().args(args).write_stdin(input).assert()
}

pub fn run_cli_with_args(args: &[&str]) -> std::process::Output {
    cli().args(args).output().expect("failed to run command")
}

/// Build a skill request body from `(recordId, text)` pairs.
pub fn skill_request(records: &[(&str, Option<&str>)]) -> Value {
    let values: Vec<Value> = records
        .iter()
        .map(|(id, text)| json!({"recordId": id, "data": {"text": text}}))
        .collect();
    json!({ "values": values })
}
