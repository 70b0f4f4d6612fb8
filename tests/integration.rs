//! Integration tests for the quartermaster binary.
//!
//! Spawns the binary, feeds a scenario on stdin, and checks the JSON plan
//! written to stdout.

use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

/// Runs the binary with `args`, writing `stdin` to it. Returns the exit
/// status, stdout, and stderr.
fn run(args: &[&str], stdin: &str) -> (bool, String, String) {
    let exe = env!("CARGO_BIN_EXE_quartermaster");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start quartermaster");

    let mut input = child.stdin.take().unwrap();
    // The binary may exit before reading, e.g. on a bad argument.
    let _ = input.write_all(stdin.as_bytes());
    drop(input);

    let output = child.wait_with_output().expect("failed to wait on child");
    (
        output.status.success(),
        String::from_utf8(output.stdout).unwrap(),
        String::from_utf8(output.stderr).unwrap(),
    )
}

/// Germany with a factory in Berlin, threatened by Russia next door.
const SCENARIO: &str = r#"{
    "players": [
        { "name": "Germany", "alliance": "Axis", "capital": "Berlin" },
        { "name": "Russia", "alliance": "Allies", "capital": "Moscow" }
    ],
    "unit_types": [
        { "name": "infantry", "category": "land", "cost": 3, "attack": 1, "defense": 2, "movement": 1, "transport_cost": 2 },
        { "name": "armour", "category": "land", "cost": 6, "attack": 3, "defense": 3, "movement": 2, "transport_cost": 3 },
        { "name": "fighter", "category": "air", "cost": 10, "attack": 3, "defense": 4, "movement": 4 },
        { "name": "transport", "category": "sea", "cost": 7, "movement": 2, "transport_capacity": 5 },
        { "name": "destroyer", "category": "sea", "cost": 8, "attack": 2, "defense": 2, "movement": 2 },
        { "name": "factory", "category": "factory", "cost": 15 }
    ],
    "territories": [
        { "name": "Berlin", "kind": "land", "production": 10, "owner": "Germany" },
        { "name": "Poland", "kind": "land", "production": 3, "owner": "Germany" },
        { "name": "Moscow", "kind": "land", "production": 8, "owner": "Russia" },
        { "name": "Baltic", "kind": "sea" }
    ],
    "connections": [["Berlin", "Poland"], ["Poland", "Moscow"], ["Berlin", "Baltic"], ["Poland", "Baltic"]],
    "units": [
        { "territory": "Berlin", "unit": "factory", "owner": "Germany" },
        { "territory": "Berlin", "unit": "infantry", "owner": "Germany", "count": 2 },
        { "territory": "Moscow", "unit": "factory", "owner": "Russia" },
        { "territory": "Moscow", "unit": "infantry", "owner": "Russia", "count": 5 },
        { "territory": "Moscow", "unit": "armour", "owner": "Russia", "count": 2 }
    ],
    "purchase": { "player": "Germany", "budget": 40 },
    "config": { "simulation_trials": 40 }
}"#;

fn plan(args: &[&str]) -> Value {
    let (ok, stdout, stderr) = run(args, SCENARIO);
    assert!(ok, "quartermaster failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is not a JSON plan")
}

#[test]
fn plans_from_stdin() {
    let report = plan(&["--quiet"]);
    assert_eq!(report["player"], "Germany");
    assert_eq!(report["budget"], 40);
    let spent = report["spent"].as_u64().unwrap();
    let remaining = report["remaining_budget"].as_u64().unwrap();
    assert_eq!(spent + remaining, 40);
}

#[test]
fn order_counts_match_placements() {
    let report = plan(&["--quiet", "--seed", "5"]);
    let ordered: u64 = report["purchase"].as_object().unwrap().values().map(|v| v.as_u64().unwrap()).sum();
    let placed: u64 = report["territories"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|t| t["placements"].as_array().unwrap())
        .flat_map(|p| p["units"].as_object().unwrap().values())
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(ordered, placed);
}

#[test]
fn budget_flag_overrides_the_scenario() {
    let report = plan(&["--quiet", "--budget", "0"]);
    assert_eq!(report["budget"], 0);
    assert_eq!(report["purchase"], serde_json::json!({}));
}

#[test]
fn same_seed_same_plan() {
    assert_eq!(plan(&["--quiet", "--seed", "9"]), plan(&["--quiet", "--seed", "9"]));
}

#[test]
fn player_flag_switches_sides() {
    let report = plan(&["--quiet", "--player", "Russia"]);
    assert_eq!(report["player"], "Russia");
    let territories: Vec<&str> = report["territories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["territory"].as_str().unwrap())
        .collect();
    assert_eq!(territories, vec!["Moscow"]);
}

#[test]
fn help_exits_cleanly() {
    let (ok, stdout, stderr) = run(&["--help"], "");
    assert!(ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("--scenario"));
}

#[test]
fn bad_arguments_fail() {
    let (ok, _, stderr) = run(&["--frobnicate"], SCENARIO);
    assert!(!ok);
    assert!(stderr.contains("unknown argument"));

    let (ok, _, stderr) = run(&["--budget", "lots"], SCENARIO);
    assert!(!ok);
    assert!(stderr.contains("--budget"));
}

#[test]
fn malformed_scenario_fails() {
    let (ok, stdout, stderr) = run(&["--quiet"], "{ not json");
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("invalid scenario JSON"));
}

#[test]
fn missing_scenario_file_fails() {
    let (ok, _, stderr) = run(&["--scenario", "/nonexistent/scenario.json"], "");
    assert!(!ok);
    assert!(stderr.contains("/nonexistent/scenario.json"));
}
