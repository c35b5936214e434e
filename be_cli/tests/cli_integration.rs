//! Integration tests running the built binary.

use serial_test::serial;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_be_cli"))
        .args(args)
        .env_remove("BRACKET_COMMISSION_RATE")
        .env_remove("BRACKET_PRIZE_CURVE")
        .env("BRACKET_CURRENCY_SYMBOL", "$")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run be_cli")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
#[serial]
fn test_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("USAGE:"));
}

#[test]
#[serial]
fn test_shape_json() {
    let output = run(&["--json", "shape", "--players", "64"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["total_matches"], 21);
    assert_eq!(report["rounds"][0]["label"], "Quarterfinals");
    assert_eq!(report["cohorts"][1]["last_position"], 4);
}

#[test]
#[serial]
fn test_payouts_text() {
    let output = run(&["payouts", "--players", "16", "--entry-fee", "5.00"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Net pool: $72.00"));
    assert!(text.contains("$43.20"));
    assert!(text.contains("$5.40"));
}

#[test]
#[serial]
fn test_payouts_with_overrides() {
    let output = run(&[
        "--json",
        "payouts",
        "--players",
        "4",
        "--entry-fee",
        "2.50",
        "--commission",
        "0",
        "--curve",
        "winner-takes-all",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["pool"]["net_pool"], 1000);
    assert_eq!(report["payouts"][0]["amount"], 1000);
}

#[test]
#[serial]
fn test_simulate_json() {
    let output = run(&[
        "--json",
        "simulate",
        "--players",
        "16",
        "--entry-fee",
        "1.00",
        "--seed",
        "9",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["seed"], 9);
    assert_eq!(report["matches_played"], 5);
    let awarded: i64 = report["completion"]["awards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["amount"].as_i64().unwrap())
        .sum();
    assert_eq!(awarded, 1440);
}

#[test]
#[serial]
fn test_rejects_bad_input() {
    assert!(!run(&["shape", "--players", "10"]).status.success());
    assert!(!run(&["payouts", "--players", "16", "--entry-fee", "5.001"]).status.success());
    assert!(!run(&["payouts", "--players", "16"]).status.success());
    assert!(!run(&["launch", "--players", "16"]).status.success());
}
