use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use assert_cmd::{cargo, prelude::*};
use chrono::{Datelike, Months, Utc};
use predicates::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

/// Command isolated from the user's config and history
fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("divcal"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd.arg("--no-color");
    cmd
}

fn months_ago(n: u32) -> chrono::NaiveDate {
    Utc::now()
        .checked_sub_months(Months::new(n))
        .expect("valid date")
        .date_naive()
}

/// 0.5 five months ago and 0.3 eleven months ago for TEST.TW
fn write_dividends(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("dividends.csv");
    let content = format!(
        "symbol,date,amount\nTEST.TW,{},0.5\nTEST.TW,{},0.3\nOTHER,{},1.0\n",
        months_ago(5).format("%Y-%m-%d"),
        months_ago(11).format("%Y-%m-%d"),
        months_ago(2).format("%Y-%m-%d"),
    );
    std::fs::write(&path, content).expect("failed to write dividends fixture");
    path
}

#[test]
fn analyze_single_holding_json() {
    let home = setup_temp_home();
    let csv = write_dividends(home.path());

    let output = base_cmd(&home)
        .arg("--json")
        .arg("--csv")
        .arg(&csv)
        .arg("analyze")
        .arg("TEST.TW=1")
        .output()
        .expect("failed to run divcal");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let decimal = |v: &serde_json::Value| Decimal::from_str(v.as_str().unwrap()).unwrap();

    assert_eq!(json["has_data"], true);
    assert_eq!(decimal(&json["annual_total"]), dec!(800));
    assert_eq!(decimal(&json["average_monthly"]), dec!(66.67));

    let monthly = json["monthly_totals"].as_array().unwrap();
    assert_eq!(monthly.len(), 12);
    let may_like = months_ago(5).month() as usize - 1;
    let nov_like = months_ago(11).month() as usize - 1;
    assert_eq!(decimal(&monthly[may_like]), dec!(500));
    assert_eq!(decimal(&monthly[nov_like]), dec!(300));

    let rows = json["matrix"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["symbol"], "TEST.TW");
}

#[test]
fn analyze_table_output_without_color() {
    let home = setup_temp_home();
    let csv = write_dividends(home.path());

    base_cmd(&home)
        .arg("--csv")
        .arg(&csv)
        .arg("analyze")
        .arg("TEST.TW=1")
        .arg("OTHER=0.01")
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated annual dividends"))
        .stdout(predicate::str::contains("$810"))
        .stdout(predicate::str::contains("TEST.TW"))
        .stdout(predicate::str::contains("OTHER"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn analyze_numeric_code_gets_suffix() {
    let home = setup_temp_home();
    let csv = home.path().join("dividends.csv");
    std::fs::write(
        &csv,
        format!("symbol,date,amount\n0056.TW,{},1\n", months_ago(3).format("%Y-%m-%d")),
    )
    .unwrap();

    base_cmd(&home)
        .arg("--csv")
        .arg(&csv)
        .arg("analyze")
        .arg("0056=2")
        .assert()
        .success()
        .stdout(predicate::str::contains("0056.TW"))
        .stdout(predicate::str::contains("$2,000"));
}

#[test]
fn analyze_duplicate_symbol_warns_and_keeps_first() {
    let home = setup_temp_home();
    let csv = write_dividends(home.path());

    base_cmd(&home)
        .arg("--csv")
        .arg(&csv)
        .arg("analyze")
        .arg("TEST.TW=1")
        .arg("test.tw=5")
        .assert()
        .success()
        .stderr(predicate::str::contains("TEST.TW is already in the portfolio"))
        .stdout(predicate::str::contains("$800"));
}

#[test]
fn analyze_all_failures_reports_no_data() {
    let home = setup_temp_home();
    let missing = home.path().join("missing.csv");

    base_cmd(&home)
        .arg("--csv")
        .arg(&missing)
        .arg("analyze")
        .arg("AAA=1")
        .arg("BBB=1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to read AAA"))
        .stdout(predicate::str::contains("Failed to read BBB"))
        .stdout(predicate::str::contains("No dividend records"))
        .stdout(predicate::str::contains("Symbol").not());
}

#[test]
fn analyze_exports_matrix_csv() {
    let home = setup_temp_home();
    let csv = write_dividends(home.path());
    let export = home.path().join("calendar.csv");

    base_cmd(&home)
        .arg("--csv")
        .arg(&csv)
        .arg("analyze")
        .arg("TEST.TW=1")
        .arg("--export")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported calendar"));

    let content = std::fs::read_to_string(&export).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Symbol,1,2,3"));
    assert!(lines[1].starts_with("TEST.TW,"));
    assert!(lines[2].starts_with("Total,"));
}

#[test]
fn invalid_config_file_fails() {
    let home = setup_temp_home();
    let config = home.path().join("config.toml");
    std::fs::write(&config, "share_unit = 0\n").unwrap();

    base_cmd(&home)
        .arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("AAPL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}
