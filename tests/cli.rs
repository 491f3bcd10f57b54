//! E2E tests for the importc command line

use std::path::PathBuf;
use std::process::{Command, Output};

fn importc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_importc"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn temp_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("importc-e2e-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&path);
    let _ = std::fs::remove_file(&path);
    path
}

const NAMIBIA_EXAMPLE: &[&str] = &[
    "estimate", "-c", "na", "-v", "400000", "-e", "2000", "--age", "3",
];

/// Worked example: N$ 400,000, 2000cc, 3 years old into Namibia
#[test]
fn estimate_namibia_example() {
    let output = importc(NAMIBIA_EXAMPLE);
    let out = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(out.contains("LANDED COST ESTIMATE - Namibia"));
    assert!(out.contains("Import duty (mid passenger, 25%)"));
    assert!(out.contains("N$ 119,500.00"));
    assert!(out.contains("N$ 90,375.00"));
    assert!(out.contains("TOTAL LANDED COST: N$ 714,375.00"));
    assert!(out.contains("Estimated timeline: 59 days"));
    assert!(out.contains("SAVINGS OPPORTUNITIES"));
}

#[test]
fn estimate_json_output() {
    let mut args = NAMIBIA_EXAMPLE.to_vec();
    args.push("--json");
    let output = importc(&args);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let total: f64 = json["total"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, 714375.0);
    assert_eq!(json["country"], "na");
    assert_eq!(json["currency"]["code"], "NAD");
    assert_eq!(json["breakdown"]["duty"]["bracket"], "mid passenger");
    assert_eq!(json["id"].as_str().unwrap().len(), 16);
}

#[test]
fn estimate_from_request_file() {
    let output = importc(&[
        "estimate",
        "-i",
        "tests/data/hilux.json",
        "--current-year",
        "2026",
    ]);
    let out = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(out.contains("Toyota Hilux"));
    assert!(out.contains("TOTAL LANDED COST: N$ 714,375.00"));
}

#[test]
fn estimate_rejects_zero_value() {
    let output = importc(&["estimate", "-v", "0", "-e", "2000", "--age", "3"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("vehicle_value"));
}

#[test]
fn estimate_value_ceiling() {
    let at = importc(&["estimate", "-v", "50000000", "-e", "2000", "--age", "3"]);
    assert!(at.status.success(), "Command failed: {:?}", at);

    let above = importc(&["estimate", "-v", "50000001", "-e", "2000", "--age", "3"]);
    assert!(!above.status.success());
    assert!(stderr(&above).contains("vehicle_value"));
}

#[test]
fn estimate_rejects_non_numeric_fee() {
    let output = importc(&[
        "estimate",
        "-v",
        "250000",
        "-e",
        "1500",
        "--age",
        "2",
        "--storage-days",
        "ten",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("storage_days"));
}

#[test]
fn estimate_rejects_extreme_manufacture_year() {
    let request = temp_path("extreme-year.json");
    let json = std::fs::read_to_string("tests/data/hilux.json")
        .unwrap()
        .replace(r#"{ "years": 3 }"#, r#"{ "manufacture_year": -2147483648 }"#);
    assert!(json.contains("manufacture_year"));
    std::fs::write(&request, json).unwrap();

    let output = importc(&["estimate", "-i", request.to_str().unwrap()]);
    let err = stderr(&output);
    assert!(!output.status.success());
    assert!(err.contains("Invalid input: year"), "{}", err);
    assert!(!err.contains("panicked"));

    std::fs::remove_file(&request).unwrap();
}

#[test]
fn save_history_and_export() {
    let store = temp_path("store");
    let store_arg = store.to_str().unwrap();

    let mut args = NAMIBIA_EXAMPLE.to_vec();
    args.extend_from_slice(&["--save", store_arg, "--json"]);
    let saved = importc(&args);
    assert!(saved.status.success(), "Command failed: {:?}", saved);
    let json: serde_json::Value = serde_json::from_slice(&saved.stdout).unwrap();
    let id = json["id"].as_str().unwrap().to_string();
    assert!(stderr(&saved).contains(&format!("Saved calculation {}", id)));

    let history = importc(&["history", "-s", store_arg]);
    let out = stdout(&history);
    assert!(history.status.success(), "Command failed: {:?}", history);
    assert!(out.contains(&id));
    assert!(out.contains("N$ 714,375.00"));

    let html_path = store.join("export.html");
    let export = importc(&[
        "export",
        &id,
        "-s",
        store_arg,
        "-o",
        html_path.to_str().unwrap(),
    ]);
    assert!(export.status.success(), "Command failed: {:?}", export);
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("Landed Cost Estimate: Namibia"));
    assert!(html.contains("N$ 714,375.00"));

    let missing = importc(&["export", "0000000000000000", "-s", store_arg, "-o", "x.html"]);
    assert!(!missing.status.success());

    std::fs::remove_dir_all(&store).unwrap();
}

/// A failed save is a warning; the estimate is still printed
#[test]
fn save_failure_keeps_estimate() {
    let blocker = temp_path("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let target = blocker.join("calculations");

    let mut args = NAMIBIA_EXAMPLE.to_vec();
    args.extend_from_slice(&["--save", target.to_str().unwrap()]);
    let output = importc(&args);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("TOTAL LANDED COST: N$ 714,375.00"));
    assert!(stderr(&output).contains("Warning: calculation not saved"));

    std::fs::remove_file(&blocker).unwrap();
}

#[test]
fn access_prefers_mastery() {
    let output = importc(&[
        "access",
        "-e",
        "tests/data/entitlements.csv",
        "-u",
        "u-100",
        "-m",
        "ndapewa@example.com",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("Access: mastery"));
}

#[test]
fn access_by_user_id_only() {
    let output = importc(&["access", "-e", "tests/data/entitlements.csv", "-u", "u-100"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("Access: mistake"));
}

#[test]
fn access_denied_for_inactive_or_unknown() {
    for user in ["u-300", "u-400", "u-999"] {
        let output = importc(&["access", "-e", "tests/data/entitlements.csv", "-u", user]);
        assert_eq!(output.status.code(), Some(1), "{}", user);
        assert!(stdout(&output).contains("Access denied"));
    }
}

#[test]
fn access_required_tier() {
    let output = importc(&[
        "access",
        "-e",
        "tests/data/entitlements.csv",
        "-u",
        "u-200",
        "--require",
        "mastery",
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["granted"], false);
    assert_eq!(json["tier"], "mistake");
    assert_eq!(json["required"], "mastery");
}

#[test]
fn countries_with_rate_override() {
    let output = importc(&["countries", "--rates", "tests/data/zambia_rates.json"]);
    let out = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(out.contains("Namibia"));
    assert!(out.contains("Zambia (custom rates)"));
    assert!(out.contains("16%"));
}

#[test]
fn schema_csv_header() {
    let output = importc(&["schema", "csv-header"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(stdout(&output).trim(), "user_id,email,tier,active,country");
}

#[test]
fn schema_request_is_json() {
    let output = importc(&["schema"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "EstimateRequest");
}
