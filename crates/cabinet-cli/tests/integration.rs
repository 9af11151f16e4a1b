#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cabinet(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cabinet").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("CABINET_CONFIG")
        .env_remove("MASTER_AI_API_KEY")
        .env_remove("AI_MODEL_API_KEY")
        .env_remove("MCP_ENDPOINT_PROPERTY")
        .env_remove("MCP_ENDPOINT_FINANCE")
        .env_remove("MCP_ENDPOINT_LEGAL")
        .env_remove("PROPERTY_EVENTS_SUBSCRIPTION")
        .env_remove("CABINET_HTTP_TIMEOUT_SECS")
        // Nothing listens here, so every live call fails fast.
        .env("OPA_URL", "http://127.0.0.1:9")
        .env("PROPERTY_API_BASE_URL", "http://127.0.0.1:9");
    cmd
}

// ---------------------------------------------------------------------------
// cabinet task
// ---------------------------------------------------------------------------

#[test]
fn task_maps_spelling_variants() {
    let dir = TempDir::new().unwrap();
    cabinet(&dir)
        .args(["task", "Balance Check"])
        .assert()
        .success()
        .stdout(predicate::str::diff("balance-check\n"));
}

#[test]
fn task_json_output() {
    let dir = TempDir::new().unwrap();
    let output = cabinet(&dir)
        .args(["--json", "task", "logical_delete_property"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["task"], "logical_delete");
}

#[test]
fn unknown_task_fails() {
    let dir = TempDir::new().unwrap();
    cabinet(&dir)
        .args(["task", "paint the fence"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not map to a known task"));
}

// ---------------------------------------------------------------------------
// cabinet config
// ---------------------------------------------------------------------------

#[test]
fn config_reports_missing_endpoints() {
    let dir = TempDir::new().unwrap();
    cabinet(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("no endpoint for ministry 'finance'"))
        .stdout(predicate::str::contains("no model API key configured"));
}

#[test]
fn config_file_and_env_are_merged_and_key_is_redacted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cabinet.yaml");
    std::fs::write(
        &path,
        "subscription: property-events\nministries:\n  legal: http://legal:9000\n",
    )
    .unwrap();

    let output = cabinet(&dir)
        .args(["--json", "--config", path.to_str().unwrap(), "config"])
        .env("MASTER_AI_API_KEY", "sk-secret")
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["subscription"], "property-events");
    assert_eq!(json["config"]["ministries"]["legal"], "http://legal:9000");
    assert_eq!(json["config"]["policy"]["url"], "http://127.0.0.1:9");
    assert_ne!(json["config"]["model"]["api_key"], "sk-secret");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("sk-secret"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    cabinet(&dir)
        .args(["--config", "nope.yaml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

// ---------------------------------------------------------------------------
// cabinet process
// ---------------------------------------------------------------------------

#[test]
fn unreachable_policy_server_rejects_event() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(
        &path,
        r#"{"eventId":"evt-1","action":"create","subjectId":"prop-1","actor":{"id":"u1"}}"#,
    )
    .unwrap();

    let output = cabinet(&dir)
        .args(["--json", "process", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["snapshot"]["decision"], "rejected");
    assert_eq!(json["snapshot"]["policyAllowed"], false);
    assert_eq!(json["brief"]["metrics"]["totalProperties"], 0);
}

#[test]
fn malformed_event_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, "{ not json").unwrap();

    cabinet(&dir)
        .args(["process", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decode event"));
}
