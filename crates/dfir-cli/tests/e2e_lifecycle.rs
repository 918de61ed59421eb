//! E2E CLI tests covering the full case lifecycle:
//! - `dfir init` and the not-initialized error path
//! - filing with and without evidence (`dfir file`)
//! - tracking by FIR ID and by wallet address (`dfir status`)
//! - admin actions: `dfir update`, `dfir assign`, `dfir list`
//! - offline helpers: `dfir fingerprint`, `dfir validate-id`
//!
//! Each test runs the `dfir` binary as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const DEMO_ACCOUNT: &str = "0x1234567890abcdef1234567890abcdef12345678";
const CITIZEN_ACCOUNT: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the dfir binary, rooted in `dir`.
fn dfir_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dfir"));
    cmd.current_dir(dir);
    cmd.env("DFIR_SIMULATE_LATENCY", "0");
    cmd.env("DFIR_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env_remove("FORMAT");
    cmd
}

fn init_project(dir: &Path) {
    dfir_cmd(dir).args(["init"]).assert().success();
}

fn file_args<'a>(name: &'a str, category: &'a str) -> Vec<&'a str> {
    vec![
        "file",
        "--name",
        name,
        "--identity",
        "1234-5678-9012",
        "--address",
        "12 Residency Road, Bangalore",
        "--category",
        category,
        "--date",
        "2024-06-08",
        "--time",
        "14:30",
        "--location",
        "MG Road, Bangalore",
        "--description",
        "Mobile phone snatched near the metro station",
    ]
}

/// File a report as `account`, return the JSON output.
fn file_report(dir: &Path, name: &str, account: &str) -> Value {
    let mut args = file_args(name, "theft");
    args.extend(["--account", account, "--json"]);
    let output = dfir_cmd(dir).args(&args).output().expect("file should not crash");
    assert!(
        output.status.success(),
        "file failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("file --json should produce valid JSON")
}

fn file_id(dir: &Path, name: &str) -> String {
    file_report(dir, name, CITIZEN_ACCOUNT)["id"]
        .as_str()
        .expect("file output should have 'id' field")
        .to_string()
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn json_stderr(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should not crash");
    assert!(!output.status.success(), "command unexpectedly succeeded");
    serde_json::from_slice(&output.stderr).expect("error JSON on stderr")
}

/// Completed timeline entries in a `status --json` view.
fn completed(view: &Value) -> usize {
    view["record"]["timeline"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| !entry["completed_at"].is_null())
        .count()
}

// ---------------------------------------------------------------------------
// Project setup
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_snapshot() {
    let dir = TempDir::new().unwrap();
    dfir_cmd(dir.path())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(dir.path().join(".dfir/config.toml").is_file());
    assert!(dir.path().join(".dfir/cases.json").is_file());

    dfir_cmd(dir.path())
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    let err = json_stderr(dfir_cmd(dir.path()).args(["init", "--json"]));
    assert_eq!(err["error"]["error_code"], "E1003");
}

#[test]
fn commands_outside_a_project_fail() {
    let dir = TempDir::new().unwrap();
    let err = json_stderr(dfir_cmd(dir.path()).args(["status", "FIR1", "--json"]));
    assert_eq!(err["error"]["error_code"], "E1001");
}

#[test]
fn errors_are_rendered_once() {
    let dir = TempDir::new().unwrap();
    let output = dfir_cmd(dir.path())
        .args(["status", "FIR1", "--json"])
        .env("RUST_BACKTRACE", "1")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(!stderr.contains("Error:"), "{stderr}");
    assert_eq!(stderr.matches("E1001").count(), 1, "{stderr}");

    dfir_cmd(dir.path())
        .args(["status", "FIR1", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: Not a dfir project"))
        .stderr(predicate::str::contains("Error:").not());
}

#[test]
fn lowercase_id_prefix_cases_are_reachable() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let config = dir.path().join(".dfir/config.toml");
    let toml = std::fs::read_to_string(&config)
        .unwrap()
        .replace("id_prefix = \"FIR\"", "id_prefix = \"fir\"");
    std::fs::write(&config, toml).unwrap();

    let id = file_id(dir.path(), "Raj Kumar");
    assert!(id.starts_with("FIR"), "{id}");
    dfir_cmd(dir.path())
        .args(["update", &id.to_lowercase(), "acknowledged"])
        .assert()
        .success();
    let view = json_stdout(dfir_cmd(dir.path()).args(["status", &id, "--json"]));
    assert_eq!(view["record"]["status"], "Acknowledged");
}

#[test]
fn commands_find_project_from_subdirectory() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let id = file_id(dir.path(), "Raj Kumar");

    let nested = dir.path().join("reports/2024");
    std::fs::create_dir_all(&nested).unwrap();
    let view = json_stdout(dfir_cmd(&nested).args(["status", &id, "--json"]));
    assert_eq!(view["record"]["id"], id.as_str());
}

// ---------------------------------------------------------------------------
// Filing and tracking
// ---------------------------------------------------------------------------

#[test]
fn file_then_track_by_id() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());

    let filed = file_report(dir.path(), "Raj Kumar", CITIZEN_ACCOUNT);
    let id = filed["id"].as_str().unwrap();
    assert!(id.starts_with("FIR"));
    assert_eq!(filed["status"], "Filed");
    assert_eq!(filed["category"], "Theft");
    assert_eq!(filed["notice"]["title"], "FIR Submitted Successfully");

    let view = json_stdout(dfir_cmd(dir.path()).args(["status", id, "--json"]));
    assert_eq!(view["record"]["complainant_name"], "Raj Kumar");
    assert_eq!(view["record"]["status"], "Filed");
    assert_eq!(completed(&view), 1);

    let raw = std::fs::read_to_string(dir.path().join(".dfir/cases.json")).unwrap();
    assert!(!raw.contains("1234-5678-9012"));
    assert!(!raw.contains("123456789012"));
}

#[test]
fn track_by_wallet_address() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let id = file_id(dir.path(), "Raj Kumar");

    let view = json_stdout(dfir_cmd(dir.path()).args(["status", CITIZEN_ACCOUNT, "--json"]));
    assert_eq!(view["record"]["id"], id.as_str());
}

#[test]
fn track_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    file_id(dir.path(), "Raj Kumar");

    let err = json_stderr(dfir_cmd(dir.path()).args(["status", "FIR999", "--json"]));
    assert_eq!(err["error"]["error_code"], "E2001");
}

#[test]
fn ids_are_unique_across_filings() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let first = file_id(dir.path(), "Raj Kumar");
    let second = file_id(dir.path(), "Sunita Devi");
    assert_ne!(first, second);
}

#[test]
fn invalid_filing_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());

    let mut args = file_args("Raj Kumar", "theft");
    let identity = args.iter().position(|a| *a == "--identity").unwrap();
    args[identity + 1] = "1234-5678";
    args.push("--json");
    let err = json_stderr(dfir_cmd(dir.path()).args(&args));
    assert_eq!(err["error"]["error_code"], "E2003");

    let cases = std::fs::read_to_string(dir.path().join(".dfir/cases.json")).unwrap();
    assert!(!cases.contains("Raj Kumar"));
}

#[test]
fn unknown_category_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());

    let mut args = file_args("Raj Kumar", "arson");
    args.push("--json");
    let err = json_stderr(dfir_cmd(dir.path()).args(&args));
    assert_eq!(err["error"]["error_code"], "E2004");
}

#[test]
fn evidence_is_uploaded_with_report() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let photo = dir.path().join("photo.jpg");
    std::fs::write(&photo, b"not really a jpeg").unwrap();

    let mut args = file_args("Raj Kumar", "theft");
    args.extend(["--evidence", photo.to_str().unwrap(), "--json"]);
    let filed = json_stdout(dfir_cmd(dir.path()).args(&args));
    let url = filed["evidence_url"].as_str().expect("evidence url");
    assert!(url.starts_with("https://"));

    let id = filed["id"].as_str().unwrap();
    let view = json_stdout(dfir_cmd(dir.path()).args(["status", id, "--json"]));
    assert_eq!(view["evidence_url"], url);
}

#[test]
fn oversized_evidence_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let config = dir.path().join(".dfir/config.toml");
    let mut toml = std::fs::read_to_string(&config).unwrap();
    toml = toml.replace("max_bytes = 10485760", "max_bytes = 8");
    std::fs::write(&config, toml).unwrap();

    let clip = dir.path().join("clip.mp4");
    std::fs::write(&clip, vec![0u8; 64]).unwrap();

    let mut args = file_args("Raj Kumar", "theft");
    args.extend(["--evidence", clip.to_str().unwrap(), "--json"]);
    let err = json_stderr(dfir_cmd(dir.path()).args(&args));
    assert_eq!(err["error"]["error_code"], "E2005");
    assert_eq!(err["error"]["suggestion"], "Upload a file smaller than 8 bytes.");
}

// ---------------------------------------------------------------------------
// Admin actions
// ---------------------------------------------------------------------------

#[test]
fn admin_moves_case_to_resolved() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let id = file_id(dir.path(), "Raj Kumar");

    let updated = json_stdout(dfir_cmd(dir.path()).args([
        "update",
        &id,
        "investigation",
        "--account",
        DEMO_ACCOUNT,
        "--json",
    ]));
    assert_eq!(updated["status"], "Investigation");
    assert_eq!(updated["completed_stages"], 4);
    assert_eq!(updated["notice"]["title"], "Status Updated");

    let assigned = json_stdout(dfir_cmd(dir.path()).args([
        "assign",
        &id,
        "Inspector Sharma",
        "--json",
    ]));
    assert_eq!(assigned["officer"], "Inspector Sharma");

    json_stdout(dfir_cmd(dir.path()).args(["update", &id, "resolved", "--json"]));

    let view = json_stdout(dfir_cmd(dir.path()).args(["status", &id, "--json"]));
    assert_eq!(view["record"]["status"], "Resolved");
    assert_eq!(view["record"]["officer_assigned"], "Inspector Sharma");
    assert_eq!(completed(&view), 5);
}

#[test]
fn backward_transition_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let id = file_id(dir.path(), "Raj Kumar");

    dfir_cmd(dir.path())
        .args(["update", &id, "resolved"])
        .assert()
        .success();

    let err = json_stderr(dfir_cmd(dir.path()).args(["update", &id, "filed", "--json"]));
    assert_eq!(err["error"]["error_code"], "E2002");
}

#[test]
fn non_admin_account_is_denied() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let id = file_id(dir.path(), "Raj Kumar");

    let err = json_stderr(dfir_cmd(dir.path()).args([
        "update",
        &id,
        "acknowledged",
        "--account",
        CITIZEN_ACCOUNT,
        "--json",
    ]));
    assert_eq!(err["error"]["error_code"], "E4002");

    let view = json_stdout(dfir_cmd(dir.path()).args(["status", &id, "--json"]));
    assert_eq!(view["record"]["status"], "Filed");
}

#[test]
fn list_filters_by_stage_and_search() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let raj = file_id(dir.path(), "Raj Kumar");
    let sunita = file_id(dir.path(), "Sunita Devi");

    dfir_cmd(dir.path())
        .args(["update", &sunita, "under-review"])
        .assert()
        .success();

    let all = json_stdout(dfir_cmd(dir.path()).args(["list", "--json"]));
    let ids: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![sunita.as_str(), raj.as_str()]);

    let reviewing = json_stdout(dfir_cmd(dir.path()).args([
        "list",
        "--status",
        "under-review",
        "--json",
    ]));
    assert_eq!(reviewing.as_array().unwrap().len(), 1);
    assert_eq!(reviewing[0]["status"], "Under Review");

    let searched = json_stdout(dfir_cmd(dir.path()).args(["list", "--search", "raj", "--json"]));
    assert_eq!(searched.as_array().unwrap().len(), 1);
    assert_eq!(searched[0]["id"], raj.as_str());

    dfir_cmd(dir.path())
        .args(["list", "--search", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No FIRs match."));
}

#[test]
fn list_rejects_unknown_stage() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    dfir_cmd(dir.path())
        .args(["list", "--status", "closed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("under-review"));

    let err = json_stderr(dfir_cmd(dir.path()).args(["list", "--status", "closed", "--json"]));
    assert_eq!(err["error"]["error_code"], "E2004");
}

#[test]
fn stats_count_each_stage() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());
    let raj = file_id(dir.path(), "Raj Kumar");
    file_id(dir.path(), "Sunita Devi");
    dfir_cmd(dir.path())
        .args(["update", &raj, "resolved"])
        .assert()
        .success();

    let stats = json_stdout(dfir_cmd(dir.path()).args(["stats", "--json"]));
    assert_eq!(stats["stats"]["total"], 2);
    assert_eq!(stats["stats"]["filed"], 1);
    assert_eq!(stats["stats"]["resolved"], 1);
    assert_eq!(stats["features"].as_array().unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Offline helpers
// ---------------------------------------------------------------------------

#[test]
fn fingerprint_is_stable() {
    let dir = TempDir::new().unwrap();
    let first = json_stdout(dfir_cmd(dir.path()).args(["fingerprint", "123456789012", "--json"]));
    let second = json_stdout(dfir_cmd(dir.path()).args(["fingerprint", "123456789012", "--json"]));
    assert_eq!(first["fingerprint"], second["fingerprint"]);
    assert!(!first["fingerprint"].as_str().unwrap().contains("123456789012"));
}

#[test]
fn validate_id_reports_format() {
    let dir = TempDir::new().unwrap();
    let ok = json_stdout(dfir_cmd(dir.path()).args(["validate-id", "1234-5678-9012", "--json"]));
    assert_eq!(ok["valid"], true);
    assert!(!ok["masked"].as_str().unwrap().contains("1234-5678"));

    dfir_cmd(dir.path())
        .args(["validate-id", "1234-5678"])
        .assert()
        .failure();
}

#[test]
fn completions_generate_for_bash() {
    let dir = TempDir::new().unwrap();
    dfir_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dfir"));
}
