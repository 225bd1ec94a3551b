//! CLI integration tests for featplan
//!
//! Each test writes a registry document into a temporary project and drives
//! the binary against it.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const REGISTRY_PATH: &str = "2-docs/features/feature-registry.json";

/// Get a command instance for the featplan binary, isolated from user config
fn featplan_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("featplan"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .env_remove("FEATPLAN_REGISTRY")
        .env_remove("FEATPLAN_LOG");
    cmd
}

/// Create a project containing the given registry document
fn setup_registry(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    featplan_cmd(dir.path()).arg("init").assert().success();

    let path = dir.path().join(REGISTRY_PATH);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    dir
}

fn basic_registry() -> TempDir {
    setup_registry(
        r#"{
  "version": "1.0.0",
  "project_id": "demo",
  "last_updated": "2026-01-15T10:00:00Z",
  "features": [
    { "id": "FR-001", "name": "Basic Feature", "status": "completed", "dependencies": [] },
    { "id": "FR-002", "name": "Dependent Feature", "status": "planned", "dependencies": ["FR-001"] },
    { "id": "FR-003", "name": "Complex Feature", "status": "planned", "dependencies": ["FR-001", "FR-002"] }
  ],
  "dependency_graph": { "ignored": true },
  "execution_order": ["FR-003", "FR-002", "FR-001"]
}"#,
    )
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();

    featplan_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized featplan"));

    let config = fs::read_to_string(dir.path().join(".featplan/config.toml")).unwrap();
    assert!(config.contains("auto_include_dependencies = true"));
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    featplan_cmd(dir.path()).arg("init").assert().success();
    featplan_cmd(dir.path()).arg("init").assert().success();
}

#[test]
fn test_missing_registry_fails() {
    let dir = TempDir::new().unwrap();

    featplan_cmd(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open registry"));
}

#[test]
fn test_malformed_registry_fails() {
    let dir = setup_registry(r#"{ "features": null }"#);

    featplan_cmd(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid registry"));
}

#[test]
fn test_registry_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    let other = dir.path().join("other.json");
    fs::write(
        &other,
        r#"[{ "id": "FR-010", "status": "planned", "dependencies": [] }]"#,
    )
    .unwrap();

    featplan_cmd(dir.path())
        .args(["--registry", "other.json", "order"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FR-010"));
}

#[test]
fn test_registry_env_var() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("env.json"),
        r#"{ "features": [{ "id": "FR-007", "status": "completed" }] }"#,
    )
    .unwrap();

    featplan_cmd(dir.path())
        .env("FEATPLAN_REGISTRY", "env.json")
        .arg("ready")
        .assert()
        .success()
        .stdout(predicate::str::contains("No features ready"));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_validate_satisfied() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["validate", "FR-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation: passed"));
}

#[test]
fn test_validate_incomplete_fails() {
    let dir = basic_registry();

    let output = featplan_cmd(dir.path())
        .args(["--format", "json", "validate", "FR-003"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let report = json_stdout(&output);
    assert_eq!(report["valid"], false);
    assert_eq!(report["incompleteDependencies"], serde_json::json!(["FR-002"]));
    assert_eq!(report["satisfiedDependencies"], serde_json::json!(["FR-001"]));
}

#[test]
fn test_validate_unknown_feature() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["validate", "FR-999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing dependencies: FR-999"));
}

#[test]
fn test_validate_invalid_identifier() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["validate", "FR-ABC"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid identifiers: FR-ABC"));
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_order_pulls_in_dependencies() {
    let dir = basic_registry();

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "order", "FR-003"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        json_stdout(&output)["order"],
        serde_json::json!(["FR-001", "FR-002", "FR-003"])
    );
}

#[test]
fn test_order_ignores_stored_execution_order() {
    let dir = basic_registry();

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "order"])
        .output()
        .unwrap();

    assert_eq!(
        json_stdout(&output)["order"],
        serde_json::json!(["FR-001", "FR-002", "FR-003"])
    );
}

#[test]
fn test_order_text_lists_names() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["order", "FR-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution order (2)"))
        .stdout(predicate::str::contains("Basic Feature"));
}

#[test]
fn test_order_reports_cycle() {
    let dir = setup_registry(
        r#"{ "features": [
            { "id": "FR-001", "status": "planned", "dependencies": ["FR-002"] },
            { "id": "FR-002", "status": "planned", "dependencies": ["FR-001"] }
        ] }"#,
    );

    featplan_cmd(dir.path())
        .args(["order", "FR-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Circular dependency detected: FR-001 -> FR-002 -> FR-001",
        ));
}

#[test]
fn test_order_cycle_json_carries_cycle() {
    let dir = setup_registry(
        r#"{ "features": [
            { "id": "FR-001", "status": "planned", "dependencies": ["FR-001"] }
        ] }"#,
    );

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "order", "FR-001"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let body = json_stdout(&output);
    assert_eq!(body["success"], false);
    assert_eq!(body["cycle"], serde_json::json!(["FR-001"]));
}

#[test]
fn test_order_unknown_feature() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["order", "FR-404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Feature not found: FR-404"));
}

#[test]
fn test_order_rejects_dangling_dependency() {
    let dir = setup_registry(
        r#"{ "features": [
            { "id": "FR-001", "status": "completed", "dependencies": [] },
            { "id": "FR-002", "status": "planned", "dependencies": ["FR-001", "FR-999"] }
        ] }"#,
    );

    featplan_cmd(dir.path())
        .args(["order", "FR-002"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing dependencies: FR-999"));

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "order"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let body = json_stdout(&output);
    assert_eq!(
        body["validation"]["missingDependencies"],
        serde_json::json!(["FR-999"])
    );

    featplan_cmd(dir.path())
        .args(["order", "FR-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FR-001"));
}

// =============================================================================
// Plan Tests
// =============================================================================

#[test]
fn test_plan_incomplete_requires_force() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["plan", "FR-003"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("incomplete dependencies: FR-002"));
}

#[test]
fn test_plan_with_force() {
    let dir = basic_registry();

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "plan", "FR-003", "--force"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan = json_stdout(&output);
    assert_eq!(plan["order"], serde_json::json!(["FR-001", "FR-002", "FR-003"]));
    assert_eq!(
        plan["included_dependencies"],
        serde_json::json!(["FR-001", "FR-002"])
    );
    assert_eq!(plan["warnings"][0]["kind"], "forced_incomplete");
    assert_eq!(plan["warnings"][0]["dependency"], "FR-002");
}

#[test]
fn test_plan_force_from_config() {
    let dir = basic_registry();
    fs::write(
        dir.path().join(".featplan/config.toml"),
        "[resolve]\nforce = true\n",
    )
    .unwrap();

    featplan_cmd(dir.path())
        .args(["plan", "FR-003"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning: forced past incomplete dependency FR-002"));
}

#[test]
fn test_plan_without_auto_deps() {
    let dir = basic_registry();

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "plan", "FR-003", "FR-002", "--no-auto-deps", "--force"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan = json_stdout(&output);
    assert_eq!(plan["order"], serde_json::json!(["FR-002", "FR-003"]));
    assert_eq!(plan["included_dependencies"], serde_json::json!([]));
}

#[test]
fn test_plan_missing_dependency_not_waived_by_force() {
    let dir = setup_registry(
        r#"{ "features": [
            { "id": "FR-001", "status": "planned", "dependencies": ["FR-999"] }
        ] }"#,
    );

    featplan_cmd(dir.path())
        .args(["plan", "FR-001", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing dependencies: FR-999"));
}

#[test]
fn test_plan_malformed_identifier_is_not_missing() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["plan", "FR-001", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid identifiers: bogus"))
        .stderr(predicate::str::contains("missing dependencies").not());
}

#[test]
fn test_plan_no_auto_deps_warns_about_transitive_dependency() {
    let dir = setup_registry(
        r#"{ "features": [
            { "id": "FR-001", "status": "planned", "dependencies": [] },
            { "id": "FR-002", "status": "completed", "dependencies": ["FR-001"] },
            { "id": "FR-003", "status": "planned", "dependencies": ["FR-002"] }
        ] }"#,
    );

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "plan", "FR-003", "--no-auto-deps", "--force"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan = json_stdout(&output);
    assert_eq!(plan["order"], serde_json::json!(["FR-003"]));
    let excluded: Vec<&serde_json::Value> = plan["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|w| w["kind"] == "excluded_dependency")
        .collect();
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0]["feature"], "FR-002");
    assert_eq!(excluded[0]["dependency"], "FR-001");
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_deps_direct_and_transitive() {
    let dir = setup_registry(
        r#"{ "features": [
            { "id": "FR-001", "status": "completed" },
            { "id": "FR-002", "status": "completed", "dependencies": ["FR-001"] },
            { "id": "FR-003", "status": "planned", "dependencies": ["FR-002"] }
        ] }"#,
    );

    let direct = featplan_cmd(dir.path())
        .args(["-f", "json", "deps", "FR-003"])
        .output()
        .unwrap();
    assert_eq!(json_stdout(&direct)["dependencies"], serde_json::json!(["FR-002"]));

    let all = featplan_cmd(dir.path())
        .args(["-f", "json", "deps", "FR-003", "--all"])
        .output()
        .unwrap();
    assert_eq!(
        json_stdout(&all)["dependencies"],
        serde_json::json!(["FR-001", "FR-002"])
    );
}

#[test]
fn test_dependents() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["dependents", "FR-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FR-002"))
        .stdout(predicate::str::contains("FR-003"));

    featplan_cmd(dir.path())
        .args(["dependents", "FR-003"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing depends on FR-003"));
}

#[test]
fn test_deps_rejects_malformed_id() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .args(["deps", "FR-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid feature ID format"));
}

#[test]
fn test_ready_and_blocked() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .arg("ready")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ready features (1)"))
        .stdout(predicate::str::contains("FR-002"));

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "blocked"])
        .output()
        .unwrap();
    let blocked = json_stdout(&output);
    assert_eq!(blocked[0]["id"], "FR-003");
    assert_eq!(blocked[0]["blocked_by"], serde_json::json!(["FR-002"]));
}

#[test]
fn test_status_progress() {
    let dir = basic_registry();

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "status"])
        .output()
        .unwrap();

    let status = json_stdout(&output);
    assert_eq!(status["project_id"], "demo");
    assert_eq!(status["overall_progress"]["total_features"], 3);
    assert_eq!(status["overall_progress"]["completed"], 1);
    assert_eq!(status["overall_progress"]["completion_percentage"], 33);
}

// =============================================================================
// Check Tests
// =============================================================================

#[test]
fn test_status_counts_partial_progress() {
    let dir = setup_registry(
        r#"{ "features": [
            { "id": "FR-001", "status": "in-progress", "completion_percentage": 50, "dependencies": [] },
            { "id": "FR-002", "status": "planned", "dependencies": ["FR-001"] }
        ] }"#,
    );

    let output = featplan_cmd(dir.path())
        .args(["-f", "json", "status"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let status = json_stdout(&output);
    assert_eq!(status["overall_progress"]["completed"], 0);
    assert_eq!(status["overall_progress"]["completion_percentage"], 25);
}

#[test]
fn test_check_healthy() {
    let dir = basic_registry();

    featplan_cmd(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no problems found"));
}

#[test]
fn test_check_reports_problems() {
    let dir = setup_registry(
        r#"{ "features": [
            { "id": "FR-001", "status": "planned", "dependencies": ["FR-002"] },
            { "id": "FR-002", "status": "planned", "dependencies": ["FR-001"] },
            { "id": "FR-003", "status": "planned", "dependencies": ["FR-999"] },
            { "id": "feature-x", "status": "planned" }
        ] }"#,
    );

    featplan_cmd(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FR-001 -> FR-002 -> FR-001"))
        .stdout(predicate::str::contains("FR-003 depends on FR-999"))
        .stdout(predicate::str::contains("'feature-x'"))
        .stderr(predicate::str::contains("Registry check failed"));
}
