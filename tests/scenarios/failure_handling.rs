//! Test: Failure Handling - fail-fast and dependency checks

use crate::helpers::*;
use quay_pipeline::core::ExecutionStatus;
use std::sync::Arc;

/// The first failed step stops the run; later steps never execute
#[tokio::test]
async fn test_fail_fast_stops_at_first_failure() {
    let yaml = r#"
pipeline:
  - name: "first"
    job: count
    params: {n: 1}
  - name: "second"
    job: count
    params: {n: 2, fail: true}
  - name: "third"
    job: count
    params: {n: 3}
"#;
    let (registry, seen) = counting_registry();

    let stats = run_with(yaml, "", Arc::new(MockGateway::new()), registry).await;

    assert_run_failed(&stats);
    assert_eq!(stats.status, ExecutionStatus::Failed);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(executed_steps(&stats), vec!["first", "second"]);
    assert_step_message(&stats, "second", "asked to fail");
    assert_eq!(seen.lock().unwrap().len(), 2);

    let reason = stats.error.clone().unwrap();
    assert!(reason.contains("Step 'second' failed"), "{}", reason);
}

/// A team cannot be created in an organization that does not exist
#[tokio::test]
async fn test_missing_organization_fails_step() {
    let yaml = r#"
pipeline:
  - name: "Create team"
    job: create_team
    params:
      organization: ghost
      team_name: devs
  - name: "Never"
    job: list_organizations
"#;
    let gateway = Arc::new(MockGateway::new());

    let stats = run(yaml, "", gateway.clone()).await;

    assert_run_failed(&stats);
    assert_step_message(&stats, "Create team", "Organization 'ghost' does not exist");
    assert!(gateway.calls_to("create_team").is_empty());
    assert!(gateway.calls_to("list_organizations").is_empty());
}

/// Missing required params fail the step before any API call
#[tokio::test]
async fn test_missing_param_fails_without_api_call() {
    let yaml = r#"
pipeline:
  - name: "Create robot"
    job: create_robot_account
    params:
      organization: acme
"#;
    let gateway = Arc::new(MockGateway::new().with_org("acme"));

    let stats = run(yaml, "", gateway.clone()).await;

    assert_run_failed(&stats);
    assert_step_message(&stats, "Create robot", "Missing required field: 'robot_shortname'");
    assert!(gateway.calls().is_empty());
}

/// Genuine API errors are failures, not idempotent successes
#[tokio::test]
async fn test_server_error_fails_step() {
    let yaml = r#"
pipeline:
  - name: "Create org"
    job: create_organization
    params: {name: acme}
"#;
    let gateway = Arc::new(MockGateway::new().failing("create_organization"));

    let stats = run(yaml, "", gateway.clone()).await;

    assert_run_failed(&stats);
    assert_step_message(&stats, "Create org", "API error (500)");
    assert!(!gateway.has_org("acme"));
}

/// A dependency check that errors out is reported, not treated as absent
#[tokio::test]
async fn test_dependency_check_error_propagates() {
    let yaml = r#"
pipeline:
  - name: "Create team"
    job: create_team
    params: {organization: acme, team_name: devs}
"#;
    let gateway = Arc::new(MockGateway::new().with_org("acme").failing("get_organization"));

    let stats = run(yaml, "", gateway.clone()).await;

    assert_run_failed(&stats);
    assert_step_message(&stats, "Create team", "Failed to check organization");
    assert!(gateway.calls_to("create_team").is_empty());
}
