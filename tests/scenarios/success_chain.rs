//! Test: Success Chain - steps run in document order against the gateway

use crate::helpers::*;
use quay_pipeline::core::ExecutionStatus;
use std::sync::Arc;

/// An empty pipeline completes without touching the API
#[tokio::test]
async fn test_empty_pipeline_completes() {
    let gateway = Arc::new(MockGateway::new());

    let stats = run("pipeline: []\n", "", gateway.clone()).await;

    assert_run_completed(&stats);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.completed, 0);
    assert!(stats.results.is_empty());
    assert_eq!(stats.progress(), 1.0);
    assert!(gateway.calls().is_empty());
}

/// Organization, team, robot, member: each step sees the previous one's effect
#[tokio::test]
async fn test_provisioning_chain() {
    let yaml = r#"
pipeline:
  - name: "Create organization"
    job: create_organization
    params:
      name: "{{ inputs.org }}"
      email: ops@example.com
  - name: "Create team"
    job: create_team
    params:
      organization: "{{ inputs.org }}"
      team_name: deployers
      role: creator
  - name: "Add member"
    job: add_team_member
    params:
      organization: "{{ inputs.org }}"
      team_name: deployers
      member_name: alice
  - name: "Create robot"
    job: create_robot_account
    params:
      organization: "{{ inputs.org }}"
      robot_shortname: ci
"#;
    let gateway = Arc::new(MockGateway::new());

    let stats = run(yaml, "org: acme\n", gateway.clone()).await;

    assert_run_completed(&stats);
    assert_eq!(
        executed_steps(&stats),
        vec!["Create organization", "Create team", "Add member", "Create robot"]
    );
    assert!(gateway.has_org("acme"));
    assert!(gateway.has_team("acme", "deployers"));
    assert!(gateway.has_robot("acme", "ci"));
    assert_eq!(gateway.calls_to("add_team_member"), vec!["add_team_member acme/deployers alice"]);
}

/// Disabled steps are counted as skipped and never reach the gateway
#[tokio::test]
async fn test_disabled_step_is_skipped() {
    let yaml = r#"
pipeline:
  - name: "Create organization"
    job: create_organization
    params:
      name: acme
  - name: "Delete organization"
    job: delete_organization
    enabled: false
    params:
      name: acme
  - name: "List organizations"
    job: list_organizations
"#;
    let gateway = Arc::new(MockGateway::new());

    let stats = run(yaml, "", gateway.clone()).await;

    assert_run_completed(&stats);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(executed_steps(&stats), vec!["Create organization", "List organizations"]);
    assert!(gateway.calls_to("delete_organization").is_empty());
    assert!(gateway.has_org("acme"));
}

/// RunStats serialises for `run --json`
#[tokio::test]
async fn test_run_stats_serialise() {
    let gateway = Arc::new(MockGateway::new());
    let stats = run(
        "pipeline:\n  - {name: orgs, job: list_organizations}\n",
        "",
        gateway,
    )
    .await;

    assert_eq!(stats.status, ExecutionStatus::Completed);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["status"], "Completed");
    assert_eq!(json["results"][0]["name"], "orgs");
    assert_eq!(json["results"][0]["job"], "list_organizations");
    assert!(json["results"][0]["duration"].is_number());
    assert!(json["finished_at"].is_string());
}
