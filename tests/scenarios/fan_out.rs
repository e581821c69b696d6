//! Test: Dynamic fan-out over `params_list`

use crate::helpers::*;
use serde_json::json;
use std::sync::Arc;

/// Each list element runs once, in order, producing one aggregate result
#[tokio::test]
async fn test_fan_out_runs_each_item_in_order() {
    let yaml = r#"
pipeline:
  - name: "Create robots"
    job: create_robot_account
    params_list: "{{ inputs.robots }}"
"#;
    let inputs = r#"
robots:
  - {organization: acme, robot_shortname: builder}
  - {organization: acme, robot_shortname: deployer}
  - {organization: acme, robot_shortname: scanner}
"#;
    let gateway = Arc::new(MockGateway::new().with_org("acme"));

    let stats = run(yaml, inputs, gateway.clone()).await;

    assert_run_completed(&stats);
    assert_eq!(stats.results.len(), 1);
    assert_eq!(stats.completed, 1);
    assert_step_message(&stats, "Create robots", "3 item(s) processed");
    assert_eq!(
        gateway.calls_to("create_robot_account"),
        vec![
            "create_robot_account acme+builder",
            "create_robot_account acme+deployer",
            "create_robot_account acme+scanner",
        ]
    );
}

/// A failing item stops the fan-out; later items are not attempted
#[tokio::test]
async fn test_fan_out_stops_at_failed_item() {
    let yaml = r#"
pipeline:
  - name: "fan"
    job: count
    params_list: items
  - name: "after"
    job: count
"#;
    let inputs = r#"
items:
  - {n: 1}
  - {n: 2, fail: true}
  - {n: 3}
"#;
    let (registry, seen) = counting_registry();

    let stats = run_with(yaml, inputs, Arc::new(MockGateway::new()), registry).await;

    assert_run_failed(&stats);
    assert_eq!(executed_steps(&stats), vec!["fan"]);
    assert_step_message(&stats, "fan", "Item 2 of 3 failed: asked to fail");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0]["n"], json!(1));
    assert_eq!(seen[1]["n"], json!(2));
}

/// Static params are ignored when a params_list is present
#[tokio::test]
async fn test_params_list_takes_precedence_over_params() {
    let yaml = r#"
pipeline:
  - name: "fan"
    job: count
    params: {static: true}
    params_list: "{{ items }}"
"#;
    let (registry, seen) = counting_registry();

    let stats = run_with(yaml, "items:\n  - {n: 1}\n", Arc::new(MockGateway::new()), registry).await;

    assert_run_completed(&stats);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].get("static").is_none());
}

/// An empty list is a successful step with no calls
#[tokio::test]
async fn test_empty_list_is_success() {
    let (registry, seen) = counting_registry();

    let stats = run_with(
        "pipeline:\n  - {name: fan, job: count, params_list: items}\n",
        "items: []\n",
        Arc::new(MockGateway::new()),
        registry,
    )
    .await;

    assert_run_completed(&stats);
    assert_step_message(&stats, "fan", "0 item(s) processed");
    assert!(seen.lock().unwrap().is_empty());
}

/// A list target that is not a list aborts before any item runs
#[tokio::test]
async fn test_non_list_target_aborts_run() {
    let yaml = r#"
pipeline:
  - name: "first"
    job: count
  - name: "fan"
    job: count
    params_list: teams
"#;
    let (registry, seen) = counting_registry();

    let stats = run_with(yaml, "teams: platform\n", Arc::new(MockGateway::new()), registry).await;

    assert_run_failed(&stats);
    assert_eq!(executed_steps(&stats), vec!["first"]);
    assert_eq!(seen.lock().unwrap().len(), 1);
    let reason = stats.error.unwrap();
    assert!(reason.contains("'teams' must be a list, got a string"), "{}", reason);
}

/// List elements must all be mappings
#[tokio::test]
async fn test_non_mapping_element_aborts_before_calls() {
    let (registry, seen) = counting_registry();

    let stats = run_with(
        "pipeline:\n  - {name: fan, job: count, params_list: items}\n",
        "items:\n  - {n: 1}\n  - 42\n",
        Arc::new(MockGateway::new()),
        registry,
    )
    .await;

    assert_run_failed(&stats);
    assert!(seen.lock().unwrap().is_empty());
    assert!(stats.results.is_empty());
    assert!(stats.error.unwrap().contains("item 1 is"));
}

/// Template values resolve once at load time against the inputs
#[tokio::test]
async fn test_templates_resolve_to_typed_values() {
    let yaml = r#"
pipeline:
  - name: "one"
    job: count
    params:
      org: "{{ inputs.org }}"
      members: "{{ inputs.members }}"
      missing: "{{ inputs.nope }}"
      literal: "prefix {{ inputs.org }}"
"#;
    let inputs = "org: acme\nmembers: [alice, bob]\n";
    let (registry, seen) = counting_registry();

    let stats = run_with(yaml, inputs, Arc::new(MockGateway::new()), registry).await;

    assert_run_completed(&stats);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["org"], json!("acme"));
    assert_eq!(seen[0]["members"], json!(["alice", "bob"]));
    assert_eq!(seen[0]["missing"], json!(null));
    assert_eq!(seen[0]["literal"], json!("prefix {{ inputs.org }}"));
}

/// A missing list key is a configuration error
#[tokio::test]
async fn test_missing_list_key_fails_run() {
    let (registry, _) = counting_registry();
    let loaded = load(
        "pipeline:\n  - {name: fan, job: count, params_list: absent}\n",
        "",
        &registry,
    )
    .unwrap();
    let engine = quay_pipeline::PipelineEngine::new(Arc::new(MockGateway::new()), Arc::new(registry));

    let stats = engine.run(&loaded).await;

    assert_run_failed(&stats);
    let message = stats.error.unwrap();
    assert!(message.contains("is not present in the inputs"), "{}", message);
}
