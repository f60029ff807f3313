//! Debug reports

use wireup_container::{ContainerOptions, Many, NodeKind, PerScope, ReportFormat};

use crate::fixtures::{Command, Handler, KeeperB, app};

#[test]
fn test_dry_run_report_describes_plan() {
    let report = app()
        .report(|_: Many<Command>, _: PerScope<Handler>, _: KeeperB| {})
        .unwrap();

    assert_eq!(report.scopes, vec!["a".to_string(), "b".to_string()]);
    assert!(report.nodes.iter().any(|node| node.kind == NodeKind::Sequence));
    assert!(report.nodes.iter().any(|node| node.kind == NodeKind::ByScope));

    let entry = report.plan.last().unwrap();
    assert_eq!(
        report.nodes[entry.node.0].kind,
        NodeKind::Entry,
        "the entry runs last"
    );
    let store_keys: Vec<_> = report
        .plan
        .iter()
        .filter(|instance| instance.location.contains("provide_kv_store_key"))
        .map(|instance| instance.scope.clone())
        .collect();
    assert_eq!(
        store_keys,
        vec![Some("a".to_string()), Some("b".to_string())]
    );
}

#[test]
fn test_report_renders_text_and_json() {
    let report = app().report(|_: KeeperB| {}).unwrap();

    let text = report.to_string();
    assert!(text.starts_with("scopes: a, b"));
    assert!(text.contains("plan:"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert!(json["nodes"].is_array());
    assert!(json["order"].is_array());
}

#[test]
fn test_debug_run_keeps_last_report() {
    let container = app().with_options(ContainerOptions {
        debug: true,
        report_format: ReportFormat::Json,
    });
    assert!(container.last_report().is_none());
    container.run(|_: KeeperB| {}).unwrap();
    assert!(container.last_report().is_some());
}

#[test]
fn test_report_is_not_kept_without_debug() {
    let container = app();
    container.run(|_: KeeperB| {}).unwrap();
    assert!(container.last_report().is_none());
}
