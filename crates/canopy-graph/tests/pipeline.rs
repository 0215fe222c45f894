//! End-to-end walk: JSON snapshot -> engine -> queries -> view output.

use canopy_core::GraphSnapshot;
use canopy_graph::{GraphEngine, ImpactPolicy, RiskLevel, ViewContext, ViewMode};
use std::collections::HashSet;

fn payments_snapshot() -> GraphSnapshot {
    // Two domains. checkout() calls charge() across files; charge() calls
    // audit() inside the payments domain; an extra edge references a node
    // that is not in the snapshot and must be ignored.
    let json = r##"{
        "domains": [
            {"id": "domain:shop", "name": "shop"},
            {"id": "domain:payments", "name": "payments", "color": "#336699"}
        ],
        "files": [
            {"id": "shop/cart.ts", "path": "shop/cart.ts", "parent": "domain:shop"},
            {"id": "pay/charge.ts", "path": "pay/charge.ts", "parent": "domain:payments"}
        ],
        "symbols": [
            {"id": "shop/cart.ts:checkout:5", "name": "checkout", "file_path": "shop/cart.ts",
             "start_line": 5, "end_line": 40, "kind": "function", "parent": "shop/cart.ts",
             "domain": "shop"},
            {"id": "pay/charge.ts:charge:3", "name": "charge", "file_path": "pay/charge.ts",
             "start_line": 3, "end_line": 30, "kind": "function", "parent": "pay/charge.ts",
             "impact_depth": 5, "domain": "payments"},
            {"id": "pay/charge.ts:audit:35", "name": "audit", "file_path": "pay/charge.ts",
             "start_line": 35, "end_line": 50, "kind": "function", "parent": "pay/charge.ts",
             "domain": "payments"}
        ],
        "edges": [
            {"source": "domain:shop", "target": "shop/cart.ts", "kind": "contains"},
            {"source": "domain:payments", "target": "pay/charge.ts", "kind": "contains"},
            {"source": "shop/cart.ts:checkout:5", "target": "pay/charge.ts:charge:3", "kind": "call"},
            {"source": "pay/charge.ts:charge:3", "target": "pay/charge.ts:audit:35", "kind": "call"},
            {"source": "pay/charge.ts:charge:3", "target": "missing:node", "kind": "call"}
        ]
    }"##;
    GraphSnapshot::from_json(json).expect("fixture snapshot decodes")
}

#[test]
fn snapshot_load_ignores_dangling_edges() {
    let mut engine = GraphEngine::new();
    engine.load_snapshot(&payments_snapshot());

    let stats = engine.graph_stats();
    assert_eq!(stats.node_count, 7);
    assert_eq!(stats.edge_count, 4, "edge to missing:node dropped");
    assert_eq!(stats.skipped_edges, 1);
}

#[test]
fn related_nodes_then_impact_on_same_focus() {
    let mut engine = GraphEngine::new();
    engine.load_snapshot(&payments_snapshot());

    let related = engine.related_nodes("pay/charge.ts:charge:3", None);
    assert_eq!(related.parents, vec!["pay/charge.ts"]);
    assert_eq!(related.callers, vec!["shop/cart.ts:checkout:5"]);
    assert_eq!(related.callees, vec!["pay/charge.ts:audit:35"]);
    assert!(related
        .same_file
        .contains(&"pay/charge.ts:audit:35".to_string()));

    let impact = engine.analyze_impact("pay/charge.ts:charge:3", ImpactPolicy::Unbounded);
    assert_eq!(impact.upstream, vec!["shop/cart.ts:checkout:5"]);
    assert_eq!(impact.downstream, vec!["pay/charge.ts:audit:35"]);
    assert_eq!(impact.affected_functions, 2);
    // Files: cart.ts + charge.ts; domains: shop + payments.
    assert_eq!(impact.affected_files, 2);
    assert_eq!(impact.affected_domains, 2);
    // raw = 2 + 10 + 40 = 52, impact_depth 5 => x1.0 => high band.
    assert_eq!(impact.score, 52.0);
    assert_eq!(impact.risk, RiskLevel::High);
}

#[test]
fn capped_policy_reports_raw_counts() {
    let mut engine = GraphEngine::new();
    engine.load_snapshot(&payments_snapshot());

    let impact = engine.analyze_impact("pay/charge.ts:audit:35", ImpactPolicy::depth_capped());
    // Dependents only: charge (1 hop) and checkout (2 hops).
    assert_eq!(impact.affected_functions, 2);
    assert!(impact.downstream.is_empty());
    assert_eq!(impact.score, 2.0);
    assert_eq!(impact.risk, RiskLevel::Low);
}

#[test]
fn coupling_is_stable_across_reloads() {
    let snapshot = payments_snapshot();
    let mut engine = GraphEngine::new();

    engine.load_snapshot(&snapshot);
    let first = engine
        .coupling_metrics()
        .get("pay/charge.ts:charge:3")
        .cloned()
        .unwrap();

    engine.load_snapshot(&snapshot);
    let second = engine
        .coupling_metrics()
        .get("pay/charge.ts:charge:3")
        .cloned()
        .unwrap();

    assert_eq!(first, second);
    // charge: 1 in (checkout) + 1 out (audit); the dangling edge does not
    // contribute degree.
    assert_eq!(first.cbo, 2);
}

#[test]
fn architecture_view_uses_declared_domain_color() {
    let mut engine = GraphEngine::new();
    engine.load_snapshot(&payments_snapshot());

    let result = engine.apply_view_mode(&ViewContext {
        mode: Some(ViewMode::Architecture),
        ..Default::default()
    });

    let ids: HashSet<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(
        ids,
        ["domain:shop", "shop/cart.ts", "domain:payments", "pay/charge.ts"]
            .into_iter()
            .collect()
    );

    let charge_file_edge = result
        .edges
        .iter()
        .find(|e| e.target == "pay/charge.ts")
        .expect("domain -> file edge survives");
    assert_eq!(charge_file_edge.color.as_deref(), Some("#336699"));
}

#[test]
fn search_across_modes_keeps_hierarchy_connected() {
    let mut engine = GraphEngine::new();
    engine.load_snapshot(&payments_snapshot());

    let result = engine.apply_view_mode(&ViewContext {
        mode: Some(ViewMode::Codebase),
        query: Some("audit".to_string()),
        ..Default::default()
    });

    let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["domain:payments", "pay/charge.ts", "pay/charge.ts:audit:35"]
    );
    let audit = result
        .nodes
        .iter()
        .find(|n| n.id == "pay/charge.ts:audit:35")
        .unwrap();
    assert!(audit.highlighted);
    assert!(audit.heat_disabled);
}

#[test]
fn view_is_idempotent_through_the_facade() {
    let mut engine = GraphEngine::new();
    engine.load_snapshot(&payments_snapshot());

    let ctx = ViewContext {
        mode: Some(ViewMode::Trace),
        focus: Some("pay/charge.ts:charge:3".to_string()),
        related: ["pay/charge.ts:audit:35".to_string()].into_iter().collect(),
        query: None,
    };
    assert_eq!(engine.apply_view_mode(&ctx), engine.apply_view_mode(&ctx));
}
