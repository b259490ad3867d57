//! End-to-end runs: JSON files on disk through CSV into the in-memory store.

use std::fs;

use serde_json::json;

use worldgraph::pipeline;
use worldgraph::testing::MemoryGraph;

fn write_fixture_dir(dir: &std::path::Path) {
    fs::write(
        dir.join("datasets.json"),
        json!([
            {"page": 1, "pages": 1},
            [
                {"id": "DS1", "name": "Indicators", "description": "d", "lastUpdated": "2024-01-01"},
                {"id": "DS2", "name": "Archive", "description": null, "lastUpdated": "2023-05-05"}
            ]
        ])
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("loans.json"),
        json!([
            {"loan_number": "L1", "original_principal_amount": "1000.5", "loan_status": "Active",
             "approval_date": "2001-01-01", "country_code": "BR", "country_name": "Brazil"},
            {"loan_number": "L2", "original_principal_amount": "777", "loan_status": "Repaid",
             "approval_date": "1991-01-01", "country_code": "IN", "country_name": "India"}
        ])
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("disbursements.json"),
        json!([
            {"disbursement_id": "D1", "amount": "10", "disbursement_date": "2002-02-02", "loan_number": "L1"},
            {"disbursement_id": "D2", "amount": "20", "disbursement_date": "2003-03-03", "loan_number": "MISSING"}
        ])
        .to_string(),
    )
    .unwrap();
}

#[tokio::test]
async fn full_run_materializes_the_expected_graph() {
    let input = tempfile::tempdir().unwrap();
    let csv = tempfile::tempdir().unwrap();
    write_fixture_dir(input.path());

    let store = MemoryGraph::new();
    let reports = pipeline::run(&store, input.path(), csv.path()).await.unwrap();
    assert_eq!(reports.len(), 3);

    // 2 datasets + 2 loans + 2 countries + 2 disbursements
    assert_eq!(store.node_count(), 8);
    assert_eq!(store.nodes_with_label("Dataset"), 2);
    assert_eq!(store.nodes_with_label("Country"), 2);
    // both loans got their country edge; only D1 found its loan
    assert_eq!(store.edges_of_type("ISSUED_TO"), 2);
    assert_eq!(store.edges_of_type("HAS_DISBURSEMENT"), 1);
    assert!(store.has_edge("Loan", "L1", "HAS_DISBURSEMENT", "Disbursement", "D1"));
    assert!(store.has_node("Disbursement", "D2"));

    // amounts were coerced through the CSV text round trip
    assert_eq!(
        store.node_property("Loan", "L1", "amount").as_deref(),
        Some("1000.5")
    );
    // a JSON null travels as the sentinel and lands verbatim
    assert_eq!(
        store.node_property("Dataset", "DS2", "description").as_deref(),
        Some("nil")
    );
}

#[tokio::test]
async fn rerunning_the_pipeline_is_idempotent() {
    let input = tempfile::tempdir().unwrap();
    let csv = tempfile::tempdir().unwrap();
    write_fixture_dir(input.path());

    let store = MemoryGraph::new();
    pipeline::run(&store, input.path(), csv.path()).await.unwrap();
    let nodes = store.node_count();
    let edges = store.edge_count();

    pipeline::run(&store, input.path(), csv.path()).await.unwrap();
    assert_eq!(store.node_count(), nodes);
    assert_eq!(store.edge_count(), edges);
}

#[tokio::test]
async fn unknown_stems_are_skipped() {
    let input = tempfile::tempdir().unwrap();
    let csv = tempfile::tempdir().unwrap();
    fs::write(input.path().join("metrics.json"), r#"[{"id": 1}]"#).unwrap();

    let store = MemoryGraph::new();
    let reports = pipeline::run(&store, input.path(), csv.path()).await.unwrap();
    assert!(reports.is_empty());
    assert_eq!(store.node_count(), 0);
    // constraints are still ensured before the load stage
    assert_eq!(store.constraint_count(), 5);
}
