//! Loader semantics against the in-memory store: idempotency, shared
//! relationship targets, and referential skip-not-abort.

use serde_json::json;

use worldgraph::graph_model::{descriptor, EntityKind};
use worldgraph::loader::{ensure_constraints, GraphLoader};
use worldgraph::tabular::Table;
use worldgraph::testing::MemoryGraph;

#[tokio::test]
async fn loading_twice_leaves_the_graph_unchanged() {
    let store = MemoryGraph::new();
    let table = Table::tabulate(&json!([
        {"id": "P1", "name": "Roads", "status": "Active", "country_code": "BR", "country_name": "Brazil"},
        {"id": "P2", "name": "Schools", "status": "Closed", "country_code": "BR", "country_name": "Brazil"}
    ]));
    let loader = GraphLoader::new(&store);

    let first = loader
        .load(&table, descriptor(EntityKind::Project))
        .await
        .unwrap();
    assert_eq!(first.rows_loaded, 2);
    let nodes_after_one = store.node_count();
    let edges_after_one = store.edge_count();

    loader
        .load(&table, descriptor(EntityKind::Project))
        .await
        .unwrap();
    assert_eq!(store.node_count(), nodes_after_one);
    assert_eq!(store.edge_count(), edges_after_one);
}

#[tokio::test]
async fn two_projects_share_one_country_node() {
    let store = MemoryGraph::new();
    let table = Table::tabulate(&json!([
        {"id": "P1", "country_code": "US", "country_name": "United States"},
        {"id": "P2", "country_code": "US", "country_name": "United States"}
    ]));
    GraphLoader::new(&store)
        .load(&table, descriptor(EntityKind::Project))
        .await
        .unwrap();

    assert_eq!(store.nodes_with_label("Country"), 1);
    assert_eq!(store.edges_of_type("IMPLEMENTED_IN"), 2);
    assert_eq!(
        store.node_property("Country", "US", "name").as_deref(),
        Some("United States")
    );
    assert!(store.has_edge("Project", "P1", "IMPLEMENTED_IN", "Country", "US"));
    assert!(store.has_edge("Project", "P2", "IMPLEMENTED_IN", "Country", "US"));
}

#[tokio::test]
async fn disbursement_before_loan_skips_edge_but_keeps_node() {
    let store = MemoryGraph::new();
    let disbursements = Table::tabulate(&json!([
        {"disbursement_id": "D1", "amount": "500.0", "disbursement_date": "2020-01-01", "loan_number": "L1"},
        {"disbursement_id": "D2", "amount": "900.0", "disbursement_date": "2020-02-01", "loan_number": "L1"}
    ]));
    let loader = GraphLoader::new(&store);

    let report = loader
        .load(&disbursements, descriptor(EntityKind::Disbursement))
        .await
        .unwrap();
    // both nodes created, neither edge - and the second row was not aborted
    assert_eq!(report.rows_loaded, 2);
    assert_eq!(report.relationships_skipped, 2);
    assert!(store.has_node("Disbursement", "D1"));
    assert!(store.has_node("Disbursement", "D2"));
    assert_eq!(store.edges_of_type("HAS_DISBURSEMENT"), 0);

    // after the loan arrives, reloading materializes the edges
    let loans = Table::tabulate(&json!([
        {"loan_number": "L1", "original_principal_amount": "1000", "loan_status": "Active",
         "approval_date": "1999-09-09", "country_code": "IN", "country_name": "India"}
    ]));
    loader
        .load(&loans, descriptor(EntityKind::Loan))
        .await
        .unwrap();
    let report = loader
        .load(&disbursements, descriptor(EntityKind::Disbursement))
        .await
        .unwrap();
    assert_eq!(report.relationships_skipped, 0);
    assert!(store.has_edge("Loan", "L1", "HAS_DISBURSEMENT", "Disbursement", "D1"));
    assert_eq!(store.edges_of_type("HAS_DISBURSEMENT"), 2);
}

#[tokio::test]
async fn loan_amount_is_coerced_to_float() {
    let store = MemoryGraph::new();
    let loans = Table::tabulate(&json!([
        {"loan_number": "L9", "original_principal_amount": "2500000.75",
         "loan_status": "Repaid", "approval_date": "1985-01-01",
         "country_code": "MX", "country_name": "Mexico"}
    ]));
    GraphLoader::new(&store)
        .load(&loans, descriptor(EntityKind::Loan))
        .await
        .unwrap();

    assert_eq!(
        store.node_property("Loan", "L9", "amount").as_deref(),
        Some("2500000.75")
    );
    assert!(store.has_edge("Loan", "L9", "ISSUED_TO", "Country", "MX"));
}

#[tokio::test]
async fn bad_rows_are_skipped_not_fatal() {
    let store = MemoryGraph::new();
    let loans = Table::tabulate(&json!([
        {"loan_number": "L1", "original_principal_amount": "not a number", "country_code": "FR"},
        {"loan_number": "L2", "original_principal_amount": "10.5", "country_code": "FR"}
    ]));
    let report = GraphLoader::new(&store)
        .load(&loans, descriptor(EntityKind::Loan))
        .await
        .unwrap();

    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.rows_loaded, 1);
    assert!(!store.has_node("Loan", "L1"));
    assert!(store.has_node("Loan", "L2"));
}

#[tokio::test]
async fn constraints_cover_every_registered_label() {
    let store = MemoryGraph::new();
    ensure_constraints(&store).await.unwrap();
    assert_eq!(store.constraint_count(), 5);

    // idempotent on repeat
    ensure_constraints(&store).await.unwrap();
    assert_eq!(store.constraint_count(), 5);
}

#[tokio::test]
async fn dataset_envelope_scenario_produces_one_node() {
    let store = MemoryGraph::new();
    let value = json!([
        {"page": 1},
        [{"id": "DS1", "name": "X", "description": "d", "lastUpdated": "2024-01-01"}]
    ]);
    let table = Table::tabulate(&value);
    GraphLoader::new(&store)
        .load(&table, descriptor(EntityKind::Dataset))
        .await
        .unwrap();

    assert_eq!(store.nodes_with_label("Dataset"), 1);
    assert_eq!(store.node_count(), 1);
    assert_eq!(
        store.node_property("Dataset", "DS1", "name").as_deref(),
        Some("X")
    );
}
