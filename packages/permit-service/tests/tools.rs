use std::sync::Arc;

use serde_json::{Value, json};

use permit_service::{
	PermitTools,
	tools::{
		GET_CURRENT_DATE, GET_LIST_DOCUMENTS_ALREADY_EXPIRED, GET_LIST_DOCUMENTS_BY_EXPIRATION_YEAR,
		GET_LIST_DOCUMENTS_BY_ISSUE_YEAR, GET_LIST_DOCUMENTS_EXPIRING_SOON, GET_LIST_ORGANIZATIONS,
		GET_PERMIT_DETAILS, GET_PERMIT_DOCUMENT_CONTENT, GET_PERMIT_STATISTICS,
		GET_PERMITS_BY_INSTALLATION, GET_TIME_DIFFERENCE,
	},
};
use permit_testkit::{
	FailingRecordStore, InMemoryRecordStore, StubSearch, fixture_documents, service_with,
};

fn tools() -> PermitTools {
	let store = Arc::new(InMemoryRecordStore::new(fixture_documents()));
	let search = Arc::new(StubSearch::returning(vec![
		StubSearch::document(Some("PLO Pipeline Semarang"), "Pipeline length 4.2 km."),
		StubSearch::document(None, "Depth 12 m."),
	]));

	PermitTools::new(service_with(store, Some(search), None))
}

fn failing_tools() -> PermitTools {
	let store = Arc::new(FailingRecordStore::new("unreachable"));
	let search = Arc::new(StubSearch::failing("timed out"));

	PermitTools::new(service_with(store, Some(search), None))
}

#[tokio::test]
async fn current_date_uses_the_service_clock() {
	assert_eq!(tools().call(GET_CURRENT_DATE, Value::Null).await, "2025-11-20");
}

#[tokio::test]
async fn time_difference_reports_days_or_zero() {
	let tools = tools();
	let days = tools
		.call(
			GET_TIME_DIFFERENCE,
			json!({ "now_datetime": "2025-11-20", "target_datetime": "2026-01-05" }),
		)
		.await;
	let malformed = tools
		.call(GET_TIME_DIFFERENCE, json!({ "now_datetime": "today", "target_datetime": "2026-01-05" }))
		.await;

	let unpadded = tools
		.call(GET_TIME_DIFFERENCE, json!({ "now_datetime": "2025-11-20", "target_datetime": "2026-1-5" }))
		.await;

	assert_eq!(days, "46");
	assert_eq!(unpadded, "46");
	assert_eq!(malformed, "0");
}

#[tokio::test]
async fn issue_year_listing_has_header_and_numbered_entries() {
	let text = tools()
		.call(
			GET_LIST_DOCUMENTS_BY_ISSUE_YEAR,
			json!({ "permit_type": "PLO", "year": 2024, "operator": "equal" }),
		)
		.await;

	assert_eq!(
		text,
		"List of documents issued: 1 items found\n\n\
		 1. PLO Tank Farm Jakarta - PLO-2024-003\n   Organization: PGN\n   \
		 Issue Date: 2024-01-20\n   Summary: PLO-2024-003 covering IT Jakarta.\n"
	);
}

#[tokio::test]
async fn empty_listings_use_no_results_sentences() {
	let tools = tools();
	let issued = tools
		.call(GET_LIST_DOCUMENTS_BY_ISSUE_YEAR, json!({ "year": 1990, "operator": "equal" }))
		.await;
	let expiring = tools
		.call(GET_LIST_DOCUMENTS_BY_EXPIRATION_YEAR, json!({ "year": 1990, "operator": "less" }))
		.await;
	let installation =
		tools.call(GET_PERMITS_BY_INSTALLATION, json!({ "installation": "Dumai" })).await;

	assert_eq!(issued, "No documents found issued in year 1990 with the specified filters.");
	assert_eq!(expiring, "No documents found expiring in year 1990 with the specified filters.");
	assert_eq!(installation, "No permits found for installation 'Dumai'.");
}

#[tokio::test]
async fn expired_and_expiring_soon_render_reference_date() {
	let tools = tools();
	let expired = tools.call(GET_LIST_DOCUMENTS_ALREADY_EXPIRED, json!({})).await;
	let expiring = tools.call(GET_LIST_DOCUMENTS_EXPIRING_SOON, json!({ "days": 30 })).await;

	assert!(expired.starts_with(
		"Documents that have already expired as of 2025-11-20:\nTotal: 1 expired permits\n"
	));
	assert!(expired.contains("   Expired On: 2025-03-01\n"));
	assert!(expiring.starts_with(
		"Documents expiring within the next 30 days (as of 2025-11-20):\nTotal: 3 permits\n"
	));
	assert!(expiring.contains("1. PLO Tank Farm Jakarta - PLO-2022-004\n"));
	assert!(expiring.contains("Expires On: 2025-11-20 (0 days remaining)\n"));
	assert!(expiring.contains("Expires On: 2025-12-20 (30 days remaining)\n"));
}

#[tokio::test]
async fn permit_details_include_status() {
	let tools = tools();
	let expired = tools.call(GET_PERMIT_DETAILS, json!({ "permit_number": "PLO-2019-001" })).await;
	let active = tools.call(GET_PERMIT_DETAILS, json!({ "permit_number": "PLO-2021-006" })).await;
	let missing = tools.call(GET_PERMIT_DETAILS, json!({ "permit_number": "NOPE-1" })).await;

	assert!(expired.contains("Status: Expired Expired 264 days ago\n"));
	assert!(expired.ends_with("Document Path: permits/plo-pipeline-semarang.pdf"));
	assert!(active.contains("Status: Active Expires in 594 days\n"));
	assert_eq!(missing, "Permit 'NOPE-1' not found in the database.");
}

#[tokio::test]
async fn content_lookup_joins_titled_blocks() {
	let text = tools().call(GET_PERMIT_DOCUMENT_CONTENT, json!({ "keyword": "pipeline" })).await;

	assert_eq!(
		text,
		"[PLO Pipeline Semarang]:\nPipeline length 4.2 km.\n\n[Untitled]:\nDepth 12 m."
	);
}

#[tokio::test]
async fn organizations_and_statistics_render() {
	let tools = tools();
	let organizations = tools.call(GET_LIST_ORGANIZATIONS, Value::Null).await;
	let statistics = tools.call(GET_PERMIT_STATISTICS, json!({})).await;
	let parsed: Value = serde_json::from_str(&statistics).expect("Statistics must be JSON.");

	assert_eq!(organizations, "Organizations (4): KPI, PGN, PPN, SHU");
	assert_eq!(parsed["total_permits"], json!(9));
	assert_eq!(parsed["active_count"], json!(8));
	assert_eq!(parsed["by_type"]["Ijin Lingkungan"], json!(2));
}

#[tokio::test]
async fn failures_render_like_empty_results_except_content() {
	let tools = failing_tools();
	let expiring = tools.call(GET_LIST_DOCUMENTS_EXPIRING_SOON, json!({})).await;
	let details = tools.call(GET_PERMIT_DETAILS, json!({ "permit_number": "PLO-2019-001" })).await;
	let content = tools.call(GET_PERMIT_DOCUMENT_CONTENT, json!({ "keyword": "pipeline" })).await;

	assert_eq!(expiring, "No documents expiring within the next 30 days.");
	assert_eq!(details, "Permit 'PLO-2019-001' not found in the database.");
	assert_eq!(content, "Error retrieving documents: Search error: timed out");
}

#[tokio::test]
async fn bad_arguments_and_unknown_tools_are_reported_as_text() {
	let tools = tools();
	let bad_operator = tools
		.call(GET_LIST_DOCUMENTS_BY_ISSUE_YEAR, json!({ "year": 2024, "operator": "between" }))
		.await;
	let wrong_type = tools
		.call(GET_LIST_DOCUMENTS_BY_EXPIRATION_YEAR, json!({ "permit_type": "KKPR/KKPRL" }))
		.await;
	let missing = tools.call(GET_PERMIT_DETAILS, json!({})).await;
	let unknown = tools.call("delete_everything", json!({})).await;

	assert!(bad_operator.starts_with("Invalid arguments for get_list_documents_by_issue_year: "));
	assert_eq!(
		wrong_type,
		"Invalid arguments for get_list_documents_by_expiration_year: permit_type must be PLO."
	);
	assert!(missing.starts_with("Invalid arguments for get_permit_details: "));
	assert_eq!(unknown, "Unknown tool: delete_everything.");
}
