use std::sync::Arc;

use permit_domain::{PermitRecord, PermitType, SortOrder, YearOperator, dates::format_date};
use permit_service::{
	ExpiredQuery, ExpiringSoonQuery, InstallationQuery, PermitLookup, QueryOutcome, YearQuery,
};
use permit_storage::search::{SearchMode, build_payload};
use permit_testkit::{
	FIXTURE_TODAY, FailingRecordStore, InMemoryRecordStore, StubEmbedding, StubSearch,
	fixture_documents, service_with,
};

fn fixture_store() -> Arc<InMemoryRecordStore> {
	Arc::new(InMemoryRecordStore::new(fixture_documents()))
}

fn multi_partition_store() -> Arc<InMemoryRecordStore> {
	Arc::new(InMemoryRecordStore::multi_partition(fixture_documents()))
}

fn numbers(records: &[PermitRecord]) -> Vec<&str> {
	records.iter().filter_map(|record| record.permit_number.as_deref()).collect()
}

fn year_of(date: Option<&str>) -> i32 {
	date.and_then(|date| date.get(..4)).and_then(|year| year.parse().ok()).unwrap_or_default()
}

#[tokio::test]
async fn issue_year_results_satisfy_operator_and_type() {
	let service = service_with(fixture_store(), None, None);

	for operator in [YearOperator::Equal, YearOperator::Greater, YearOperator::Less] {
		let query = YearQuery {
			permit_type: Some(PermitType::Plo),
			year: Some(2023),
			operator: Some(operator),
			..Default::default()
		};
		let records = service.issue_year(&query).await.into_value();

		assert!(!records.is_empty(), "No results for {operator:?}.");

		for record in &records {
			assert_eq!(record.permit_type.as_deref(), Some("PLO"));
			assert!(operator.matches(year_of(record.issue_date.as_deref()), 2023));
		}
	}
}

#[tokio::test]
async fn greater_includes_boundary_year_and_sorts_latest_first() {
	let service = service_with(fixture_store(), None, None);
	let query =
		YearQuery { year: Some(2023), operator: Some(YearOperator::Greater), ..Default::default() };
	let records = service.issue_year(&query).await.into_value();

	assert_eq!(numbers(&records), vec!["IL-2024-002", "PLO-2024-003", "PLO-2023-002", "KK-2023-001"]);
}

#[tokio::test]
async fn year_without_operator_is_unfiltered() {
	let service = service_with(fixture_store(), None, None);
	let query = YearQuery { year: Some(1999), order_by: Some(SortOrder::Earliest), ..Default::default() };
	let records = service.issue_year(&query).await.into_value();

	assert_eq!(records.len(), 9);
	assert!(records.windows(2).all(|pair| pair[0].issue_date <= pair[1].issue_date));
}

#[tokio::test]
async fn expiration_year_selects_expiration_dates() {
	let service = service_with(fixture_store(), None, None);
	let query = YearQuery {
		year: Some(2025),
		operator: Some(YearOperator::Equal),
		organization: Some("PPN".to_string()),
		..Default::default()
	};
	let records = service.expiration_year(&query).await.into_value();

	assert_eq!(numbers(&records), vec!["PLO-2020-005", "PLO-2023-002", "PLO-2019-001"]);
	assert!(records.iter().all(|record| record.issue_date.is_none()));
}

#[tokio::test]
async fn expired_excludes_today_and_non_plo() {
	let service = service_with(fixture_store(), None, None);
	let outcome = service.expired(&ExpiredQuery::default()).await;
	let result = outcome.into_value();
	let today = format_date(FIXTURE_TODAY);

	assert_eq!(result.as_of, FIXTURE_TODAY);
	assert_eq!(numbers(&result.records), vec!["PLO-2019-001"]);

	for record in &result.records {
		assert!(record.expiration_date.as_deref().is_some_and(|date| date < today.as_str()));
		assert_eq!(record.permit_type.as_deref(), Some("PLO"));
	}
}

#[tokio::test]
async fn expiring_soon_window_is_inclusive_on_both_ends() {
	let service = service_with(fixture_store(), None, None);
	let result = service.expiring_soon(&ExpiringSoonQuery::default()).await.into_value();

	assert_eq!(result.days, 30);
	assert_eq!(numbers(&result.records), vec!["PLO-2022-004", "PLO-2023-002", "PLO-2020-005"]);

	let wider = ExpiringSoonQuery { days: Some(60), ..Default::default() };
	let result = service.expiring_soon(&wider).await.into_value();

	assert_eq!(
		numbers(&result.records),
		vec!["PLO-2022-004", "PLO-2023-002", "PLO-2020-005", "PLO-2024-003"]
	);
}

#[tokio::test]
async fn expiring_soon_latest_order_is_non_increasing() {
	let service = service_with(fixture_store(), None, None);
	let query = ExpiringSoonQuery {
		days: Some(60),
		order_by: Some(SortOrder::Latest),
		..Default::default()
	};
	let records = service.expiring_soon(&query).await.into_value().records;

	assert!(records.windows(2).all(|pair| pair[0].expiration_date >= pair[1].expiration_date));
}

#[tokio::test]
async fn blank_organization_is_treated_as_absent() {
	let store = fixture_store();
	let service = service_with(store.clone(), None, None);
	let query = ExpiredQuery { organization: Some(String::new()), order_by: None };

	assert_eq!(service.expired(&query).await.into_value().records.len(), 1);
	assert!(store.recorded_queries()[0].parameter("@organization").is_none());
}

#[tokio::test]
async fn unknown_permit_number_is_not_found() {
	let service = service_with(fixture_store(), None, None);
	let outcome = service.permit_by_number("PLO-0000-000").await;

	assert_eq!(
		outcome,
		QueryOutcome::Complete(PermitLookup::NotFound { permit_number: "PLO-0000-000".to_string() })
	);

	match service.permit_by_number(" KK-2023-001 ").await.into_value() {
		PermitLookup::Found(record) => {
			assert_eq!(record.permit_type.as_deref(), Some("KKPR/KKPRL"));
			assert_eq!(record.installation.as_deref(), Some("Offshore Semarang Block"));
		},
		other => panic!("Expected a match, got {other:?}."),
	}
}

#[tokio::test]
async fn empty_permit_number_skips_the_store() {
	let store = fixture_store();
	let service = service_with(store.clone(), None, None);
	let outcome = service.permit_by_number("   ").await;

	assert!(matches!(outcome, QueryOutcome::InvalidInput { .. }));
	assert_eq!(outcome.message(), Some("Permit number is empty."));
	assert!(store.recorded_queries().is_empty());
}

#[tokio::test]
async fn installation_match_ignores_case() {
	let service = service_with(fixture_store(), None, None);
	let query = InstallationQuery { installation: "semarang".to_string(), permit_type: None };
	let records = service.permits_by_installation(&query).await.into_value();

	assert_eq!(numbers(&records), vec!["PLO-2019-001", "PLO-2023-002", "KK-2023-001"]);

	let plo_only =
		InstallationQuery { installation: "SEMARANG".to_string(), permit_type: Some(PermitType::Plo) };

	assert_eq!(service.permits_by_installation(&plo_only).await.into_value().len(), 2);
}

#[tokio::test]
async fn organizations_are_sorted_and_unique() {
	let service = service_with(multi_partition_store(), None, None);

	assert_eq!(service.organizations().await.into_value(), vec!["KPI", "PGN", "PPN", "SHU"]);
}

#[tokio::test]
async fn statistics_balance() {
	let service = service_with(multi_partition_store(), None, None);
	let outcome = service.statistics().await;

	assert!(outcome.is_complete());

	let stats = outcome.into_value();

	assert_eq!(stats.total, 9);
	assert_eq!(stats.expired, 1);
	assert_eq!(stats.active, stats.total - stats.expired);
	assert_eq!(stats.by_type.values().sum::<u64>(), stats.total);
	assert_eq!(stats.by_organization.get("PPN"), Some(&4));
	assert!(stats.generated_at.is_some());
	assert!(stats.error.is_none());
}

#[tokio::test]
async fn aggregate_reads_issue_plain_row_queries() {
	let store = multi_partition_store();
	let service = service_with(store.clone(), None, None);

	assert!(service.statistics().await.is_complete());
	assert!(service.organizations().await.is_complete());

	let queries = store.recorded_queries();

	assert_eq!(queries.len(), 5);

	for query in &queries {
		let sql = query.render();

		for keyword in ["COUNT(", "GROUP BY", "DISTINCT"] {
			assert!(!sql.contains(keyword), "Query needs a query plan: {sql}");
		}
	}
}

#[tokio::test]
async fn store_failures_become_empty_results() {
	let service = service_with(Arc::new(FailingRecordStore::new("gateway down")), None, None);

	let listing = service.issue_year(&YearQuery::default()).await;

	assert!(listing.is_failed());
	assert!(listing.value().is_empty());
	assert!(listing.message().is_some_and(|message| message.contains("gateway down")));

	let lookup = service.permit_by_number("PLO-2019-001").await;

	assert!(matches!(lookup.value(), PermitLookup::NotFound { .. }));

	let stats = service.statistics().await.into_value();

	assert_eq!(stats.total, 0);
	assert_eq!(stats.active, 0);
	assert!(stats.by_type.is_empty());
	assert!(stats.error.as_deref().is_some_and(|error| error.contains("gateway down")));
}

#[tokio::test]
async fn content_search_maps_hits_and_uses_semantic_mode() {
	let search = Arc::new(StubSearch::returning(vec![
		StubSearch::document(Some("Permit A"), "Pipeline depth is 12 m."),
		StubSearch::document(None, "Untitled body."),
	]));
	let service = service_with(fixture_store(), Some(search.clone()), None);
	let passages = service.content("  pipeline depth ").await.into_value();

	assert_eq!(passages.len(), 2);
	assert_eq!(passages[0].title.as_deref(), Some("Permit A"));

	let requests = search.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].text, "pipeline depth");
	assert_eq!(requests[0].top_k, 10);
	assert_eq!(requests[0].mode, SearchMode::Semantic);
	assert_eq!(requests[0].select_fields, vec!["title", "content"]);
	assert!(build_payload(&requests[0], "default").get("vectorQueries").is_none());
}

#[tokio::test]
async fn content_search_goes_hybrid_with_embeddings() {
	let search = Arc::new(StubSearch::returning(Vec::new()));
	let embedding = Arc::new(StubEmbedding::constant(vec![0.1, 0.2, 0.3, 0.4]));
	let service = service_with(fixture_store(), Some(search.clone()), Some(embedding));

	service.content("flare stack").await;

	assert_eq!(
		search.requests()[0].mode,
		SearchMode::Hybrid { vector: Some(vec![0.1, 0.2, 0.3, 0.4]) }
	);
}

#[tokio::test]
async fn content_search_survives_embedding_failure() {
	let search = Arc::new(StubSearch::returning(Vec::new()));
	let service =
		service_with(fixture_store(), Some(search.clone()), Some(Arc::new(StubEmbedding::failing())));
	let outcome = service.content("flare stack").await;

	assert!(outcome.is_complete());
	assert_eq!(search.requests()[0].mode, SearchMode::Semantic);
}

#[tokio::test]
async fn empty_keyword_skips_search() {
	let search = Arc::new(StubSearch::returning(Vec::new()));
	let service = service_with(fixture_store(), Some(search.clone()), None);

	assert!(matches!(service.content(" ").await, QueryOutcome::InvalidInput { .. }));
	assert!(search.requests().is_empty());
}
