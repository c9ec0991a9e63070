use std::sync::Arc;

use serde_json::Map;
use time::{Date, macros::date};

use permit_config::{
	Config, Cosmos, EmbeddingProviderConfig, Permits, Providers, Search, Security, Service, Storage,
};
use permit_domain::{PermitDocument, PermitEntry, PermitType};
use permit_service::{Clock, EmbeddingProvider, Gateways, PermitService, RecordStore, SearchGateway};

use crate::{FixedClock, StubSearch};

/// Reference date the fixture expirations are arranged around.
pub const FIXTURE_TODAY: Date = date!(2025 - 11 - 20);

/// Permit documents spanning every permit type and the expired, expiring, and active states
/// relative to [`FIXTURE_TODAY`].
pub fn fixture_documents() -> Vec<PermitDocument> {
	vec![
		document(
			"PLO Pipeline Semarang",
			PermitType::Plo,
			"PPN",
			vec![
				entry("PLO-2019-001", "2019-03-10", Some("2025-03-01"), "IT Semarang Refinery"),
				entry("PLO-2023-002", "2023-06-15", Some("2025-12-10"), "IT Semarang Refinery"),
			],
		),
		document(
			"PLO Tank Farm Jakarta",
			PermitType::Plo,
			"PGN",
			vec![
				entry("PLO-2024-003", "2024-01-20", Some("2026-01-05"), "IT Jakarta"),
				entry("PLO-2022-004", "2022-08-01", Some("2025-11-20"), "IT Jakarta"),
			],
		),
		document(
			"PLO Balikpapan Terminal",
			PermitType::Plo,
			"PPN",
			vec![
				entry("PLO-2020-005", "2020-02-02", Some("2025-12-20"), "IT Balikpapan"),
				entry("PLO-2021-006", "2021-07-07", Some("2027-07-07"), "IT Balikpapan"),
			],
		),
		document(
			"KKPRL Offshore Corridor",
			PermitType::KkprKkprl,
			"KPI",
			vec![entry("KK-2023-001", "2023-02-02", None, "Offshore Semarang Block")],
		),
		document(
			"Ijin Lingkungan Balongan",
			PermitType::IjinLingkungan,
			"SHU",
			vec![
				entry("IL-2021-001", "2021-11-11", None, "RU VI Balongan"),
				entry("IL-2024-002", "2024-05-05", None, "RU VI Balongan"),
			],
		),
	]
}

/// A valid configuration pointing at unreachable endpoints.
pub fn test_config() -> Config {
	Config {
		service: Service { mcp_bind: "127.0.0.1:9090".to_string(), log_level: "info".to_string() },
		storage: Storage {
			search: Search {
				endpoint: "http://127.0.0.1:1".to_string(),
				api_key: "search-key".to_string(),
				index_name: "permit-documents".to_string(),
				api_version: "2023-11-01".to_string(),
				semantic_configuration: "default".to_string(),
				timeout_ms: 1_000,
			},
			cosmos: Cosmos {
				endpoint: "http://127.0.0.1:1".to_string(),
				database: "permits".to_string(),
				container: "permit-metadata".to_string(),
				token_type: "aad".to_string(),
				auth_token: "cosmos-token".to_string(),
				api_version: "2018-12-31".to_string(),
			},
		},
		providers: Providers::default(),
		permits: Permits::default(),
		security: Security { auth_mode: "off".to_string(), auth_token: None },
	}
}

/// Embedding settings for tests that exercise hybrid content search.
pub fn test_embedding_config() -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "embedding-key".to_string(),
		path: "/embeddings".to_string(),
		model: "test-embedding".to_string(),
		dimensions: 4,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

/// A service over the given record store, a fixed clock on [`FIXTURE_TODAY`], and an empty
/// search stub unless one is supplied.
pub fn service_with(
	records: Arc<dyn RecordStore>,
	search: Option<Arc<dyn SearchGateway>>,
	embedding: Option<Arc<dyn EmbeddingProvider>>,
) -> PermitService {
	let mut cfg = test_config();

	if embedding.is_some() {
		cfg.providers.embedding = Some(test_embedding_config());
	}

	let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(FIXTURE_TODAY));
	let search = search.unwrap_or_else(|| Arc::new(StubSearch::returning(Vec::new())));

	PermitService::with_gateways(cfg, Gateways { records, search, embedding, clock })
}

fn document(
	title: &str,
	permit_type: PermitType,
	organization: &str,
	permits: Vec<PermitEntry>,
) -> PermitDocument {
	PermitDocument {
		document_title: title.to_string(),
		permit_type,
		organization: organization.to_string(),
		filepath: format!("permits/{}.pdf", title.to_lowercase().replace(' ', "-")),
		permits,
	}
}

fn entry(
	permit_number: &str,
	issue_date: &str,
	expiration_date: Option<&str>,
	installation: &str,
) -> PermitEntry {
	PermitEntry {
		permit_number: permit_number.to_string(),
		issue_date: issue_date.to_string(),
		expiration_date: expiration_date.map(str::to_string),
		permit_summary: format!("{permit_number} covering {installation}."),
		installation: installation.to_string(),
	}
}
