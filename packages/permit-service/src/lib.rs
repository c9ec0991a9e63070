pub mod content;
pub mod format;
pub mod lookup;
pub mod outcome;
pub mod statistics;
pub mod temporal;
pub mod tools;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;
use time::{Date, OffsetDateTime, UtcOffset};

pub use content::ContentPassage;
pub use error::{Error, Result};
pub use lookup::{InstallationQuery, PermitLookup};
pub use outcome::QueryOutcome;
pub use statistics::PermitStatistics;
pub use temporal::{DatedRecords, ExpiredQuery, ExpiringSoonQuery, ExpiringWindow, YearQuery};
pub use tools::PermitTools;

use permit_config::{Config, EmbeddingProviderConfig};
use permit_domain::PermitRecord;
use permit_providers::embedding;
use permit_storage::{
	cosmos::CosmosStore,
	query::QuerySpec,
	search::{SearchIndex, SearchRequest, SearchResponse},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes parameterized queries against the permit container.
pub trait RecordStore
where
	Self: Send + Sync,
{
	fn query<'a>(&'a self, spec: &'a QuerySpec) -> BoxFuture<'a, Result<Vec<Value>>>;
}

pub trait SearchGateway
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, request: &'a SearchRequest) -> BoxFuture<'a, Result<SearchResponse>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// Source of "now" for query windows and rendered day counts.
pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;

	fn today(&self) -> Date {
		self.now().date()
	}
}

/// Wall clock shifted to the configured local offset.
pub struct SystemClock {
	offset: UtcOffset,
}
impl SystemClock {
	pub fn new(utc_offset_minutes: i32) -> Self {
		let offset = UtcOffset::from_whole_seconds(utc_offset_minutes.saturating_mul(60))
			.unwrap_or(UtcOffset::UTC);

		Self { offset }
	}
}
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc().to_offset(self.offset)
	}
}

#[derive(Clone)]
pub struct Gateways {
	pub records: Arc<dyn RecordStore>,
	pub search: Arc<dyn SearchGateway>,
	/// Present only when `providers.embedding` is configured.
	pub embedding: Option<Arc<dyn EmbeddingProvider>>,
	pub clock: Arc<dyn Clock>,
}

pub struct PermitService {
	pub cfg: Config,
	pub gateways: Gateways,
}
impl PermitService {
	pub fn new(cfg: Config) -> Result<Self> {
		let records = CosmosStore::new(&cfg.storage.cosmos)?;
		let search = SearchIndex::new(&cfg.storage.search)
			.map_err(|err| Error::Search { message: err.to_string() })?;
		let embedding = cfg
			.providers
			.embedding
			.as_ref()
			.map(|_| Arc::new(DefaultProviders) as Arc<dyn EmbeddingProvider>);
		let clock = Arc::new(SystemClock::new(cfg.permits.utc_offset_minutes));

		Ok(Self::with_gateways(
			cfg,
			Gateways { records: Arc::new(records), search: Arc::new(search), embedding, clock },
		))
	}

	pub fn with_gateways(cfg: Config, gateways: Gateways) -> Self {
		Self { cfg, gateways }
	}

	pub fn today(&self) -> Date {
		self.gateways.clock.today()
	}

	pub(crate) async fn fetch_records(&self, spec: &QuerySpec) -> Result<Vec<PermitRecord>> {
		let rows = self.gateways.records.query(spec).await?;

		rows.into_iter().map(|row| serde_json::from_value(row).map_err(Error::from)).collect()
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

impl RecordStore for CosmosStore {
	fn query<'a>(&'a self, spec: &'a QuerySpec) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(async move { Ok(CosmosStore::query(self, spec).await?) })
	}
}

impl SearchGateway for SearchIndex {
	fn search<'a>(&'a self, request: &'a SearchRequest) -> BoxFuture<'a, Result<SearchResponse>> {
		Box::pin(async move {
			SearchIndex::search(self, request)
				.await
				.map_err(|err| Error::Search { message: err.to_string() })
		})
	}
}

/// Treats blank optional filters as absent.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
