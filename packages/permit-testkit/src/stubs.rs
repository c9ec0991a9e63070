use std::sync::Mutex;

use time::{Date, OffsetDateTime};

use permit_config::EmbeddingProviderConfig;
use permit_service::{BoxFuture, Clock, EmbeddingProvider, Error, Result, SearchGateway};
use permit_storage::search::{SearchDocument, SearchRequest, SearchResponse};

/// Returns canned documents, or a canned failure, and records every request.
pub struct StubSearch {
	outcome: std::result::Result<Vec<SearchDocument>, String>,
	requests: Mutex<Vec<SearchRequest>>,
}
impl StubSearch {
	pub fn returning(documents: Vec<SearchDocument>) -> Self {
		Self { outcome: Ok(documents), requests: Mutex::new(Vec::new()) }
	}

	pub fn failing(message: impl Into<String>) -> Self {
		Self { outcome: Err(message.into()), requests: Mutex::new(Vec::new()) }
	}

	/// A hit with only a title and content.
	pub fn document(title: Option<&str>, content: &str) -> SearchDocument {
		SearchDocument {
			title: title.map(str::to_string),
			content: Some(content.to_string()),
			..Default::default()
		}
	}

	pub fn requests(&self) -> Vec<SearchRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl SearchGateway for StubSearch {
	fn search<'a>(&'a self, request: &'a SearchRequest) -> BoxFuture<'a, Result<SearchResponse>> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(request.clone());

		let result = match &self.outcome {
			Ok(documents) => Ok(SearchResponse { value: documents.clone() }),
			Err(message) => Err(Error::Search { message: message.clone() }),
		};

		Box::pin(async move { result })
	}
}

/// Produces a constant vector per input, or fails when built with `failing`.
pub struct StubEmbedding {
	vector: Option<Vec<f32>>,
}
impl StubEmbedding {
	pub fn constant(vector: Vec<f32>) -> Self {
		Self { vector: Some(vector) }
	}

	pub fn failing() -> Self {
		Self { vector: None }
	}
}
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let result = match &self.vector {
			Some(vector) => Ok(vec![vector.clone(); texts.len()]),
			None => Err(Error::Provider { message: "Embedding stub failure.".to_string() }),
		};

		Box::pin(async move { result })
	}
}

pub struct FixedClock {
	now: OffsetDateTime,
}
impl FixedClock {
	/// Midnight UTC on the given date.
	pub fn on(date: Date) -> Self {
		Self { now: date.midnight().assume_utc() }
	}
}
impl Clock for FixedClock {
	fn now(&self) -> OffsetDateTime {
		self.now
	}
}
