use serde::Serialize;

use crate::{PermitService, QueryOutcome};
use permit_storage::search::{SearchMode, SearchRequest};

pub const SELECT_FIELDS: [&str; 2] = ["title", "content"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContentPassage {
	pub title: Option<String>,
	pub content: String,
}

impl PermitService {
	/// Semantic search over permit document content. Uses hybrid search when an embedding provider
	/// is configured; an embedding failure degrades to plain semantic search.
	pub async fn content(&self, keyword: &str) -> QueryOutcome<Vec<ContentPassage>> {
		let keyword = keyword.trim();

		if keyword.is_empty() {
			return QueryOutcome::invalid("content", Vec::new(), "Keyword is empty.");
		}

		let mut request = SearchRequest::semantic(keyword, self.cfg.permits.content_top_k)
			.with_vector_fields(&self.cfg.permits.content_vector_fields);

		request.select_fields = SELECT_FIELDS.iter().map(|field| field.to_string()).collect();

		if let Some(vector) = self.embed_keyword(keyword).await {
			request = request.with_mode(SearchMode::Hybrid { vector: Some(vector) });
		}

		match self.gateways.search.search(&request).await {
			Ok(response) => {
				let passages = response
					.value
					.into_iter()
					.map(|document| ContentPassage {
						title: document.title,
						content: document.content.unwrap_or_default(),
					})
					.collect::<Vec<_>>();

				tracing::info!(keyword, count = passages.len(), "Searched permit content.");

				QueryOutcome::Complete(passages)
			},
			Err(err) => QueryOutcome::failed("content", Vec::new(), err),
		}
	}

	async fn embed_keyword(&self, keyword: &str) -> Option<Vec<f32>> {
		let provider = self.gateways.embedding.as_ref()?;
		let cfg = self.cfg.providers.embedding.as_ref()?;
		let texts = [keyword.to_string()];

		match provider.embed(cfg, &texts).await {
			Ok(mut vectors) if !vectors.is_empty() => Some(vectors.swap_remove(0)),
			Ok(_) => None,
			Err(err) => {
				tracing::warn!(error = %err, "Embedding failed. Falling back to semantic search.");

				None
			},
		}
	}
}
