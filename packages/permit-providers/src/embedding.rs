use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds `texts` in one request, returning vectors in input order.
pub async fn embed(
	cfg: &permit_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path);
	let body = serde_json::json!({
		"input": texts,
		"model": cfg.model,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		let message = res.text().await.unwrap_or_default();

		return Err(Error::Upstream { status: status.as_u16(), message });
	}

	let response: EmbeddingResponse = res.json().await?;
	let vectors = order_vectors(response, cfg.dimensions)?;

	if vectors.len() != texts.len() {
		return Err(Error::CountMismatch { expected: texts.len(), actual: vectors.len() });
	}

	tracing::debug!(inputs = texts.len(), dimensions = cfg.dimensions, "Embedded query text.");

	Ok(vectors)
}

fn order_vectors(response: EmbeddingResponse, dimensions: u32) -> Result<Vec<Vec<f32>>> {
	let mut items = response
		.data
		.into_iter()
		.enumerate()
		.map(|(position, item)| (item.index.unwrap_or(position), item.embedding))
		.collect::<Vec<_>>();

	if let Some((_, vector)) = items.iter().find(|(_, vector)| vector.len() != dimensions as usize)
	{
		return Err(Error::DimensionMismatch { expected: dimensions, actual: vector.len() });
	}

	items.sort_by_key(|(index, _)| *index);

	Ok(items.into_iter().map(|(_, vector)| vector).collect())
}
