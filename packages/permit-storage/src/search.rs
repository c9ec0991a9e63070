use std::time::Duration;

use reqwest::{
	Client,
	header::{HeaderMap, HeaderValue},
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

pub const API_KEY_HEADER: &str = "api-key";
pub const DEFAULT_VECTOR_FIELD: &str = "contentVector";
pub const DEFAULT_HYBRID_VECTOR_FIELDS: [&str; 2] = ["contentVector", "titleVector"];

#[derive(Clone, Debug, PartialEq)]
pub enum SearchMode {
	/// Semantic ranking, plus server-side text vectorization when vector fields are set.
	Semantic,
	/// Pure vector similarity with a caller-supplied embedding.
	Vector { vector: Vec<f32> },
	/// Semantic ranking combined with an optional caller-supplied embedding.
	Hybrid { vector: Option<Vec<f32>> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
	pub text: String,
	pub mode: SearchMode,
	pub top_k: u32,
	pub select_fields: Vec<String>,
	pub vector_fields: Vec<String>,
	pub filter: Option<String>,
}
impl SearchRequest {
	pub fn semantic(text: impl Into<String>, top_k: u32) -> Self {
		Self {
			text: text.into(),
			mode: SearchMode::Semantic,
			top_k,
			select_fields: vec!["title".to_string(), "content".to_string()],
			vector_fields: Vec::new(),
			filter: None,
		}
	}

	pub fn with_mode(mut self, mode: SearchMode) -> Self {
		self.mode = mode;

		self
	}

	pub fn with_vector_fields(mut self, fields: &[String]) -> Self {
		self.vector_fields = fields.to_vec();

		self
	}

	pub fn with_filter(mut self, filter: Option<String>) -> Self {
		self.filter = filter.filter(|value| !value.trim().is_empty());

		self
	}

	fn vector_fields_or(&self, fallback: &[&str]) -> String {
		if self.vector_fields.is_empty() {
			fallback.join(",")
		} else {
			self.vector_fields.join(",")
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchResponse {
	#[serde(default)]
	pub value: Vec<SearchDocument>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchDocument {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub content: Option<String>,
	#[serde(rename = "@search.score", default)]
	pub score: Option<f64>,
	#[serde(rename = "@search.rerankerScore", default)]
	pub reranker_score: Option<f64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Client for one Azure AI Search index.
pub struct SearchIndex {
	client: Client,
	search_url: String,
	api_key: String,
	semantic_configuration: String,
}
impl SearchIndex {
	pub fn new(cfg: &permit_config::Search) -> Result<Self> {
		if cfg.api_key.trim().is_empty() {
			return Err(Error::InvalidConfig("Search API key must be non-empty.".to_string()));
		}

		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let search_url = format!(
			"{}/indexes/{}/docs/search?api-version={}",
			cfg.endpoint.trim_end_matches('/'),
			cfg.index_name,
			cfg.api_version
		);

		Ok(Self {
			client,
			search_url,
			api_key: cfg.api_key.clone(),
			semantic_configuration: cfg.semantic_configuration.clone(),
		})
	}

	pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
		let payload = build_payload(request, &self.semantic_configuration);
		let res = self
			.client
			.post(&self.search_url)
			.headers(self.headers()?)
			.json(&payload)
			.send()
			.await?;
		let status = res.status();

		if !status.is_success() {
			let message = res.text().await.unwrap_or_default();

			return Err(Error::Upstream { service: "Azure AI Search", status: status.as_u16(), message });
		}

		let json: Value = res.json().await?;

		parse_search_response(json)
	}

	fn headers(&self) -> Result<HeaderMap> {
		let mut headers = HeaderMap::new();
		let mut api_key = HeaderValue::from_str(&self.api_key)?;

		api_key.set_sensitive(true);
		headers.insert(API_KEY_HEADER, api_key);

		Ok(headers)
	}
}

pub fn build_payload(request: &SearchRequest, semantic_configuration: &str) -> Value {
	let mut payload = Map::new();

	match &request.mode {
		SearchMode::Semantic => {
			insert_semantic(&mut payload, request, semantic_configuration);

			if !request.vector_fields.is_empty() {
				payload.insert(
					"vectorQueries".to_string(),
					serde_json::json!([{
						"kind": "text",
						"text": request.text,
						"fields": request.vector_fields.join(","),
					}]),
				);
			}
		},
		SearchMode::Vector { vector } => {
			payload.insert(
				"vectorQueries".to_string(),
				serde_json::json!([{
					"kind": "vector",
					"vector": vector,
					"fields": request.vector_fields_or(&[DEFAULT_VECTOR_FIELD]),
					"k": request.top_k,
				}]),
			);
		},
		SearchMode::Hybrid { vector } => {
			insert_semantic(&mut payload, request, semantic_configuration);

			if let Some(vector) = vector {
				payload.insert(
					"vectorQueries".to_string(),
					serde_json::json!([{
						"kind": "vector",
						"vector": vector,
						"fields": request.vector_fields_or(&DEFAULT_HYBRID_VECTOR_FIELDS),
						"k": request.top_k,
					}]),
				);
			}
		},
	}

	if !request.select_fields.is_empty() {
		payload.insert("select".to_string(), Value::String(request.select_fields.join(",")));
	}
	if let Some(filter) = request.filter.as_ref() {
		payload.insert("filter".to_string(), Value::String(filter.clone()));
	}

	Value::Object(payload)
}

pub fn parse_search_response(json: Value) -> Result<SearchResponse> {
	if !json.is_object() {
		return Err(Error::InvalidResponse("Search response must be a JSON object.".to_string()));
	}

	Ok(serde_json::from_value(json)?)
}

fn insert_semantic(payload: &mut Map<String, Value>, request: &SearchRequest, configuration: &str) {
	payload.insert("search".to_string(), Value::String(request.text.clone()));
	payload.insert("queryType".to_string(), Value::String("semantic".to_string()));
	payload.insert("semanticConfiguration".to_string(), Value::String(configuration.to_string()));
	payload.insert("top".to_string(), Value::from(request.top_k));
}
