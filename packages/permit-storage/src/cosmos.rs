use reqwest::{
	Client,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::Value;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, Result, query::QuerySpec};

pub const CONTINUATION_HEADER: &str = "x-ms-continuation";
pub const QUERY_CONTENT_TYPE: &str = "application/query+json";

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
	"[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Read-only query client for the permit container, speaking the Cosmos DB REST API.
pub struct CosmosStore {
	client: Client,
	docs_url: String,
	api_version: String,
	authorization: String,
}
impl CosmosStore {
	pub fn new(cfg: &permit_config::Cosmos) -> Result<Self> {
		if cfg.auth_token.trim().is_empty() {
			return Err(Error::InvalidConfig("Cosmos auth token must be non-empty.".to_string()));
		}

		let docs_url = format!(
			"{}/dbs/{}/colls/{}/docs",
			cfg.endpoint.trim_end_matches('/'),
			cfg.database,
			cfg.container
		);

		Ok(Self {
			client: Client::new(),
			docs_url,
			api_version: cfg.api_version.clone(),
			authorization: authorization_header(&cfg.token_type, &cfg.auth_token),
		})
	}

	/// Runs the query across all partitions and follows continuation tokens until exhausted.
	pub async fn query(&self, spec: &QuerySpec) -> Result<Vec<Value>> {
		let body = serde_json::to_vec(&query_body(spec))?;
		let mut rows = Vec::new();
		let mut continuation: Option<String> = None;
		let mut pages = 0_usize;

		loop {
			let mut request = self
				.client
				.post(&self.docs_url)
				.headers(self.headers(OffsetDateTime::now_utc())?)
				.body(body.clone());

			if let Some(token) = continuation.as_deref() {
				request = request.header(CONTINUATION_HEADER, HeaderValue::from_str(token)?);
			}

			let res = request.send().await?;
			let status = res.status();

			if !status.is_success() {
				let message = res.text().await.unwrap_or_default();

				return Err(Error::Upstream { service: "Cosmos DB", status: status.as_u16(), message });
			}

			continuation = res
				.headers()
				.get(CONTINUATION_HEADER)
				.and_then(|value| value.to_str().ok())
				.filter(|value| !value.is_empty())
				.map(str::to_string);

			let json: Value = res.json().await?;

			rows.extend(parse_query_page(json)?);
			pages += 1;

			if continuation.is_none() {
				break;
			}
		}

		tracing::debug!(rows = rows.len(), pages, "Cosmos query completed.");

		Ok(rows)
	}

	fn headers(&self, now: OffsetDateTime) -> Result<HeaderMap> {
		let mut headers = HeaderMap::new();
		let mut authorization = HeaderValue::from_str(&self.authorization)?;

		authorization.set_sensitive(true);

		headers.insert(AUTHORIZATION, authorization);
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(QUERY_CONTENT_TYPE));
		headers.insert("x-ms-date", HeaderValue::from_str(&format_ms_date(now)?)?);
		headers.insert("x-ms-version", HeaderValue::from_str(&self.api_version)?);
		headers.insert("x-ms-documentdb-isquery", HeaderValue::from_static("True"));
		headers.insert(
			"x-ms-documentdb-query-enablecrosspartition",
			HeaderValue::from_static("True"),
		);

		Ok(headers)
	}
}

/// `{query, parameters: [{name, value}]}` as the query endpoint expects it.
pub fn query_body(spec: &QuerySpec) -> Value {
	serde_json::json!({
		"query": spec.render(),
		"parameters": spec.parameters,
	})
}

/// Extracts the `Documents` array of one result page.
pub fn parse_query_page(json: Value) -> Result<Vec<Value>> {
	match json {
		Value::Object(mut map) => match map.remove("Documents") {
			Some(Value::Array(documents)) => Ok(documents),
			Some(_) => Err(Error::InvalidResponse("Documents must be an array.".to_string())),
			None => Err(Error::InvalidResponse("Query page is missing Documents.".to_string())),
		},
		_ => Err(Error::InvalidResponse("Query page must be a JSON object.".to_string())),
	}
}

/// Token authorization in the `type=<kind>&ver=1.0&sig=<token>` form, URL-encoded.
pub fn authorization_header(token_type: &str, token: &str) -> String {
	urlencoding::encode(&format!("type={token_type}&ver=1.0&sig={}", token.trim())).into_owned()
}

/// RFC 1123 date in GMT, e.g. `Tue, 01 Nov 1994 08:12:31 GMT`.
pub fn format_ms_date(now: OffsetDateTime) -> Result<String> {
	Ok(now.to_offset(time::UtcOffset::UTC).format(DATE_FORMAT)?)
}
