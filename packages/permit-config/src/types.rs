use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub providers: Providers,
	#[serde(default)]
	pub permits: Permits,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub mcp_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub search: Search,
	pub cosmos: Cosmos,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	pub endpoint: String,
	#[serde(default)]
	pub api_key: String,
	pub index_name: String,
	#[serde(default = "default_search_api_version")]
	pub api_version: String,
	#[serde(default = "default_semantic_configuration")]
	pub semantic_configuration: String,
	#[serde(default = "default_search_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cosmos {
	pub endpoint: String,
	pub database: String,
	pub container: String,
	/// Either "aad" (Entra ID access token) or "resource" (resource token).
	#[serde(default = "default_cosmos_token_type")]
	pub token_type: String,
	#[serde(default)]
	pub auth_token: String,
	#[serde(default = "default_cosmos_api_version")]
	pub api_version: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Providers {
	pub embedding: Option<EmbeddingProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Permits {
	/// Offset applied to the system clock before taking "today".
	pub utc_offset_minutes: i32,
	pub expiring_soon_days: u32,
	/// Days remaining at or below which a permit is reported as expiring soon.
	pub status_threshold_days: i64,
	pub content_top_k: u32,
	pub content_vector_fields: Vec<String>,
}
impl Default for Permits {
	fn default() -> Self {
		Self {
			utc_offset_minutes: 0,
			expiring_soon_days: 30,
			status_threshold_days: 30,
			content_top_k: 10,
			content_vector_fields: Vec::new(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	#[serde(default = "default_auth_mode")]
	pub auth_mode: String,
	pub auth_token: Option<String>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_search_api_version() -> String {
	"2023-11-01".to_string()
}

fn default_semantic_configuration() -> String {
	"default".to_string()
}

fn default_search_timeout_ms() -> u64 {
	30_000
}

fn default_cosmos_token_type() -> String {
	"aad".to_string()
}

fn default_cosmos_api_version() -> String {
	"2018-12-31".to_string()
}

fn default_auth_mode() -> String {
	"off".to_string()
}
