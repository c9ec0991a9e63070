mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Cosmos, EmbeddingProviderConfig, Permits, Providers, Search, Security, Service,
	Storage,
};

use std::{env, fs, net::SocketAddr, path::Path};

pub const ENV_SEARCH_API_KEY: &str = "AZURE_AI_SEARCH_API_KEY";
pub const ENV_COSMOS_TOKEN: &str = "COSMOS_DB_TOKEN";
pub const ENV_EMBEDDING_API_KEY: &str = "AZURE_OPENAI_API_KEY";

const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg, |name| env::var(name).ok());

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.mcp_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.mcp_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.mcp_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.mcp_bind must be a valid socket address.".to_string(),
		});
	}

	for (label, value) in [
		("storage.search.endpoint", &cfg.storage.search.endpoint),
		("storage.search.index_name", &cfg.storage.search.index_name),
		("storage.search.api_version", &cfg.storage.search.api_version),
		("storage.cosmos.endpoint", &cfg.storage.cosmos.endpoint),
		("storage.cosmos.database", &cfg.storage.cosmos.database),
		("storage.cosmos.container", &cfg.storage.cosmos.container),
		("storage.cosmos.api_version", &cfg.storage.cosmos.api_version),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (field, env, secret) in [
		("storage.search.api_key", ENV_SEARCH_API_KEY, &cfg.storage.search.api_key),
		("storage.cosmos.auth_token", ENV_COSMOS_TOKEN, &cfg.storage.cosmos.auth_token),
	] {
		if secret.trim().is_empty() {
			return Err(Error::MissingSecret { field, env });
		}
	}

	for (label, endpoint) in [
		("storage.search.endpoint", &cfg.storage.search.endpoint),
		("storage.cosmos.endpoint", &cfg.storage.cosmos.endpoint),
	] {
		if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
			return Err(Error::Validation {
				message: format!("{label} must start with http:// or https://."),
			});
		}
	}

	if cfg.storage.search.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.search.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !matches!(cfg.storage.cosmos.token_type.as_str(), "aad" | "resource") {
		return Err(Error::Validation {
			message: "storage.cosmos.token_type must be one of aad or resource.".to_string(),
		});
	}

	if let Some(embedding) = cfg.providers.embedding.as_ref() {
		if embedding.api_key.trim().is_empty() {
			return Err(Error::MissingSecret {
				field: "providers.embedding.api_key",
				env: ENV_EMBEDDING_API_KEY,
			});
		}
		if embedding.dimensions == 0 {
			return Err(Error::Validation {
				message: "providers.embedding.dimensions must be greater than zero.".to_string(),
			});
		}
		if embedding.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	if cfg.permits.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
		return Err(Error::Validation {
			message: "permits.utc_offset_minutes must be within -1080 and 1080.".to_string(),
		});
	}
	if cfg.permits.content_top_k == 0 {
		return Err(Error::Validation {
			message: "permits.content_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.permits.status_threshold_days < 0 {
		return Err(Error::Validation {
			message: "permits.status_threshold_days must be zero or greater.".to_string(),
		});
	}
	if cfg.permits.content_vector_fields.iter().any(|field| field.trim().is_empty()) {
		return Err(Error::Validation {
			message: "permits.content_vector_fields must not contain empty names.".to_string(),
		});
	}

	match cfg.security.auth_mode.as_str() {
		"off" => {},
		"static_token" =>
			if cfg.security.auth_token.is_none() {
				return Err(Error::Validation {
					message: "security.auth_token is required when security.auth_mode=static_token."
						.to_string(),
				});
			},
		_ => {
			return Err(Error::Validation {
				message: "security.auth_mode must be one of off or static_token.".to_string(),
			});
		},
	}

	Ok(())
}

/// Fills empty secrets from the environment and trims optional values.
pub fn normalize<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	fill_from_env(&mut cfg.storage.search.api_key, ENV_SEARCH_API_KEY, &lookup);
	fill_from_env(&mut cfg.storage.cosmos.auth_token, ENV_COSMOS_TOKEN, &lookup);

	if let Some(embedding) = cfg.providers.embedding.as_mut() {
		fill_from_env(&mut embedding.api_key, ENV_EMBEDDING_API_KEY, &lookup);
	}

	cfg.storage.search.endpoint = trim_endpoint(&cfg.storage.search.endpoint);
	cfg.storage.cosmos.endpoint = trim_endpoint(&cfg.storage.cosmos.endpoint);

	if cfg.security.auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false) {
		cfg.security.auth_token = None;
	}
}

fn fill_from_env<F>(slot: &mut String, name: &str, lookup: &F)
where
	F: Fn(&str) -> Option<String>,
{
	if !slot.trim().is_empty() {
		return;
	}
	if let Some(value) = lookup(name) {
		*slot = value.trim().to_string();
	}
}

fn trim_endpoint(raw: &str) -> String {
	raw.trim().trim_end_matches('/').to_string()
}
