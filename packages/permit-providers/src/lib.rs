pub mod embedding;

mod error;

pub use error::{Error, Result};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

pub const API_KEY_HEADER: &str = "api-key";

/// Azure-style `api-key` authentication plus any configured static headers.
pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();
	let mut key = HeaderValue::from_str(api_key)?;

	key.set_sensitive(true);
	headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

	for (name, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(name.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
