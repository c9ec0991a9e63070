#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error(transparent)]
	TimeFormat(#[from] time::error::Format),
	#[error("Invalid config: {0}")]
	InvalidConfig(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	#[error("{service} returned HTTP {status}: {message}")]
	Upstream { service: &'static str, status: u16, message: String },
}
