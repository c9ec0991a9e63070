pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Search error: {message}")]
	Search { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<permit_storage::Error> for Error {
	fn from(err: permit_storage::Error) -> Self {
		match err {
			permit_storage::Error::InvalidConfig(message) => Self::InvalidRequest { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}

impl From<permit_providers::Error> for Error {
	fn from(err: permit_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Storage { message: format!("Malformed permit row: {err}") }
	}
}
