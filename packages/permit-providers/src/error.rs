pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("Embedding endpoint returned HTTP {status}: {message}")]
	Upstream { status: u16, message: String },
	#[error("Embedding has {actual} dimensions, expected {expected}.")]
	DimensionMismatch { expected: u32, actual: usize },
	#[error("Embedding response has {actual} vectors for {expected} inputs.")]
	CountMismatch { expected: usize, actual: usize },
}
