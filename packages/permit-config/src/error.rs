use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read permit config at {path:?}.")]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse permit config at {path:?}.")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("{field} must be non-empty. Set it in the config file or export {env}.")]
	MissingSecret { field: &'static str, env: &'static str },
	#[error("{message}")]
	Validation { message: String },
}
