use crate::Error;

/// Result of a permit query operation.
///
/// Every variant carries a value the caller can render. `InvalidInput` and `Failed` hold the
/// empty fallback, so "nothing matched" and "the store was unreachable" produce the same text
/// while remaining distinguishable to code and tests.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutcome<T> {
	Complete(T),
	/// The request was rejected before any upstream call.
	InvalidInput { fallback: T, message: String },
	/// An upstream call or row decoding failed.
	Failed { fallback: T, message: String },
}
impl<T> QueryOutcome<T> {
	pub(crate) fn invalid(operation: &'static str, fallback: T, message: impl Into<String>) -> Self {
		let message = message.into();

		tracing::warn!(operation, %message, "Rejected permit query input.");

		Self::InvalidInput { fallback, message }
	}

	pub(crate) fn failed(operation: &'static str, fallback: T, err: Error) -> Self {
		tracing::warn!(operation, error = %err, "Permit query failed.");

		Self::Failed { fallback, message: err.to_string() }
	}

	pub fn value(&self) -> &T {
		match self {
			Self::Complete(value)
			| Self::InvalidInput { fallback: value, .. }
			| Self::Failed { fallback: value, .. } => value,
		}
	}

	pub fn into_value(self) -> T {
		match self {
			Self::Complete(value)
			| Self::InvalidInput { fallback: value, .. }
			| Self::Failed { fallback: value, .. } => value,
		}
	}

	pub fn is_complete(&self) -> bool {
		matches!(self, Self::Complete(_))
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, Self::Failed { .. })
	}

	pub fn message(&self) -> Option<&str> {
		match self {
			Self::Complete(_) => None,
			Self::InvalidInput { message, .. } | Self::Failed { message, .. } => Some(message),
		}
	}
}
