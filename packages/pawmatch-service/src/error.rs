pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Timed out: {message}")]
	Timeout { message: String },
	#[error("Connection failure: {message}")]
	ConnectionFailure { message: String },
	#[error("Malformed model output: {message}")]
	MalformedOutput { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	/// Transient failures worth another attempt under a retry policy.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			Self::Timeout { .. }
				| Self::ConnectionFailure { .. }
				| Self::MalformedOutput { .. }
				| Self::Provider { .. }
		)
	}
}

impl From<pawmatch_providers::Error> for Error {
	fn from(err: pawmatch_providers::Error) -> Self {
		match err {
			pawmatch_providers::Error::Timeout =>
				Self::Timeout { message: "Provider request timed out.".to_string() },
			pawmatch_providers::Error::ConnectionFailure { message } =>
				Self::ConnectionFailure { message },
			other => Self::Provider { message: other.to_string() },
		}
	}
}

impl From<pawmatch_storage::Error> for Error {
	fn from(err: pawmatch_storage::Error) -> Self {
		match err {
			pawmatch_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			pawmatch_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}

impl From<pawmatch_domain::MalformedOutput> for Error {
	fn from(err: pawmatch_domain::MalformedOutput) -> Self {
		Self::MalformedOutput { message: err.to_string() }
	}
}

impl From<pawmatch_domain::ScoreShapeError> for Error {
	fn from(err: pawmatch_domain::ScoreShapeError) -> Self {
		Self::MalformedOutput { message: err.to_string() }
	}
}
