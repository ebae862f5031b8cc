pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider request timed out.")]
	Timeout,
	#[error("Failed to connect to provider: {message}")]
	ConnectionFailure { message: String },
	#[error("Provider returned status {status}: {message}")]
	Status { status: u16, message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error(transparent)]
	Reqwest(reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			return Self::Timeout;
		}
		if err.is_connect() {
			return Self::ConnectionFailure { message: err.to_string() };
		}
		if let Some(status) = err.status() {
			return Self::Status { status: status.as_u16(), message: err.to_string() };
		}

		Self::Reqwest(err)
	}
}
