//! Session-level error types shared across the dispatcher, timers, and pipeline.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential-storage failure.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Session-fatal failure; credentials are cleared and the user returns to login.
	#[error(transparent)]
	Session(#[from] SessionError),
	/// Temporary upstream failure; the user may resubmit.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The in-flight task was aborted by an explicit stop or a superseding start.
	#[error("Scraping cancelled by user.")]
	Cancelled,
}
impl Error {
	/// Returns `true` for failures that terminate the session (credentials cleared, user
	/// redirected to login).
	pub fn is_session_fatal(&self) -> bool {
		matches!(self, Self::Session(_))
	}

	/// Returns `true` when the failure is a user-initiated cancellation rather than an error.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

/// Session-fatal failures; every variant forces a logout.
#[derive(Debug, ThisError)]
pub enum SessionError {
	/// Access token was rejected by the server (HTTP 401) or expired at send time.
	#[error("Access token was rejected or has expired.")]
	Expired,
	/// Refresh exchange failed; a single failed attempt is terminal for the session.
	#[error("Refresh exchange was rejected: {reason}.")]
	RefreshRejected {
		/// Upstream- or transport-supplied reason string.
		reason: String,
	},
	/// Stored access token could not be decoded.
	#[error("Stored access token could not be decoded.")]
	MalformedToken(#[from] crate::auth::ClaimsError),
	/// No refresh token is available to extend the session.
	#[error("No refresh token is available to extend the session.")]
	MissingRefreshToken,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint path could not be joined onto the API origin.
	#[error("Endpoint `{path}` cannot be joined onto the API origin.")]
	InvalidEndpoint {
		/// Endpoint path that failed to join.
		path: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Temporary failure variants (the user resubmits; never retried automatically).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Endpoint returned an unexpected but non-fatal response.
	#[error("Endpoint returned an unexpected response: {message}.")]
	Endpoint {
		/// Server- or client-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Endpoint responded with malformed JSON that could not be parsed.
	#[error("Endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the dashboard API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the dashboard API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "storage unreachable".into() };
		let error: Error = store_error.into();

		assert!(matches!(error, Error::Store(_)));
		assert!(error.to_string().contains("storage unreachable"));
		assert!(StdError::source(&error).is_some());
	}

	#[test]
	fn session_variants_are_fatal() {
		let expired: Error = SessionError::Expired.into();
		let rejected: Error = SessionError::RefreshRejected { reason: "denied".into() }.into();

		assert!(expired.is_session_fatal());
		assert!(rejected.is_session_fatal());
		assert!(!Error::Cancelled.is_session_fatal());
	}

	#[test]
	fn cancellation_is_not_an_error_status() {
		assert!(Error::Cancelled.is_cancelled());
		assert_eq!(Error::Cancelled.to_string(), "Scraping cancelled by user.");
	}
}
