//! Storage contracts and built-in backings for session credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::{CredentialPair, TokenSecret}};

/// Boxed future returned by [`CredentialStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the session's credential pair.
///
/// At most one pair is held per store; [`set`](CredentialStore::set) atomically replaces both
/// tokens, and reads always observe the latest write. Token well-formedness is not validated
/// here—that is the session timer's job.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Stores a pair, overwriting any prior one.
	fn set(&self, pair: CredentialPair) -> StoreFuture<'_, ()>;

	/// Fetches the current access token, if present.
	fn access(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Fetches the current refresh token, if present.
	fn refresh(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Removes both tokens.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Store(_)));
		assert!(error.to_string().contains("disk unreachable"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
