//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	store::{CredentialStore, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<CredentialPair>>>;

/// Thread-safe backend that keeps the credential pair in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	/// Synchronously replaces the stored pair; test fixtures use this to seed state.
	pub fn replace_now(&self, pair: CredentialPair) {
		*self.0.write() = Some(pair);
	}

	/// Synchronously snapshots the stored pair.
	pub fn snapshot(&self) -> Option<CredentialPair> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn set(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(pair);

			Ok(())
		})
	}

	fn access(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().as_ref().map(|pair| pair.access.clone())) })
	}

	fn refresh(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().as_ref().map(|pair| pair.refresh.clone())) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = None;

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn set_then_read_returns_latest_pair() {
		let store = MemoryStore::default();

		store
			.set(CredentialPair::new("A1", "R1"))
			.await
			.expect("Storing the first pair should succeed.");

		assert_eq!(
			store.access().await.expect("Access read should succeed.").map(|t| t.expose().into()),
			Some("A1".to_string()),
		);

		store
			.set(CredentialPair::new("A2", "R2"))
			.await
			.expect("Replacing the pair should succeed.");

		let access = store.access().await.expect("Access read should succeed.");
		let refresh = store.refresh().await.expect("Refresh read should succeed.");

		assert_eq!(access.map(|t| t.expose().to_owned()), Some("A2".into()));
		assert_eq!(refresh.map(|t| t.expose().to_owned()), Some("R2".into()));
	}

	#[tokio::test]
	async fn clear_removes_both_tokens() {
		let store = MemoryStore::default();

		store
			.set(CredentialPair::new("A1", "R1"))
			.await
			.expect("Storing the pair should succeed.");
		store.clear().await.expect("Clearing the store should succeed.");

		assert!(store.access().await.expect("Access read should succeed.").is_none());
		assert!(store.refresh().await.expect("Refresh read should succeed.").is_none());
	}
}
