//! Client session toolkit for tender-intelligence dashboards—bearer-credential dispatch,
//! expiry-aware warning timers, single-shot refresh, and cancellable scrape pipelines in one
//! crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod error;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod tender;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	use crate::{auth::CredentialPair, store::MemoryStore};
	#[cfg(feature = "reqwest")]
	use crate::{http::Dispatcher, store::CredentialStore};

	/// Builds an unsigned compact JWT whose `exp` claim sits `expires_in` from now.
	///
	/// Pass a negative duration to mint an already-expired token. The signature segment is
	/// garbage—session logic never verifies it, mirroring the live dashboard client.
	pub fn test_access_token(expires_in: Duration) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
		let exp = (OffsetDateTime::now_utc() + expires_in).unix_timestamp();
		let payload =
			URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"tester","exp":{exp}}}"#).as_bytes());

		format!("{header}.{payload}.sig")
	}

	/// Builds an in-memory store pre-seeded with an access token expiring `expires_in` from
	/// now and the provided refresh token.
	pub fn seeded_store(expires_in: Duration, refresh: &str) -> Arc<MemoryStore> {
		let store = Arc::new(MemoryStore::default());

		store.replace_now(CredentialPair::new(test_access_token(expires_in), refresh));

		store
	}

	/// Builds a [`Dispatcher`] that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_dispatcher(origin: &str, store: Arc<dyn CredentialStore>) -> Dispatcher {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");
		let origin = Url::parse(origin).expect("Test API origin should parse successfully.");

		Dispatcher::with_client(client, origin, store)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use tender_session as _;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
