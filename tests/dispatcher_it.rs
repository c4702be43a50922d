#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use tender_session::{
	_preludet::*,
	api::{LoginRequest, SaveDecisionsRequest, TenderGateway},
	auth::CredentialPair,
	error::{Error, SessionError},
	store::MemoryStore,
};

#[tokio::test]
async fn bearer_is_read_from_the_store_at_send_time() {
	let server = MockServer::start_async().await;
	let store = seeded_store(Duration::hours(1), "R1");
	let dispatcher = test_dispatcher(&server.base_url(), store.clone());
	let first_token = store.snapshot().expect("Seeded store should hold a pair.").access;
	let first = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/save-decisions")
				.header("authorization", format!("Bearer {}", first_token.expose()));
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;

	dispatcher
		.save_decisions(&SaveDecisionsRequest { decisions: vec![] })
		.await
		.expect("First save call should succeed.");
	first.assert_async().await;

	// Rotate the pair; the next request must carry the new token without re-wiring.
	store.replace_now(CredentialPair::new("rotated-access", "R2"));

	let second = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/save-decisions")
				.header("authorization", "Bearer rotated-access");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;

	dispatcher
		.save_decisions(&SaveDecisionsRequest { decisions: vec![] })
		.await
		.expect("Second save call should succeed.");
	second.assert_async().await;
}

#[tokio::test]
async fn absent_token_sends_an_unauthenticated_request() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());
	let dispatcher = test_dispatcher(&server.base_url(), store);
	let with_header = server
		.mock_async(|when, then| {
			when.method(POST).path("/login").header_exists("authorization");
			then.status(500);
		})
		.await;
	let bare = server
		.mock_async(|when, then| {
			when.method(POST).path("/login");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "A1",
				"refresh_token": "R1",
				"token_type": "bearer",
			}));
		})
		.await;
	let grant = dispatcher
		.login(&LoginRequest { username: "alice".into(), password: "pw".into() })
		.await
		.expect("Login without stored credentials should pass through bare.");

	assert_eq!(grant.access_token.expose(), "A1");
	assert_eq!(with_header.hits_async().await, 0);
	assert_eq!(bare.hits_async().await, 1);
}

#[tokio::test]
async fn unauthorized_maps_to_session_expired_without_touching_the_store() {
	let server = MockServer::start_async().await;
	let store = seeded_store(Duration::hours(1), "R1");
	let dispatcher = test_dispatcher(&server.base_url(), store.clone());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/save-decisions");
			then.status(401).body("Invalid authentication");
		})
		.await;

	let err = dispatcher
		.save_decisions(&SaveDecisionsRequest { decisions: vec![] })
		.await
		.expect_err("A 401 response should surface as an error.");

	assert!(matches!(err, Error::Session(SessionError::Expired)));
	assert!(
		store.snapshot().is_some(),
		"The dispatcher must never mutate the store; clearing is the caller's decision.",
	);
}
