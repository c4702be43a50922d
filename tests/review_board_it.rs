#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use tender_session::{
	_preludet::*,
	store::CredentialStore,
	tender::{ClassifiedTender, Decision, ReviewBoard, SaveStatus, Tender},
};

fn raw_tender(title: &str) -> Tender {
	serde_json::from_value(json!({
		"Title": title,
		"Tender Number": format!("TD-{title}"),
		"Agency": "MOE",
		"Ref_Num": "N/A",
		"Awarded": "OPEN",
		"Awardee": ["Acme", "Globex"],
		"Num of Respondents": 2,
	}))
	.expect("Raw tender fixture should deserialize.")
}

fn classified(title: &str, prediction: bool) -> ClassifiedTender {
	ClassifiedTender { title: title.into(), ai_prediction: prediction, ai_confidence: 0.75 }
}

fn seeded_board() -> ReviewBoard {
	let mut board = ReviewBoard::default();

	board.ingest(
		vec![raw_tender("T1"), raw_tender("T2"), raw_tender("T3")],
		vec![classified("T1", true), classified("T2", false), classified("T3", true)],
		vec!["cloud".into()],
	);

	board
}

#[tokio::test]
async fn save_all_submits_keep_rows_only() {
	let server = MockServer::start_async().await;
	let store = seeded_store(Duration::hours(1), "R1");
	let gateway = test_dispatcher(&server.base_url(), store as Arc<dyn CredentialStore>);
	let mut board = seeded_board();

	board.set_decision("T1", Decision::Keep);
	board.set_decision("T2", Decision::Remove);
	// T3 stays undecided and must be excluded too.

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/save-decisions").json_body(json!({
				"decisions": [{
					"title": "T1",
					"tender_number": "TD-T1",
					"agency": "MOE",
					"ref_number": "N/A",
					"awarded": "OPEN",
					"awardee": "Acme, Globex",
					"respondents": null,
					"num_of_respondents": 2,
					"keywords": ["cloud"],
					"ai_prediction": true,
					"ai_confidence": 0.75,
					"user_decision": true,
				}],
			}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"message": "1 decision saved.",
			}));
		})
		.await;
	let saved = board.save_all(&gateway).await.expect("Save-all should succeed.");

	mock.assert_async().await;

	assert_eq!(saved, 1);
	assert_eq!(board.save_status("T1"), SaveStatus::Saved);
	assert_eq!(board.save_status("T2"), SaveStatus::Idle);
	assert_eq!(board.save_status("T3"), SaveStatus::Idle);
}

#[tokio::test]
async fn save_one_reports_non_keep_rows_as_removed_without_a_network_call() {
	let server = MockServer::start_async().await;
	let store = seeded_store(Duration::hours(1), "R1");
	let gateway = test_dispatcher(&server.base_url(), store as Arc<dyn CredentialStore>);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/save-decisions");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let mut board = seeded_board();

	board.set_decision("T2", Decision::Remove);

	let status =
		board.save_one(&gateway, "T2").await.expect("Removed rows should short-circuit.");

	assert_eq!(status, SaveStatus::Removed);
	assert_eq!(board.save_status("T2"), SaveStatus::Removed);
	assert_eq!(mock.hits_async().await, 0);

	board.set_decision("T1", Decision::Keep);

	let status = board.save_one(&gateway, "T1").await.expect("Keep rows should persist.");

	assert_eq!(status, SaveStatus::Saved);
	assert_eq!(mock.hits_async().await, 1);
}
