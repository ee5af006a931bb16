use serde_json::json;

use docqa_domain::index::{AccessTier, IndexKind};
use docqa_service::{Error, RetrieveRequest};

use super::{
	BOARD_QUESTION, document, document_ids, harness, payload, request, seed_corpus, test_config,
};

fn private(question: &str) -> RetrieveRequest {
	RetrieveRequest { is_private: true, ..request(question) }
}

#[tokio::test]
async fn missing_elevated_indexes_map_to_elevated_unavailable() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);
	h.index.drop_tier(AccessTier::Elevated);

	let err = h.service.retrieve(private(BOARD_QUESTION)).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::AccessTierUnavailable { tier: AccessTier::Elevated }));
	assert!(err.remediation().is_some_and(|text| text.contains("Private document search")));
}

#[tokio::test]
async fn missing_standard_indexes_map_to_standard_unavailable() {
	let h = harness(test_config());

	h.index.drop_tier(AccessTier::Standard);

	let standard = h.service.retrieve(request(BOARD_QUESTION)).await.expect_err("Expected failure.");

	h.index.drop_tier(AccessTier::Elevated);

	let elevated =
		h.service.retrieve(private(BOARD_QUESTION)).await.expect_err("Expected failure.");

	assert!(matches!(standard, Error::AccessTierUnavailable { tier: AccessTier::Standard }));
	assert!(matches!(elevated, Error::AccessTierUnavailable { tier: AccessTier::Elevated }));
	assert_ne!(standard.remediation(), elevated.remediation());
	assert_ne!(standard.to_string(), elevated.to_string());
}

#[tokio::test]
async fn one_missing_index_fails_the_request() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);
	h.index.fail(AccessTier::Standard, IndexKind::Chunks, "collection NOT FOUND");

	let err = h.service.retrieve(request(BOARD_QUESTION)).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::AccessTierUnavailable { tier: AccessTier::Standard }));
}

#[tokio::test]
async fn other_index_failures_are_upstream_errors() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);
	h.index.fail(AccessTier::Standard, IndexKind::Questions, "deadline exceeded");

	let err = h.service.retrieve(request(BOARD_QUESTION)).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Upstream { .. }));
	assert!(err.remediation().is_none());
}

#[tokio::test]
async fn elevated_requests_only_touch_elevated_indexes() {
	let h = harness(test_config());
	let p = document("p", "Board salaries", "2024", super::PDF);

	seed_corpus(&h.index, AccessTier::Standard);
	h.index.insert(
		AccessTier::Elevated,
		IndexKind::Summaries,
		0.6,
		payload(&p, json!({ "text": "Compensation decided by the board." })),
	);
	h.index.insert(
		AccessTier::Elevated,
		IndexKind::Chunks,
		0.7,
		payload(&p, json!({ "text": "Salaries for 2024.", "chunk_index": 0 })),
	);

	let response = h.service.retrieve(private(BOARD_QUESTION)).await.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["p"]);
	assert!(h.index.queries().iter().all(|query| query.tier == AccessTier::Elevated));
}
