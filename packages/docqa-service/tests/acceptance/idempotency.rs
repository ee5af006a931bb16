use docqa_domain::index::AccessTier;

use super::{BOARD_QUESTION, harness, request, seed_corpus, test_config};

#[tokio::test]
async fn repeated_requests_return_identical_rankings() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let first = h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");
	let second = h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");

	assert_eq!(first.documents, second.documents);
	assert_eq!(first.chunks, second.chunks);
}
