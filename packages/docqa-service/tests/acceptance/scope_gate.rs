use docqa_domain::index::AccessTier;

use super::{harness, request, seed_corpus, test_config};

#[tokio::test]
async fn unrelated_questions_skip_retrieval() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(request("What is the weather in Helsinki?"))
		.await
		.expect("Retrieval failed.");

	assert!(!response.is_related);
	assert!(response.documents.is_empty());
	assert!(response.chunks.is_empty());
	assert_eq!(response.question, "What is the weather in Helsinki?");
	assert_eq!(h.embedding.calls(), 0);
	assert!(h.index.queries().is_empty());
}

#[tokio::test]
async fn multi_word_keywords_admit_questions() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(request("Which Deep  Tech companies applied?"))
		.await
		.expect("Retrieval failed.");

	assert!(response.is_related);
	assert_eq!(h.embedding.calls(), 1);
}

#[tokio::test]
async fn disabled_gate_admits_everything() {
	let mut cfg = test_config();

	cfg.scope.enabled = false;

	let h = harness(cfg);

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(request("What is the weather in Helsinki?"))
		.await
		.expect("Retrieval failed.");

	assert!(response.is_related);
	assert!(!response.documents.is_empty());
}
