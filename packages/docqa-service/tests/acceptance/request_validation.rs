use docqa_domain::index::{AccessTier, IndexKind};
use docqa_service::{Error, RetrieveRequest};

use super::{BOARD_QUESTION, harness, request, seed_corpus, test_config};

#[tokio::test]
async fn absent_or_blank_questions_are_rejected() {
	let h = harness(test_config());

	for question in [None, Some("".to_string()), Some("  \n\t ".to_string())] {
		let err = h
			.service
			.retrieve(RetrieveRequest { question, ..Default::default() })
			.await
			.expect_err("Expected failure.");

		assert!(matches!(err, Error::MissingQuestion));
	}

	assert_eq!(h.embedding.calls(), 0);
	assert!(h.index.queries().is_empty());
}

#[tokio::test]
async fn top_k_outside_bounds_is_invalid() {
	let h = harness(test_config());
	let max = h.service.cfg.retrieval.max_top_k;

	for top_k in [0, max + 1] {
		let err = h
			.service
			.retrieve(RetrieveRequest { top_k: Some(top_k), ..request(BOARD_QUESTION) })
			.await
			.expect_err("Expected failure.");

		assert!(matches!(err, Error::InvalidRequest { .. }));
	}
}

#[tokio::test]
async fn default_top_k_sizes_the_index_queries() {
	let h = harness(test_config());
	let default_top_k = h.service.cfg.retrieval.default_top_k;
	let multiplier = h.service.cfg.retrieval.chunk_query_multiplier;

	seed_corpus(&h.index, AccessTier::Standard);
	h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");

	let summaries = h.index.queries_for(IndexKind::Summaries);
	let chunk_searches: Vec<_> = h
		.index
		.queries_for(IndexKind::Chunks)
		.into_iter()
		.filter(|query| query.filter.is_none())
		.collect();

	assert_eq!(summaries.len(), 1);
	assert_eq!(summaries[0].top_k, default_top_k);
	assert_eq!(chunk_searches.len(), 1);
	assert_eq!(chunk_searches[0].top_k, default_top_k * multiplier);
}

#[tokio::test]
async fn top_k_bounds_the_returned_documents() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(RetrieveRequest { top_k: Some(1), ..request(BOARD_QUESTION) })
		.await
		.expect("Retrieval failed.");

	assert_eq!(response.documents.len(), 1);
	assert_eq!(response.chunks.len(), 1);
	assert_eq!(response.documents[0].id, "a");
}

#[tokio::test]
async fn question_is_normalized_before_use() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(request("  What   did the board\tdecide？ "))
		.await
		.expect("Retrieval failed.");

	assert_eq!(response.question, "What did the board decide?");
	assert!(response.is_related);
}
