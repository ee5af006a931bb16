use serde_json::json;

use docqa_domain::{
	filter::MetadataPredicate,
	index::{AccessTier, IndexKind},
};
use docqa_service::RetrieveRequest;

use super::{
	BOARD_QUESTION, PDF, assert_used_documents_consistent, chunk_ids, document, document_ids,
	harness, payload, request, seed_corpus, test_config,
};

#[tokio::test]
async fn documents_without_evidence_are_not_displayed() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");

	assert!(response.is_related);
	assert_eq!(document_ids(&response), ["a", "b", "d"]);
	assert_eq!(chunk_ids(&response), ["a", "b", "d"]);
	assert_used_documents_consistent(&response);
}

#[tokio::test]
async fn fused_scores_and_display_fields_reach_the_response() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");
	let top = &response.documents[0];

	assert!((top.score - 1.092).abs() < 1e-5);
	assert_eq!(top.name, "Board minutes 2023");
	assert_eq!(top.year.as_deref(), Some("2023"));
	assert_eq!(top.link.as_deref(), Some("https://drive.example.org/a"));
	assert_eq!(top.num_questions, 4);
	assert!(response.documents.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[tokio::test]
async fn best_passage_is_selected_per_document() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");
	let chunk = &response.chunks[0];

	assert_eq!(chunk.content, "The board approved the 2023 budget.");
	assert!((chunk.score - 0.9).abs() < 1e-6);
	assert!(!chunk.metadata.contains_key("text"));
	assert_eq!(chunk.metadata["link"], "https://drive.example.org/a");
	assert_eq!(chunk.metadata["chunk_index"], 0);
}

#[tokio::test]
async fn chunk_only_corpus_ranks_through_fusion() {
	let h = harness(test_config());
	let x = document("x", "Hackathon budget", "2023", PDF);
	let y = document("y", "Event sponsors", "2023", PDF);

	for (score, doc, text) in
		[(0.8, &x, "Budget for the hackathon."), (0.6, &y, "Sponsors of the event.")]
	{
		h.index.insert(
			AccessTier::Standard,
			IndexKind::Chunks,
			score,
			payload(doc, json!({ "text": text, "chunk_index": 0 })),
		);
	}

	let response = h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["x", "y"]);
	assert_eq!(chunk_ids(&response), ["x", "y"]);
}

#[tokio::test]
async fn chunks_keyed_by_an_alias_still_return_evidence() {
	let h = harness(test_config());

	for (score, id, text) in [(0.8, "x", "Budget text."), (0.6, "y", "Board text.")] {
		h.index.insert(
			AccessTier::Standard,
			IndexKind::Chunks,
			score,
			json!({ "doc_id": id, "name": format!("Doc {id}"), "text": text }),
		);
	}

	let response = h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["x", "y"]);
	assert_eq!(chunk_ids(&response), ["x", "y"]);
	assert_eq!(response.chunks[0].content, "Budget text.");
	assert_eq!(response.documents[0].name, "Doc x");
	assert_used_documents_consistent(&response);

	let lookups: Vec<_> = h
		.index
		.queries_for(IndexKind::Chunks)
		.into_iter()
		.filter_map(|query| query.filter)
		.collect();

	assert!(lookups.contains(&MetadataPredicate::eq("doc_id", "x")));
	assert!(lookups.contains(&MetadataPredicate::eq("doc_id", "y")));
}

/// Summaries carry the document year, but this corpus stored chunks without it.
fn seed_yearless_chunks(h: &super::Harness) {
	let e = document("e", "Board retreat", "2021", PDF);

	h.index.insert(
		AccessTier::Standard,
		IndexKind::Summaries,
		0.7,
		payload(&e, json!({ "text": "Board retreat agenda." })),
	);
	h.index.insert(
		AccessTier::Standard,
		IndexKind::Chunks,
		0.6,
		json!({ "id": "e", "text": "Retreat budget approved.", "chunk_index": 0 }),
	);
}

#[tokio::test]
async fn filtered_out_chunks_are_skipped_by_default() {
	let h = harness(test_config());

	seed_yearless_chunks(&h);

	let response = h
		.service
		.retrieve(RetrieveRequest {
			selected_years: vec!["2021".to_string()],
			..request(BOARD_QUESTION)
		})
		.await
		.expect("Retrieval failed.");

	assert!(response.documents.is_empty());
	assert!(response.chunks.is_empty());
}

#[tokio::test]
async fn broadening_retries_on_the_document_alone() {
	let mut cfg = test_config();

	cfg.retrieval.broaden_on_empty = true;

	let candidates = cfg.retrieval.evidence_candidates * cfg.retrieval.broaden_multiplier;
	let h = harness(cfg);

	seed_yearless_chunks(&h);

	let response = h
		.service
		.retrieve(RetrieveRequest {
			selected_years: vec!["2021".to_string()],
			..request(BOARD_QUESTION)
		})
		.await
		.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["e"]);
	assert_eq!(response.chunks[0].content, "Retreat budget approved.");
	assert_eq!(response.chunks[0].metadata["year"], "2021");

	let broadened: Vec<_> = h
		.index
		.queries_for(IndexKind::Chunks)
		.into_iter()
		.filter(|query| query.filter == Some(MetadataPredicate::eq("id", "e")))
		.collect();

	assert_eq!(broadened.len(), 1);
	assert_eq!(broadened[0].top_k, candidates);
}
