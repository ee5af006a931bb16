use serde_json::{Value, json};

use docqa_domain::index::{AccessTier, IndexKind};
use docqa_service::{Error, IngestCounts, IngestDocument};

use super::{BOARD_QUESTION, PDF, chunk_ids, document_ids, harness, request, test_config};

fn minutes() -> IngestDocument {
	IngestDocument {
		id: "minutes".to_string(),
		metadata: json!({
			"name": "Board minutes",
			"year": "2024",
			"mimeType": PDF,
			"url": "https://drive.example.org/minutes",
			"owners": null,
		})
		.as_object()
		.cloned()
		.expect("object"),
		summary: Some("Minutes of the spring board meeting.".to_string()),
		questions: vec!["What did the board approve?".to_string(), "  ".to_string()],
		chunks: vec![
			"The board approved the event budget.".to_string(),
			String::new(),
			"Next meeting in June.".to_string(),
		],
	}
}

fn keys(points: &[docqa_domain::index::IndexPoint]) -> Vec<&str> {
	points.iter().map(|point| point.key.as_str()).collect()
}

#[tokio::test]
async fn writes_three_record_kinds_under_configured_id_fields() {
	let h = harness(test_config());
	let report =
		h.service.ingest(AccessTier::Standard, &[minutes()]).await.expect("Ingest failed.");

	assert_eq!(report.questions, IngestCounts { created: true, uploaded: 1, skipped: 0 });
	assert_eq!(report.summaries, IngestCounts { created: true, uploaded: 1, skipped: 0 });
	assert_eq!(report.chunks, IngestCounts { created: true, uploaded: 2, skipped: 1 });

	let questions = h.index.written(AccessTier::Standard, IndexKind::Questions);
	let summaries = h.index.written(AccessTier::Standard, IndexKind::Summaries);
	let chunks = h.index.written(AccessTier::Standard, IndexKind::Chunks);

	assert_eq!(keys(&questions), ["minutes::questions"]);
	assert_eq!(keys(&summaries), ["minutes::summary"]);
	assert_eq!(keys(&chunks), ["minutes::chunk::0", "minutes::chunk::2"]);

	let question = &questions[0].metadata;

	assert_eq!(question["doc_id"], "minutes");
	assert_eq!(question["num_questions"], 1);
	assert_eq!(question["questions_text"], "What did the board approve?");
	assert_eq!(summaries[0].metadata["id"], "minutes");
	assert_eq!(summaries[0].metadata["text"], "Minutes of the spring board meeting.");
	assert_eq!(chunks[1].metadata["chunk_index"], 2);
	assert_eq!(chunks[1].metadata["year"], "2024");
	assert!(!chunks[1].metadata.contains_key("owners"));
	assert!(chunks.iter().all(|point| point.vector.len() == 4));
	assert!(h.index.written(AccessTier::Elevated, IndexKind::Chunks).is_empty());
}

#[tokio::test]
async fn oversized_records_are_skipped() {
	let mut cfg = test_config();

	cfg.ingest.max_record_bytes = 30;

	let h = harness(cfg);
	let report =
		h.service.ingest(AccessTier::Standard, &[minutes()]).await.expect("Ingest failed.");

	assert_eq!(report.summaries.uploaded, 0);
	assert_eq!(report.summaries.skipped, 1);
	assert_eq!(report.chunks.uploaded, 1);
	assert_eq!(report.chunks.skipped, 2);
	assert_eq!(
		keys(&h.index.written(AccessTier::Standard, IndexKind::Chunks)),
		["minutes::chunk::2"]
	);
}

#[tokio::test]
async fn reingesting_replaces_records_and_keeps_collections() {
	let h = harness(test_config());

	h.service.ingest(AccessTier::Elevated, &[minutes()]).await.expect("Ingest failed.");

	let mut revised = minutes();

	revised.chunks[0] = "The board postponed the event budget.".to_string();

	let report = h.service.ingest(AccessTier::Elevated, &[revised]).await.expect("Ingest failed.");
	let chunks = h.index.written(AccessTier::Elevated, IndexKind::Chunks);

	assert!(!report.chunks.created);
	assert_eq!(keys(&chunks), ["minutes::chunk::0", "minutes::chunk::2"]);
	assert_eq!(chunks[0].metadata["text"], "The board postponed the event budget.");
}

#[tokio::test]
async fn embedding_requests_are_batched() {
	let mut cfg = test_config();

	cfg.ingest.embed_batch = 2;

	let h = harness(cfg);
	let mut doc = minutes();

	doc.chunks = (0..5).map(|idx| format!("Budget line {idx}.")).collect();

	h.service.ingest(AccessTier::Standard, &[doc]).await.expect("Ingest failed.");

	// One request each for questions and summaries, three for five chunks.
	assert_eq!(h.embedding.calls(), 5);
}

#[tokio::test]
async fn upserts_are_batched() {
	let mut cfg = test_config();

	cfg.ingest.upsert_batch = 1;

	let h = harness(cfg);
	let report =
		h.service.ingest(AccessTier::Standard, &[minutes()]).await.expect("Ingest failed.");

	assert_eq!(report.chunks.uploaded, 2);
	assert_eq!(h.index.written(AccessTier::Standard, IndexKind::Chunks).len(), 2);
}

#[tokio::test]
async fn blank_document_id_is_rejected_before_writing() {
	let h = harness(test_config());
	let blank = IngestDocument { id: "  ".to_string(), ..minutes() };
	let err = h
		.service
		.ingest(AccessTier::Standard, &[minutes(), blank])
		.await
		.expect_err("Expected a validation error.");

	assert!(matches!(err, Error::InvalidRequest { .. }), "Unexpected error: {err}");
	assert!(h.index.written(AccessTier::Standard, IndexKind::Summaries).is_empty());
	assert_eq!(h.embedding.calls(), 0);
}

#[tokio::test]
async fn index_failures_abort_ingestion() {
	let h = harness(test_config());

	h.index.fail(AccessTier::Standard, IndexKind::Summaries, "disk quota exceeded");

	let err = h
		.service
		.ingest(AccessTier::Standard, &[minutes()])
		.await
		.expect_err("Expected an upstream error.");

	assert!(matches!(err, Error::Upstream { .. }), "Unexpected error: {err}");
	assert!(h.index.written(AccessTier::Standard, IndexKind::Chunks).is_empty());
}

#[tokio::test]
async fn ingested_documents_are_retrievable() {
	let h = harness(test_config());

	h.service.ingest(AccessTier::Standard, &[minutes()]).await.expect("Ingest failed.");

	let response = h.service.retrieve(request(BOARD_QUESTION)).await.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["minutes"]);
	assert_eq!(chunk_ids(&response), ["minutes"]);
	assert_eq!(response.documents[0].name, "Board minutes");
	assert_eq!(response.documents[0].num_questions, 1);
	assert_eq!(response.documents[0].link.as_deref(), Some("https://drive.example.org/minutes"));
	assert_eq!(response.chunks[0].metadata["doc_type"], Value::from("chunk"));
}
