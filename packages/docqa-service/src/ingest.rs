//! Writes documents into the per-tier indexes as question, summary and chunk records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use docqa_domain::{
	index::{AccessTier, IndexKind, IndexPoint},
	metadata::{NUM_QUESTIONS_FIELD, TEXT_FIELD},
};

use crate::{DocQaService, Error, Result};

const DOC_TYPE_FIELD: &str = "doc_type";
const QUESTIONS_TEXT_FIELD: &str = "questions_text";
const CHUNK_INDEX_FIELD: &str = "chunk_index";

/// One source document with its generated summary and questions and its text chunks.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IngestDocument {
	pub id: String,
	/// Document-level fields copied onto every record, such as `name`, `year`, `mimeType`, `url`.
	#[serde(default)]
	pub metadata: Map<String, Value>,
	#[serde(default)]
	pub summary: Option<String>,
	#[serde(default)]
	pub questions: Vec<String>,
	#[serde(default)]
	pub chunks: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestCounts {
	/// Whether the index had to be created first.
	pub created: bool,
	pub uploaded: usize,
	pub skipped: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
	pub questions: IngestCounts,
	pub summaries: IngestCounts,
	pub chunks: IngestCounts,
}

struct PendingRecord {
	key: String,
	text: String,
	metadata: Map<String, Value>,
}

impl DocQaService {
	/// Indexes `documents` into `tier`, creating missing indexes first.
	///
	/// Records with no text, or with text over `ingest.max_record_bytes`, are skipped and counted.
	pub async fn ingest(
		&self,
		tier: AccessTier,
		documents: &[IngestDocument],
	) -> Result<IngestReport> {
		if documents.iter().any(|doc| doc.id.trim().is_empty()) {
			return Err(Error::InvalidRequest { message: "Document id is required.".to_string() });
		}

		tracing::info!(tier = tier.as_str(), documents = documents.len(), "Ingestion started.");

		let mut report = IngestReport::default();

		for kind in [IndexKind::Questions, IndexKind::Summaries, IndexKind::Chunks] {
			let counts = self.ingest_kind(tier, kind, documents).await?;

			match kind {
				IndexKind::Questions => report.questions = counts,
				IndexKind::Summaries => report.summaries = counts,
				IndexKind::Chunks => report.chunks = counts,
			}
		}

		tracing::info!(tier = tier.as_str(), ?report, "Ingestion finished.");

		Ok(report)
	}

	async fn ingest_kind(
		&self,
		tier: AccessTier,
		kind: IndexKind,
		documents: &[IngestDocument],
	) -> Result<IngestCounts> {
		let created = self
			.index
			.ensure_index(tier, kind)
			.await
			.map_err(|err| Error::from_index(err, tier))?;
		let id_field = self.index_ref(tier, kind).id_field.as_str();
		let max_bytes = self.cfg.ingest.max_record_bytes;
		let mut records = Vec::new();
		let mut skipped = 0;

		for doc in documents {
			for record in build_records(kind, doc, id_field) {
				match record {
					Some(record) if record.text.len() <= max_bytes => records.push(record),
					Some(record) => {
						tracing::warn!(
							key = %record.key,
							bytes = record.text.len(),
							"Skipping record over the size limit."
						);

						skipped += 1;
					},
					None => {
						tracing::warn!(
							document_id = %doc.id,
							kind = kind.as_str(),
							"Skipping record without text."
						);

						skipped += 1;
					},
				}
			}
		}

		let points = self.embed_records(records).await?;
		let uploaded = points.len();
		let mut points = points.into_iter().peekable();

		while points.peek().is_some() {
			let batch: Vec<IndexPoint> =
				points.by_ref().take(self.cfg.ingest.upsert_batch).collect();

			self.index
				.upsert(tier, kind, batch)
				.await
				.map_err(|err| Error::from_index(err, tier))?;
		}

		tracing::info!(kind = kind.as_str(), created, uploaded, skipped, "Index written.");

		Ok(IngestCounts { created, uploaded, skipped })
	}

	async fn embed_records(&self, records: Vec<PendingRecord>) -> Result<Vec<IndexPoint>> {
		let dim = self.cfg.storage.qdrant.vector_dim as usize;
		let mut points = Vec::with_capacity(records.len());

		for batch in records.chunks(self.cfg.ingest.embed_batch) {
			let texts: Vec<String> = batch.iter().map(|record| record.text.clone()).collect();
			let vectors =
				self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;

			if vectors.len() != batch.len() {
				return Err(Error::Upstream {
					message: "Embedding provider returned the wrong number of vectors.".to_string(),
				});
			}
			if vectors.iter().any(|vector| vector.len() != dim) {
				return Err(Error::Upstream {
					message: "Embedding vector dimension mismatch.".to_string(),
				});
			}

			for (record, vector) in batch.iter().zip(vectors) {
				points.push(IndexPoint {
					key: record.key.clone(),
					vector,
					metadata: record.metadata.clone(),
				});
			}
		}

		Ok(points)
	}
}

/// One entry per candidate record; `None` marks a record with nothing to index.
fn build_records(
	kind: IndexKind,
	doc: &IngestDocument,
	id_field: &str,
) -> Vec<Option<PendingRecord>> {
	let id = doc.id.trim();

	match kind {
		IndexKind::Questions => {
			let questions: Vec<&str> = doc
				.questions
				.iter()
				.map(|question| question.trim())
				.filter(|question| !question.is_empty())
				.collect();

			if questions.is_empty() {
				return vec![None];
			}

			let text = questions.join("\n");
			let mut metadata = base_metadata(doc, id_field, id, "question_list");

			metadata.insert(NUM_QUESTIONS_FIELD.to_string(), Value::from(questions.len()));
			metadata.insert(QUESTIONS_TEXT_FIELD.to_string(), Value::String(text.clone()));

			vec![Some(PendingRecord { key: format!("{id}::questions"), text, metadata })]
		},
		IndexKind::Summaries => {
			let text = doc.summary.as_deref().map(str::trim).unwrap_or_default();

			if text.is_empty() {
				return vec![None];
			}

			let mut metadata = base_metadata(doc, id_field, id, "summary");

			metadata.insert(TEXT_FIELD.to_string(), Value::String(text.to_string()));

			vec![Some(PendingRecord {
				key: format!("{id}::summary"),
				text: text.to_string(),
				metadata,
			})]
		},
		IndexKind::Chunks => doc
			.chunks
			.iter()
			.enumerate()
			.map(|(idx, chunk)| {
				let text = chunk.trim();

				if text.is_empty() {
					return None;
				}

				let mut metadata = base_metadata(doc, id_field, id, "chunk");

				metadata.insert(CHUNK_INDEX_FIELD.to_string(), Value::from(idx));
				metadata.insert(TEXT_FIELD.to_string(), Value::String(text.to_string()));

				Some(PendingRecord {
					key: format!("{id}::chunk::{idx}"),
					text: text.to_string(),
					metadata,
				})
			})
			.collect(),
	}
}

/// Document fields without nulls, plus the record type and the parent id under `id_field`.
fn base_metadata(
	doc: &IngestDocument,
	id_field: &str,
	id: &str,
	doc_type: &str,
) -> Map<String, Value> {
	let mut metadata: Map<String, Value> = doc
		.metadata
		.iter()
		.filter(|(_, value)| !value.is_null())
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect();

	metadata.insert(DOC_TYPE_FIELD.to_string(), Value::String(doc_type.to_string()));
	metadata.insert(id_field.to_string(), Value::String(id.to_string()));

	metadata
}
