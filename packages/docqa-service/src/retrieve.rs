mod assemble;
mod diversity;
mod evidence;
mod fusion;
mod sources;

pub use assemble::assemble;
pub use diversity::interleave_by_document;
pub use fusion::{SourceIdFields, fuse};
pub use sources::SourceMatches;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use docqa_domain::{
	filter::{self, DataTypeCategory, MetadataPredicate},
	index::{AccessTier, IndexKind},
	question,
};

use crate::{DocQaService, Error, Result};
use evidence::EvidenceContext;
use sources::SourceQuery;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveRequest {
	#[serde(default)]
	pub question: Option<String>,
	#[serde(default)]
	pub selected_years: Vec<String>,
	#[serde(default)]
	pub selected_data_types: Vec<DataTypeCategory>,
	#[serde(default)]
	pub top_k: Option<u32>,
	#[serde(default, alias = "accessTier")]
	pub is_private: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResponse {
	pub years: Vec<String>,
	pub documents: Vec<DocumentItem>,
	pub chunks: Vec<ChunkItem>,
	pub question: String,
	pub is_related: bool,
}
impl RetrieveResponse {
	fn unrelated(years: Vec<String>, question: String) -> Self {
		Self { years, documents: Vec::new(), chunks: Vec::new(), question, is_related: false }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
	pub id: String,
	pub name: String,
	pub year: Option<String>,
	pub score: f32,
	pub num_questions: u32,
	pub link: Option<String>,
}
impl From<RankedDocument> for DocumentItem {
	fn from(doc: RankedDocument) -> Self {
		Self {
			name: doc.name.unwrap_or_else(|| doc.id.clone()),
			id: doc.id,
			year: doc.year,
			score: doc.hybrid_score,
			num_questions: doc.num_questions,
			link: doc.link,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChunkItem {
	pub id: String,
	pub content: String,
	pub score: f32,
	pub metadata: Map<String, Value>,
}
impl From<EvidenceItem> for ChunkItem {
	fn from(item: EvidenceItem) -> Self {
		Self {
			id: item.document_id,
			content: item.content,
			score: item.score,
			metadata: item.metadata,
		}
	}
}

/// A document after score fusion, carrying its per-source scores and display fields.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedDocument {
	pub id: String,
	/// Chunk payload key that carries `id`; evidence lookups filter on it.
	pub id_field: String,
	pub hybrid_score: f32,
	pub summary_score: f32,
	pub question_score: f32,
	pub chunk_score: f32,
	pub name: Option<String>,
	pub year: Option<String>,
	pub link: Option<String>,
	pub num_questions: u32,
}

/// One supporting passage for a ranked document.
#[derive(Clone, Debug, PartialEq)]
pub struct EvidenceItem {
	pub document_id: String,
	pub content: String,
	pub score: f32,
	/// Pass-through payload with the bulk text removed and display fields resolved.
	pub metadata: Map<String, Value>,
}

impl DocQaService {
	pub async fn retrieve(&self, req: RetrieveRequest) -> Result<RetrieveResponse> {
		let request_id = Uuid::new_v4();
		let question = req
			.question
			.as_deref()
			.and_then(question::normalize_question)
			.ok_or(Error::MissingQuestion)?;
		let top_k = self.resolve_top_k(req.top_k)?;
		let tier = AccessTier::from_private_flag(req.is_private);

		tracing::info!(%request_id, tier = tier.as_str(), top_k, "Retrieval started.");

		if !self.scope_gate.is_in_scope(&question) {
			tracing::info!(%request_id, "Question is outside the corpus scope.");

			return Ok(RetrieveResponse::unrelated(req.selected_years, question));
		}

		let vector = self.embed_question(&question).await?;
		let filter = filter::build_filter(&req.selected_years, &req.selected_data_types);
		let (documents, chunks) = self.run_pipeline(tier, vector, top_k, filter).await?;

		tracing::info!(
			%request_id,
			documents = documents.len(),
			chunks = chunks.len(),
			"Retrieval finished."
		);

		Ok(RetrieveResponse {
			years: req.selected_years,
			documents: documents.into_iter().map(DocumentItem::from).collect(),
			chunks: chunks.into_iter().map(ChunkItem::from).collect(),
			question,
			is_related: true,
		})
	}

	fn resolve_top_k(&self, requested: Option<u32>) -> Result<u32> {
		let cfg = &self.cfg.retrieval;
		let top_k = requested.unwrap_or(cfg.default_top_k);

		if top_k == 0 {
			return Err(Error::InvalidRequest {
				message: "topK must be greater than zero.".to_string(),
			});
		}
		if top_k > cfg.max_top_k {
			return Err(Error::InvalidRequest {
				message: format!("topK must be at most {}.", cfg.max_top_k),
			});
		}

		Ok(top_k)
	}

	async fn embed_question(&self, question: &str) -> Result<Vec<f32>> {
		let embeddings = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, std::slice::from_ref(&question.to_string()))
			.await?;
		let vector = embeddings.into_iter().next().ok_or_else(|| Error::Upstream {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Upstream {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}

	async fn run_pipeline(
		&self,
		tier: AccessTier,
		vector: Vec<f32>,
		top_k: u32,
		filter: Option<MetadataPredicate>,
	) -> Result<(Vec<RankedDocument>, Vec<EvidenceItem>)> {
		let cfg = &self.cfg.retrieval;
		let matches = sources::query_sources(
			self.index.as_ref(),
			SourceQuery {
				tier,
				vector: &vector,
				top_k,
				chunk_top_k: top_k.saturating_mul(cfg.chunk_query_multiplier),
				filter: filter.as_ref(),
			},
		)
		.await?;

		tracing::debug!(
			summaries = matches.summaries.len(),
			questions = matches.questions.len(),
			chunks = matches.chunks.len(),
			"Index queries finished."
		);

		let id_fields = SourceIdFields {
			summaries: self.index_ref(tier, IndexKind::Summaries).id_field.as_str(),
			questions: self.index_ref(tier, IndexKind::Questions).id_field.as_str(),
			chunks: self.index_ref(tier, IndexKind::Chunks).id_field.as_str(),
		};
		let ranked = fusion::fuse(&matches, &id_fields, &cfg.fusion, top_k as usize);

		tracing::debug!(ranked = ranked.len(), "Score fusion finished.");

		let ctx = Arc::new(EvidenceContext {
			index: self.index.clone(),
			tier,
			vector,
			filter,
			candidates: cfg.evidence_candidates,
			broaden_multiplier: cfg.broaden_on_empty.then_some(cfg.broaden_multiplier),
		});
		let evidence = evidence::collect_evidence(ctx, &ranked).await?;
		let evidence = diversity::interleave_by_document(evidence, top_k as usize);

		Ok(assemble::assemble(&ranked, evidence))
	}
}
