use serde::Serialize;
use serde_json::{Map, Value};

use docqa_providers::generation::EvidenceBlock;

use crate::{ChunkItem, DocQaService, DocumentItem, Result, RetrieveRequest, RetrieveResponse};

pub const NO_EVIDENCE_ANSWER: &str =
	"I could not find relevant documents for this question. Try widening the year or type filters.";
pub const OUT_OF_SCOPE_ANSWER: &str =
	"This question is outside the documents I can search. Please ask about the indexed documents.";

#[derive(Clone, Debug, Serialize)]
pub struct AnswerResponse {
	#[serde(flatten)]
	pub retrieval: RetrieveResponse,
	pub answer: String,
}

impl DocQaService {
	/// Retrieves evidence and asks the generation model to answer from it.
	pub async fn answer(&self, req: RetrieveRequest) -> Result<AnswerResponse> {
		let retrieval = self.retrieve(req).await?;

		if !retrieval.is_related {
			return Ok(AnswerResponse { retrieval, answer: OUT_OF_SCOPE_ANSWER.to_string() });
		}
		if retrieval.chunks.is_empty() {
			return Ok(AnswerResponse { retrieval, answer: NO_EVIDENCE_ANSWER.to_string() });
		}

		let blocks = evidence_blocks(&retrieval.chunks, &retrieval.documents);
		let answer = self
			.providers
			.generation
			.generate(&self.cfg.providers.generation, &retrieval.question, &blocks)
			.await
			.inspect_err(|err| tracing::error!(error = %err, "Answer generation failed."))?;

		tracing::info!(sources = blocks.len(), "Answer generated.");

		Ok(AnswerResponse { retrieval, answer })
	}
}

fn evidence_blocks(chunks: &[ChunkItem], documents: &[DocumentItem]) -> Vec<EvidenceBlock> {
	chunks
		.iter()
		.map(|chunk| {
			let doc = documents.iter().find(|doc| doc.id == chunk.id);

			EvidenceBlock {
				name: metadata_text(&chunk.metadata, "name").or_else(|| doc.map(|doc| doc.name.clone())),
				year: metadata_text(&chunk.metadata, "year")
					.or_else(|| doc.and_then(|doc| doc.year.clone())),
				link: metadata_text(&chunk.metadata, "link")
					.or_else(|| doc.and_then(|doc| doc.link.clone())),
				content: chunk.content.clone(),
			}
		})
		.collect()
}

fn metadata_text(metadata: &Map<String, Value>, key: &str) -> Option<String> {
	metadata.get(key).and_then(docqa_domain::metadata::value_text)
}
