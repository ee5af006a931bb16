use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinSet;

use docqa_domain::{
	filter::MetadataPredicate,
	index::{AccessTier, IndexKind, ScoredMatch},
	metadata::{MatchMetadata, TEXT_FIELD},
};

use super::{EvidenceItem, RankedDocument, fusion::cmp_f32_desc};
use crate::{DocumentIndex, Error, IndexQuery, Result};

pub(super) struct EvidenceContext {
	pub(super) index: Arc<dyn DocumentIndex>,
	pub(super) tier: AccessTier,
	pub(super) vector: Vec<f32>,
	pub(super) filter: Option<MetadataPredicate>,
	pub(super) candidates: u32,
	pub(super) broaden_multiplier: Option<u32>,
}
impl EvidenceContext {
	async fn lookup(&self, doc: &RankedDocument) -> Result<Option<EvidenceItem>> {
		let document = MetadataPredicate::eq(doc.id_field.as_str(), doc.id.as_str());
		let narrow = document.clone().and_with(self.filter.as_ref());
		let mut hits = self.chunk_query(self.candidates, Some(&narrow)).await?;

		// Chunk payloads may lack the fields the outer filter tests; retry on the document alone.
		if hits.is_empty()
			&& self.filter.is_some()
			&& let Some(multiplier) = self.broaden_multiplier
		{
			let limit = self.candidates.saturating_mul(multiplier);

			tracing::debug!(document_id = %doc.id, limit, "No filtered chunk hits; broadening.");

			hits = self.chunk_query(limit, Some(&document)).await?;
		}
		if hits.is_empty() {
			tracing::debug!(document_id = %doc.id, "Document has no retrievable chunk.");

			return Ok(None);
		}

		Ok(select_best(hits).map(|hit| to_evidence(doc, hit)))
	}

	async fn chunk_query(
		&self,
		top_k: u32,
		filter: Option<&MetadataPredicate>,
	) -> Result<Vec<ScoredMatch>> {
		self.index
			.query(IndexQuery {
				tier: self.tier,
				kind: IndexKind::Chunks,
				vector: &self.vector,
				top_k,
				filter,
			})
			.await
			.map_err(|err| Error::from_index(err, self.tier))
	}
}

/// Looks up one evidence passage per ranked document, preserving ranked order.
///
/// Documents without a usable chunk contribute nothing. Any lookup failure fails the batch.
pub(super) async fn collect_evidence(
	ctx: Arc<EvidenceContext>,
	ranked: &[RankedDocument],
) -> Result<Vec<EvidenceItem>> {
	let mut tasks = JoinSet::new();

	for (position, doc) in ranked.iter().cloned().enumerate() {
		let ctx = ctx.clone();

		tasks.spawn(async move { (position, ctx.lookup(&doc).await) });
	}

	let mut slots: Vec<Option<EvidenceItem>> = vec![None; ranked.len()];

	while let Some(joined) = tasks.join_next().await {
		let (position, result) = joined?;

		slots[position] = result?;
	}

	Ok(slots.into_iter().flatten().collect())
}

fn select_best(hits: Vec<ScoredMatch>) -> Option<ScoredMatch> {
	let mut with_text: Vec<ScoredMatch> =
		hits.into_iter().filter(|hit| MatchMetadata::new(&hit.metadata).text().is_some()).collect();

	with_text.sort_by(|a, b| cmp_f32_desc(a.score, b.score));

	with_text.into_iter().next()
}

fn to_evidence(doc: &RankedDocument, hit: ScoredMatch) -> EvidenceItem {
	let view = MatchMetadata::new(&hit.metadata);
	let content = view.text().unwrap_or_default().to_string();
	let link = view.link().or_else(|| doc.link.clone());
	let name = view.name().or_else(|| doc.name.clone());
	let year = view.year().or_else(|| doc.year.clone());
	let mut metadata = hit.metadata;

	metadata.remove(TEXT_FIELD);

	for (key, value) in [("link", link), ("name", name), ("year", year)] {
		if let Some(value) = value {
			metadata.insert(key.to_string(), Value::String(value));
		}
	}

	EvidenceItem { document_id: doc.id.clone(), content, score: hit.score, metadata }
}
