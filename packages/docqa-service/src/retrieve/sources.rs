use docqa_domain::{
	filter::MetadataPredicate,
	index::{AccessTier, IndexKind, ScoredMatch},
};

use crate::{DocumentIndex, Error, IndexQuery, Result};

/// Raw hits from the three indexes of one access tier.
#[derive(Clone, Debug, Default)]
pub struct SourceMatches {
	pub summaries: Vec<ScoredMatch>,
	pub questions: Vec<ScoredMatch>,
	pub chunks: Vec<ScoredMatch>,
}

pub(super) struct SourceQuery<'a> {
	pub(super) tier: AccessTier,
	pub(super) vector: &'a [f32],
	pub(super) top_k: u32,
	pub(super) chunk_top_k: u32,
	pub(super) filter: Option<&'a MetadataPredicate>,
}

/// Queries all three indexes concurrently; the first failure fails the whole stage.
pub(super) async fn query_sources(
	index: &dyn DocumentIndex,
	query: SourceQuery<'_>,
) -> Result<SourceMatches> {
	let SourceQuery { tier, vector, top_k, chunk_top_k, filter } = query;
	let run = |kind: IndexKind, top_k: u32| async move {
		index
			.query(IndexQuery { tier, kind, vector, top_k, filter })
			.await
			.map_err(|err| {
				tracing::warn!(
					tier = tier.as_str(),
					index = kind.as_str(),
					error = %err,
					"Index query failed."
				);

				Error::from_index(err, tier)
			})
	};
	let (summaries, questions, chunks) = tokio::try_join!(
		run(IndexKind::Summaries, top_k),
		run(IndexKind::Questions, top_k),
		run(IndexKind::Chunks, chunk_top_k),
	)?;

	Ok(SourceMatches { summaries, questions, chunks })
}
