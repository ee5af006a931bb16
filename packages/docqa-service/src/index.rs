use docqa_domain::{
	filter::MetadataPredicate,
	index::{AccessTier, IndexKind, IndexPoint, ScoredMatch},
};
use docqa_storage::qdrant::QdrantStore;

use crate::BoxFuture;

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct IndexError {
	pub message: String,
}
impl From<docqa_storage::Error> for IndexError {
	fn from(err: docqa_storage::Error) -> Self {
		Self { message: err.to_string() }
	}
}

#[derive(Clone, Copy, Debug)]
pub struct IndexQuery<'a> {
	pub tier: AccessTier,
	pub kind: IndexKind,
	pub vector: &'a [f32],
	pub top_k: u32,
	pub filter: Option<&'a MetadataPredicate>,
}

/// Similarity search and writes over the per-tier summary, question and chunk indexes.
pub trait DocumentIndex
where
	Self: Send + Sync,
{
	fn query<'a>(&'a self, query: IndexQuery<'a>)
	-> BoxFuture<'a, Result<Vec<ScoredMatch>, IndexError>>;

	/// Creates the index when missing; returns whether it was created.
	fn ensure_index<'a>(
		&'a self,
		tier: AccessTier,
		kind: IndexKind,
	) -> BoxFuture<'a, Result<bool, IndexError>>;

	/// Inserts or replaces points by record key.
	fn upsert<'a>(
		&'a self,
		tier: AccessTier,
		kind: IndexKind,
		points: Vec<IndexPoint>,
	) -> BoxFuture<'a, Result<(), IndexError>>;
}

impl DocumentIndex for QdrantStore {
	fn query<'a>(
		&'a self,
		query: IndexQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<ScoredMatch>, IndexError>> {
		Box::pin(async move {
			let collection = self.index_ref(query.tier, query.kind).collection.as_str();

			Ok(self.search(collection, query.vector, u64::from(query.top_k), query.filter).await?)
		})
	}

	fn ensure_index<'a>(
		&'a self,
		tier: AccessTier,
		kind: IndexKind,
	) -> BoxFuture<'a, Result<bool, IndexError>> {
		Box::pin(async move {
			Ok(self.ensure_collection(self.index_ref(tier, kind).collection.as_str()).await?)
		})
	}

	fn upsert<'a>(
		&'a self,
		tier: AccessTier,
		kind: IndexKind,
		points: Vec<IndexPoint>,
	) -> BoxFuture<'a, Result<(), IndexError>> {
		Box::pin(async move {
			Ok(QdrantStore::upsert(self, self.index_ref(tier, kind).collection.as_str(), points)
				.await?)
		})
	}
}
