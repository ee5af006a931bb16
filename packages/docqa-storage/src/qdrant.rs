use qdrant_client::{
	Payload, QdrantError,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder,
		UpsertPointsBuilder, VectorParamsBuilder,
	},
};
use serde_json::Value;
use uuid::Uuid;

use docqa_config::{IndexRef, IndexSet};
use docqa_domain::{
	filter::MetadataPredicate,
	index::{AccessTier, IndexKind, IndexPoint, ScoredMatch},
};

use crate::{Error, Result, filter, payload};

/// Payload key that keeps the human-readable record key next to its derived point id.
pub const RECORD_KEY_FIELD: &str = "record_key";

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub vector_dim: u32,
	standard: IndexSet,
	elevated: IndexSet,
}
impl QdrantStore {
	pub fn new(cfg: &docqa_config::Qdrant) -> Result<Self> {
		let mut builder = qdrant_client::Qdrant::from_url(&cfg.url);

		if let Some(api_key) = cfg.api_key.as_deref() {
			builder = builder.api_key(api_key);
		}

		let client = builder.build()?;

		Ok(Self {
			client,
			vector_dim: cfg.vector_dim,
			standard: cfg.standard.clone(),
			elevated: cfg.elevated.clone(),
		})
	}

	pub fn index_ref(&self, tier: AccessTier, kind: IndexKind) -> &IndexRef {
		let set = match tier {
			AccessTier::Standard => &self.standard,
			AccessTier::Elevated => &self.elevated,
		};

		match kind {
			IndexKind::Summaries => &set.summaries,
			IndexKind::Questions => &set.questions,
			IndexKind::Chunks => &set.chunks,
		}
	}

	pub async fn search(
		&self,
		collection: &str,
		vector: &[f32],
		limit: u64,
		predicate: Option<&MetadataPredicate>,
	) -> Result<Vec<ScoredMatch>> {
		let mut request = QueryPointsBuilder::new(collection)
			.query(Query::new_nearest(vector.to_vec()))
			.limit(limit)
			.with_payload(true);

		if let Some(predicate) = predicate {
			request = request.filter(filter::to_qdrant_filter(predicate));
		}

		let response = self
			.client
			.query(request)
			.await
			.map_err(|err| classify_error(collection, err))?;

		tracing::debug!(collection, hits = response.result.len(), "Qdrant query finished.");

		Ok(response
			.result
			.into_iter()
			.map(|point| ScoredMatch {
				score: point.score,
				metadata: payload::payload_to_json(&point.payload),
			})
			.collect())
	}

	/// Creates `collection` with cosine distance when it is missing; returns whether it did.
	pub async fn ensure_collection(&self, collection: &str) -> Result<bool> {
		if self.client.collection_exists(collection).await? {
			return Ok(false);
		}

		self.client
			.create_collection(CreateCollectionBuilder::new(collection).vectors_config(
				VectorParamsBuilder::new(u64::from(self.vector_dim), Distance::Cosine),
			))
			.await?;

		tracing::info!(collection, vector_dim = self.vector_dim, "Qdrant collection created.");

		Ok(true)
	}

	pub async fn upsert(&self, collection: &str, points: Vec<IndexPoint>) -> Result<()> {
		let count = points.len();
		let points: Vec<PointStruct> = points
			.into_iter()
			.map(|point| {
				let mut metadata = point.metadata;

				metadata.insert(RECORD_KEY_FIELD.to_string(), Value::String(point.key.clone()));

				PointStruct::new(
					point_id(&point.key).to_string(),
					point.vector,
					Payload::from(metadata),
				)
			})
			.collect();

		self.client
			.upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
			.await
			.map_err(|err| classify_error(collection, err))?;

		tracing::debug!(collection, points = count, "Qdrant upsert finished.");

		Ok(())
	}
}

/// Qdrant ids must be integers or UUIDs, so record keys map to name-based UUIDs.
pub fn point_id(key: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

/// Missing collections surface as "not found"; the access tier behind them is not provisioned.
pub fn is_not_found(message: &str) -> bool {
	message.to_ascii_lowercase().contains("not found")
}

fn classify_error(collection: &str, err: QdrantError) -> Error {
	let message = err.to_string();

	if is_not_found(&message) {
		return Error::CollectionNotFound { collection: collection.to_string(), message };
	}

	err.into()
}
