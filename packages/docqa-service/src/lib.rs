pub mod answer;
pub mod index;
pub mod ingest;
pub mod retrieve;

mod error;

pub use answer::{AnswerResponse, NO_EVIDENCE_ANSWER, OUT_OF_SCOPE_ANSWER};
pub use error::{Error, Result};
pub use index::{DocumentIndex, IndexError, IndexQuery};
pub use ingest::{IngestCounts, IngestDocument, IngestReport};
pub use retrieve::{
	ChunkItem, DocumentItem, EvidenceItem, RankedDocument, RetrieveRequest, RetrieveResponse,
};

use std::{future::Future, pin::Pin, sync::Arc};

use docqa_config::{Config, EmbeddingProviderConfig, GenerationProviderConfig, IndexRef};
use docqa_domain::{
	index::{AccessTier, IndexKind},
	scope_gate::{KeywordScopeGate, ScopeGate},
};
use docqa_providers::{embedding, generation, generation::EvidenceBlock};
use docqa_storage::qdrant::QdrantStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		question: &'a str,
		evidence: &'a [EvidenceBlock],
	) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		generation: Arc<dyn GenerationProvider>,
	) -> Self {
		Self { embedding, generation }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generation: provider }
	}
}

pub struct DocQaService {
	pub cfg: Config,
	pub index: Arc<dyn DocumentIndex>,
	pub providers: Providers,
	pub scope_gate: Arc<dyn ScopeGate>,
}
impl DocQaService {
	pub fn new(cfg: Config, qdrant: QdrantStore) -> Self {
		let scope_gate = Arc::new(KeywordScopeGate::new(&cfg.scope));

		Self { cfg, index: Arc::new(qdrant), providers: Providers::default(), scope_gate }
	}

	pub fn with_parts(
		cfg: Config,
		index: Arc<dyn DocumentIndex>,
		providers: Providers,
		scope_gate: Arc<dyn ScopeGate>,
	) -> Self {
		Self { cfg, index, providers, scope_gate }
	}

	pub(crate) fn index_ref(&self, tier: AccessTier, kind: IndexKind) -> &IndexRef {
		let set = match tier {
			AccessTier::Standard => &self.cfg.storage.qdrant.standard,
			AccessTier::Elevated => &self.cfg.storage.qdrant.elevated,
		};

		match kind {
			IndexKind::Summaries => &set.summaries,
			IndexKind::Questions => &set.questions,
			IndexKind::Chunks => &set.chunks,
		}
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}
impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		question: &'a str,
		evidence: &'a [EvidenceBlock],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(generation::generate(cfg, question, evidence).await?) })
	}
}
