//! In-memory stand-ins for the vector index and model providers.

mod error;

pub use error::{Error, Result};

use std::{
	collections::{HashMap, HashSet},
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::Value;

use docqa_config::{Config, EmbeddingProviderConfig, GenerationProviderConfig};
use docqa_domain::{
	filter::MetadataPredicate,
	index::{AccessTier, IndexKind, IndexPoint, ScoredMatch},
	scope_gate::KeywordScopeGate,
};
use docqa_providers::generation::EvidenceBlock;
use docqa_service::{
	BoxFuture, DocQaService, DocumentIndex, EmbeddingProvider, GenerationProvider, IndexError,
	IndexQuery, Providers,
};

const TEST_CONFIG: &str = r#"
[service]
http_bind     = "127.0.0.1:0"
log_level     = "debug"
contact_email = "admin@example.org"

[storage.qdrant]
url        = "http://127.0.0.1:6334"
vector_dim = 4

[storage.qdrant.standard.summaries]
collection = "summaries"
id_field   = "id"

[storage.qdrant.standard.questions]
collection = "questions"
id_field   = "doc_id"

[storage.qdrant.standard.chunks]
collection = "chunks"
id_field   = "id"

[storage.qdrant.elevated.summaries]
collection = "summaries-private"
id_field   = "id"

[storage.qdrant.elevated.questions]
collection = "questions-private"
id_field   = "doc_id"

[storage.qdrant.elevated.chunks]
collection = "chunks-private"
id_field   = "id"

[providers.embedding]
api_base   = "http://127.0.0.1:9"
api_key    = "test-key"
path       = "/v1/embeddings"
model      = "test-embedding"
dimensions = 4
timeout_ms = 1000

[providers.generation]
api_base    = "http://127.0.0.1:9"
api_key     = "test-key"
path        = "/v1/chat/completions"
model       = "test-chat"
temperature = 0.0
timeout_ms  = 1000

[retrieval]
default_top_k = 10
max_top_k     = 50

[scope]
enabled  = true
keywords = ["board", "budget", "event", "funding", "startup", "deep tech"]
"#;

/// A validated configuration sized for the fakes in this crate.
pub fn test_config() -> Result<Config> {
	let cfg: Config = toml::from_str(TEST_CONFIG)?;

	docqa_config::validate(&cfg)?;

	Ok(cfg)
}

/// Wires a service over `index` with deterministic providers and the configured keyword gate.
pub fn service(cfg: Config, index: Arc<MemoryIndex>) -> DocQaService {
	let providers = Providers::new(
		Arc::new(FixedEmbedding::new(cfg.storage.qdrant.vector_dim)),
		Arc::new(EchoGeneration::default()),
	);
	let scope_gate = Arc::new(KeywordScopeGate::new(&cfg.scope));

	DocQaService::with_parts(cfg, index, providers, scope_gate)
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedQuery {
	pub tier: AccessTier,
	pub kind: IndexKind,
	pub top_k: u32,
	pub filter: Option<MetadataPredicate>,
}

/// Vector index with fixed scores per inserted point.
///
/// Inserted points ignore the query vector. Upserted points score by dot product with it and
/// rank after inserted points on ties. Filters are evaluated with [`MetadataPredicate::matches`].
#[derive(Default)]
pub struct MemoryIndex {
	points: Mutex<HashMap<(AccessTier, IndexKind), Vec<ScoredMatch>>>,
	written: Mutex<HashMap<(AccessTier, IndexKind), Vec<IndexPoint>>>,
	created: Mutex<HashSet<(AccessTier, IndexKind)>>,
	failures: Mutex<HashMap<(AccessTier, IndexKind), String>>,
	queries: Mutex<Vec<RecordedQuery>>,
}
impl MemoryIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a point; `metadata` must be a JSON object.
	pub fn insert(&self, tier: AccessTier, kind: IndexKind, score: f32, metadata: Value) {
		let metadata = match metadata {
			Value::Object(map) => map,
			other => panic!("Point metadata must be an object, got {other}."),
		};

		lock(&self.points).entry((tier, kind)).or_default().push(ScoredMatch { score, metadata });
	}

	/// Makes every query against `(tier, kind)` fail with `message`.
	pub fn fail(&self, tier: AccessTier, kind: IndexKind, message: impl Into<String>) {
		lock(&self.failures).insert((tier, kind), message.into());
	}

	/// Simulates a tier whose collections were never created.
	pub fn drop_tier(&self, tier: AccessTier) {
		for kind in [IndexKind::Summaries, IndexKind::Questions, IndexKind::Chunks] {
			self.fail(tier, kind, format!("Not found: Collection `{}` doesn't exist!", kind.as_str()));
		}
	}

	pub fn queries(&self) -> Vec<RecordedQuery> {
		lock(&self.queries).clone()
	}

	pub fn queries_for(&self, kind: IndexKind) -> Vec<RecordedQuery> {
		self.queries().into_iter().filter(|query| query.kind == kind).collect()
	}

	/// Points written through [`DocumentIndex::upsert`], in first-write order.
	pub fn written(&self, tier: AccessTier, kind: IndexKind) -> Vec<IndexPoint> {
		lock(&self.written).get(&(tier, kind)).cloned().unwrap_or_default()
	}

	fn failure(&self, tier: AccessTier, kind: IndexKind) -> Result<(), IndexError> {
		match lock(&self.failures).get(&(tier, kind)) {
			Some(message) => Err(IndexError { message: message.clone() }),
			None => Ok(()),
		}
	}

	fn search(&self, query: &IndexQuery<'_>) -> Result<Vec<ScoredMatch>, IndexError> {
		lock(&self.queries).push(RecordedQuery {
			tier: query.tier,
			kind: query.kind,
			top_k: query.top_k,
			filter: query.filter.cloned(),
		});

		self.failure(query.tier, query.kind)?;

		let written: Vec<ScoredMatch> = lock(&self.written)
			.get(&(query.tier, query.kind))
			.into_iter()
			.flatten()
			.map(|point| ScoredMatch {
				score: point.vector.iter().zip(query.vector).map(|(a, b)| a * b).sum(),
				metadata: point.metadata.clone(),
			})
			.collect();
		let points = lock(&self.points);
		let mut hits: Vec<ScoredMatch> = points
			.get(&(query.tier, query.kind))
			.into_iter()
			.flatten()
			.cloned()
			.chain(written)
			.filter(|hit| query.filter.is_none_or(|filter| filter.matches(&hit.metadata)))
			.collect();

		hits.sort_by(|a, b| b.score.total_cmp(&a.score));
		hits.truncate(query.top_k as usize);

		Ok(hits)
	}
}
impl DocumentIndex for MemoryIndex {
	fn query<'a>(
		&'a self,
		query: IndexQuery<'a>,
	) -> BoxFuture<'a, Result<Vec<ScoredMatch>, IndexError>> {
		Box::pin(async move { self.search(&query) })
	}

	fn ensure_index<'a>(
		&'a self,
		tier: AccessTier,
		kind: IndexKind,
	) -> BoxFuture<'a, Result<bool, IndexError>> {
		Box::pin(async move {
			self.failure(tier, kind)?;

			Ok(lock(&self.created).insert((tier, kind)))
		})
	}

	fn upsert<'a>(
		&'a self,
		tier: AccessTier,
		kind: IndexKind,
		points: Vec<IndexPoint>,
	) -> BoxFuture<'a, Result<(), IndexError>> {
		Box::pin(async move {
			self.failure(tier, kind)?;

			let mut written = lock(&self.written);
			let stored = written.entry((tier, kind)).or_default();

			for point in points {
				match stored.iter_mut().find(|existing| existing.key == point.key) {
					Some(existing) => *existing = point,
					None => stored.push(point),
				}
			}

			Ok(())
		})
	}
}

/// Returns the same unit-ish vector for every input.
pub struct FixedEmbedding {
	dim: u32,
	calls: AtomicUsize,
}
impl FixedEmbedding {
	pub fn new(dim: u32) -> Self {
		Self { dim, calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, docqa_service::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let vectors: Vec<Vec<f32>> = texts.iter().map(|_| vec![0.5; self.dim as usize]).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Answers with the question and the numbered source names it was given.
#[derive(Default)]
pub struct EchoGeneration {
	calls: AtomicUsize,
	fail_with: Option<String>,
}
impl EchoGeneration {
	pub fn failing(message: impl Into<String>) -> Self {
		Self { calls: AtomicUsize::new(0), fail_with: Some(message.into()) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl GenerationProvider for EchoGeneration {
	fn generate<'a>(
		&'a self,
		_: &'a GenerationProviderConfig,
		question: &'a str,
		evidence: &'a [EvidenceBlock],
	) -> BoxFuture<'a, docqa_service::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			if let Some(message) = &self.fail_with {
				return Err(docqa_service::Error::Upstream { message: message.clone() });
			}

			let sources = evidence
				.iter()
				.enumerate()
				.map(|(idx, block)| {
					format!("[{}] {}", idx + 1, block.name.as_deref().unwrap_or("untitled"))
				})
				.collect::<Vec<_>>()
				.join(", ");

			Ok(format!("{question} => {sources}"))
		})
	}
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}
