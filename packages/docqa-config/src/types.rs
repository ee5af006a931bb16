use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub ingest: Ingest,
	#[serde(default)]
	pub scope: Scope,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Address users are pointed at when an access tier has no indexes yet.
	pub contact_email: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	#[serde(default)]
	pub api_key: Option<String>,
	pub vector_dim: u32,
	pub standard: IndexSet,
	pub elevated: IndexSet,
}

/// The three collections backing one access tier.
#[derive(Clone, Debug, Deserialize)]
pub struct IndexSet {
	pub summaries: IndexRef,
	pub questions: IndexRef,
	pub chunks: IndexRef,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IndexRef {
	pub collection: String,
	/// Payload key holding the parent document identifier.
	pub id_field: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub generation: GenerationProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default)]
	pub max_tokens: Option<u32>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub default_top_k: u32,
	pub max_top_k: u32,
	/// Chunk-index fan-out relative to `top_k`; documents own many chunks.
	pub chunk_query_multiplier: u32,
	/// Candidate passages fetched per document before picking the best one.
	pub evidence_candidates: u32,
	pub broaden_on_empty: bool,
	pub broaden_multiplier: u32,
	pub fusion: Fusion,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			default_top_k: 50,
			max_top_k: 200,
			chunk_query_multiplier: 3,
			evidence_candidates: 3,
			broaden_on_empty: false,
			broaden_multiplier: 5,
			fusion: Fusion::default(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Fusion {
	pub summary_weight: f32,
	pub question_weight: f32,
	pub chunk_weight: f32,
	pub boost_base: f32,
	pub boost_per_source: f32,
	pub boost_min_sources: u32,
}
impl Default for Fusion {
	fn default() -> Self {
		Self {
			summary_weight: 0.3,
			question_weight: 0.3,
			chunk_weight: 0.4,
			boost_base: 1.1,
			boost_per_source: 0.1,
			boost_min_sources: 2,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ingest {
	/// Texts per embedding request.
	pub embed_batch: usize,
	/// Points per upsert request.
	pub upsert_batch: usize,
	/// Records whose indexed text exceeds this many UTF-8 bytes are skipped.
	pub max_record_bytes: usize,
}
impl Default for Ingest {
	fn default() -> Self {
		Self { embed_batch: 128, upsert_batch: 200, max_record_bytes: 3_500_000 }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scope {
	pub enabled: bool,
	pub keywords: Vec<String>,
}
