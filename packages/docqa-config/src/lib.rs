mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Fusion, GenerationProviderConfig, IndexRef, IndexSet, Ingest,
	Providers, Qdrant, Retrieval, Scope, Service, Storage,
};

use std::{fs, net::SocketAddr, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::InvalidBind {
			field: "service.http_bind",
			value: cfg.service.http_bind.clone(),
		});
	}
	if cfg.service.contact_email.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.contact_email must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	for (tier, set) in
		[("standard", &cfg.storage.qdrant.standard), ("elevated", &cfg.storage.qdrant.elevated)]
	{
		for (kind, index) in
			[("summaries", &set.summaries), ("questions", &set.questions), ("chunks", &set.chunks)]
		{
			if index.collection.trim().is_empty() {
				return Err(Error::Validation {
					message: format!("storage.qdrant.{tier}.{kind}.collection must be non-empty."),
				});
			}
			if index.id_field.trim().is_empty() {
				return Err(Error::Validation {
					message: format!("storage.qdrant.{tier}.{kind}.id_field must be non-empty."),
				});
			}
		}
	}

	let retrieval = &cfg.retrieval;

	if retrieval.max_top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.max_top_k must be greater than zero.".to_string(),
		});
	}
	if retrieval.default_top_k == 0 || retrieval.default_top_k > retrieval.max_top_k {
		return Err(Error::Validation {
			message: "retrieval.default_top_k must be between 1 and retrieval.max_top_k."
				.to_string(),
		});
	}

	for (label, value) in [
		("retrieval.chunk_query_multiplier", retrieval.chunk_query_multiplier),
		("retrieval.evidence_candidates", retrieval.evidence_candidates),
		("retrieval.broaden_multiplier", retrieval.broaden_multiplier),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	let fusion = &retrieval.fusion;

	for (label, value) in [
		("retrieval.fusion.summary_weight", fusion.summary_weight),
		("retrieval.fusion.question_weight", fusion.question_weight),
		("retrieval.fusion.chunk_weight", fusion.chunk_weight),
		("retrieval.fusion.boost_base", fusion.boost_base),
		("retrieval.fusion.boost_per_source", fusion.boost_per_source),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if value < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	for (label, value) in [
		("ingest.embed_batch", cfg.ingest.embed_batch),
		("ingest.upsert_batch", cfg.ingest.upsert_batch),
		("ingest.max_record_bytes", cfg.ingest.max_record_bytes),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("generation", &cfg.providers.generation.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.scope.enabled && cfg.scope.keywords.is_empty() {
		return Err(Error::Validation {
			message: "scope.keywords must be non-empty when scope.enabled is true.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.storage.qdrant.api_key = None;
	}

	let mut keywords = Vec::with_capacity(cfg.scope.keywords.len());

	for keyword in cfg.scope.keywords.drain(..) {
		let keyword = keyword.trim().to_lowercase();

		if !keyword.is_empty() && !keywords.contains(&keyword) {
			keywords.push(keyword);
		}
	}

	cfg.scope.keywords = keywords;
}
