use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use tracing_subscriber::EnvFilter;

use docqa_domain::index::AccessTier;
use docqa_service::{DocQaService, IngestDocument};
use docqa_storage::qdrant::QdrantStore;

#[derive(Debug, Parser)]
#[command(
	version = docqa_cli::VERSION,
	rename_all = "kebab",
	styles = docqa_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON array of documents with `id`, `metadata`, `summary`, `questions` and `chunks`.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
	/// Write into the elevated tier instead of the standard one.
	#[arg(long)]
	pub private: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = docqa_config::load(&args.config)?;

	init_tracing(&config);

	let documents = load_documents(&args.input)?;
	let qdrant = QdrantStore::new(&config.storage.qdrant)?;
	let service = DocQaService::new(config, qdrant);
	let report = service.ingest(AccessTier::from_private_flag(args.private), &documents).await?;

	tracing::info!(
		questions = report.questions.uploaded,
		summaries = report.summaries.uploaded,
		chunks = report.chunks.uploaded,
		"Documents indexed."
	);

	Ok(())
}

pub fn load_documents(path: &Path) -> color_eyre::Result<Vec<IngestDocument>> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read documents at {path:?}."))?;

	serde_json::from_str(&raw).wrap_err_with(|| format!("Failed to parse documents at {path:?}."))
}

fn init_tracing(config: &docqa_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
