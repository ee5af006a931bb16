use std::sync::Arc;

use docqa_service::DocQaService;
use docqa_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DocQaService>,
}
impl AppState {
	pub fn new(config: docqa_config::Config) -> color_eyre::Result<Self> {
		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let service = DocQaService::new(config, qdrant);

		Ok(Self::with_service(service))
	}

	pub fn with_service(service: DocQaService) -> Self {
		Self { service: Arc::new(service) }
	}
}
