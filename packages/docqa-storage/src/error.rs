#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Collection {collection} was not found.")]
	CollectionNotFound { collection: String, message: String },
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
