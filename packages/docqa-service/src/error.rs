use docqa_domain::index::AccessTier;

use crate::index::IndexError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Question is required.")]
	MissingQuestion,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Document indexes for the {tier} access tier are not available.")]
	AccessTierUnavailable { tier: AccessTier },
	#[error("Upstream error: {message}")]
	Upstream { message: String },
}
impl Error {
	/// Index failures that name a missing collection mean the tier is not provisioned yet.
	pub fn from_index(err: IndexError, tier: AccessTier) -> Self {
		if docqa_storage::qdrant::is_not_found(&err.message) {
			return Self::AccessTierUnavailable { tier };
		}

		Self::Upstream { message: err.message }
	}

	/// User-facing remediation text for recoverable errors.
	pub fn remediation(&self) -> Option<&'static str> {
		match self {
			Self::AccessTierUnavailable { tier: AccessTier::Standard } => Some(
				"Document search is not yet available. Please contact the administrator.",
			),
			Self::AccessTierUnavailable { tier: AccessTier::Elevated } => Some(
				"Private document search is not implemented yet. Please contact the administrator.",
			),
			_ => None,
		}
	}
}

impl From<docqa_providers::Error> for Error {
	fn from(err: docqa_providers::Error) -> Self {
		Self::Upstream { message: err.to_string() }
	}
}

impl From<tokio::task::JoinError> for Error {
	fn from(err: tokio::task::JoinError) -> Self {
		Self::Upstream { message: format!("Evidence lookup task failed: {err}") }
	}
}
