use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Visibility level; each tier is served by its own set of indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
	Standard,
	Elevated,
}
impl AccessTier {
	pub fn from_private_flag(is_private: bool) -> Self {
		if is_private { Self::Elevated } else { Self::Standard }
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Standard => "standard",
			Self::Elevated => "elevated",
		}
	}
}
impl Display for AccessTier {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
	/// One generated abstract per document.
	Summaries,
	/// Synthetic questions each document answers.
	Questions,
	/// Raw text passages.
	Chunks,
}
impl IndexKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Summaries => "summaries",
			Self::Questions => "questions",
			Self::Chunks => "chunks",
		}
	}
}

/// One nearest-neighbor hit as returned by a vector index.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredMatch {
	pub score: f32,
	pub metadata: Map<String, Value>,
}

/// A record to write into a vector index.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexPoint {
	/// Stable record key such as `{doc}::chunk::{i}`; rewriting a key replaces the record.
	pub key: String,
	pub vector: Vec<f32>,
	pub metadata: Map<String, Value>,
}
