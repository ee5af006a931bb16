//! Metadata predicates over indexed documents and the year/type filter builder.
//!
//! A [`MetadataPredicate`] is backend-neutral. Storage layers translate it into their own
//! filter language; [`MetadataPredicate::to_value`] renders the `$in`/`$ne`/`$and`/`$or`
//! operator form, and [`MetadataPredicate::matches`] evaluates it in process.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const YEAR_FIELD: &str = "year";
pub const MIME_TYPE_FIELD: &str = "mimeType";
pub const SPREADSHEET_MIME_TYPES: [&str; 2] = [
	"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
	"application/vnd.google-apps.spreadsheet",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataTypeCategory {
	Documents,
	Excel,
	All,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetadataPredicate {
	In { field: String, values: Vec<String> },
	Eq { field: String, value: String },
	Ne { field: String, value: String },
	And(Vec<MetadataPredicate>),
	Or(Vec<MetadataPredicate>),
}
impl MetadataPredicate {
	pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Eq { field: field.into(), value: value.into() }
	}

	pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Ne { field: field.into(), value: value.into() }
	}

	/// Conjoins with an optional outer predicate, flattening nested conjunctions.
	pub fn and_with(self, other: Option<&MetadataPredicate>) -> Self {
		let Some(other) = other else { return self };
		let mut args = Vec::new();

		for predicate in [self, other.clone()] {
			match predicate {
				Self::And(inner) => args.extend(inner),
				predicate => args.push(predicate),
			}
		}

		Self::And(args)
	}

	pub fn to_value(&self) -> Value {
		match self {
			Self::In { field, values } => serde_json::json!({ field: { "$in": values } }),
			Self::Eq { field, value } => serde_json::json!({ field: { "$eq": value } }),
			Self::Ne { field, value } => serde_json::json!({ field: { "$ne": value } }),
			Self::And(args) => {
				serde_json::json!({ "$and": args.iter().map(Self::to_value).collect::<Vec<_>>() })
			},
			Self::Or(args) => {
				serde_json::json!({ "$or": args.iter().map(Self::to_value).collect::<Vec<_>>() })
			},
		}
	}

	pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
		match self {
			Self::In { field, values } => field_text(metadata, field)
				.is_some_and(|text| values.iter().any(|value| value == text)),
			Self::Eq { field, value } => field_text(metadata, field) == Some(value.as_str()),
			// Records without a string value for the field are not equal to anything.
			Self::Ne { field, value } => field_text(metadata, field) != Some(value.as_str()),
			Self::And(args) => args.iter().all(|arg| arg.matches(metadata)),
			Self::Or(args) => args.iter().any(|arg| arg.matches(metadata)),
		}
	}
}

/// Builds the index filter for the selected years and data types.
///
/// Returns `None` when nothing needs filtering, never a predicate that matches nothing.
pub fn build_filter(
	years: &[String],
	categories: &[DataTypeCategory],
) -> Option<MetadataPredicate> {
	let year = year_predicate(years);
	let data_type = data_type_predicate(categories);

	match (year, data_type) {
		(Some(year), Some(data_type)) => Some(MetadataPredicate::And(vec![year, data_type])),
		(year, data_type) => year.or(data_type),
	}
}

fn year_predicate(years: &[String]) -> Option<MetadataPredicate> {
	let mut values: Vec<String> = Vec::with_capacity(years.len());

	for year in years {
		let year = year.trim();

		if !year.is_empty() && !values.iter().any(|value| value == year) {
			values.push(year.to_string());
		}
	}

	if values.is_empty() {
		return None;
	}

	Some(MetadataPredicate::In { field: YEAR_FIELD.to_string(), values })
}

fn data_type_predicate(categories: &[DataTypeCategory]) -> Option<MetadataPredicate> {
	if categories.is_empty() || categories.contains(&DataTypeCategory::All) {
		return None;
	}

	let documents = categories.contains(&DataTypeCategory::Documents);
	let excel = categories.contains(&DataTypeCategory::Excel);

	match (documents, excel) {
		(true, false) => Some(MetadataPredicate::And(
			SPREADSHEET_MIME_TYPES
				.iter()
				.map(|mime| MetadataPredicate::ne(MIME_TYPE_FIELD, *mime))
				.collect(),
		)),
		(false, true) => Some(MetadataPredicate::Or(
			SPREADSHEET_MIME_TYPES
				.iter()
				.map(|mime| MetadataPredicate::eq(MIME_TYPE_FIELD, *mime))
				.collect(),
		)),
		_ => None,
	}
}

/// Keyword view of a payload field; non-string values never match, as in the vector store.
fn field_text<'a>(metadata: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
	metadata.get(field)?.as_str()
}
