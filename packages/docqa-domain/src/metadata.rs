//! Typed view over the loosely-typed payload attached to index matches.

use serde_json::{Map, Value};

pub const TEXT_FIELD: &str = "text";
pub const NUM_QUESTIONS_FIELD: &str = "num_questions";
/// Link candidates in resolution order: explicit URL, drive aliases, generic link.
pub const LINK_FIELDS: [&str; 6] =
	["url", "drive_url", "google_drive_url", "webViewLink", "drive_link", "link"];
const NAME_FIELDS: [&str; 3] = ["name", "file_name", "title"];

#[derive(Clone, Copy, Debug)]
pub struct MatchMetadata<'a> {
	raw: &'a Map<String, Value>,
}
impl<'a> MatchMetadata<'a> {
	pub fn new(raw: &'a Map<String, Value>) -> Self {
		Self { raw }
	}

	/// First non-empty value among `keys`.
	pub fn first_text(&self, keys: &[&str]) -> Option<String> {
		keys.iter().find_map(|key| self.raw.get(*key).and_then(value_text))
	}

	pub fn document_id(&self, id_field: &str) -> Option<String> {
		self.first_text(&[id_field])
	}

	pub fn name(&self) -> Option<String> {
		self.first_text(&NAME_FIELDS)
	}

	pub fn year(&self) -> Option<String> {
		self.first_text(&[crate::filter::YEAR_FIELD])
	}

	pub fn link(&self) -> Option<String> {
		self.first_text(&LINK_FIELDS)
	}

	pub fn text(&self) -> Option<&'a str> {
		self.raw
			.get(TEXT_FIELD)
			.and_then(Value::as_str)
			.map(str::trim)
			.filter(|text| !text.is_empty())
	}

	pub fn num_questions(&self) -> Option<u32> {
		match self.raw.get(NUM_QUESTIONS_FIELD)? {
			Value::Number(number) => number
				.as_u64()
				.or_else(|| number.as_f64().filter(|value| *value >= 0.0).map(|value| value as u64))
				.and_then(|value| u32::try_from(value).ok()),
			Value::String(text) => text.trim().parse().ok(),
			_ => None,
		}
	}
}

/// Renders scalar payload values as text; `null`, empty strings and containers yield `None`.
pub fn value_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) => {
			let text = text.trim();

			(!text.is_empty()).then(|| text.to_string())
		},
		Value::Number(number) => Some(match number.as_f64() {
			Some(value) if value.fract() == 0.0 && number.is_f64() => (value as i64).to_string(),
			_ => number.to_string(),
		}),
		Value::Bool(flag) => Some(flag.to_string()),
		_ => None,
	}
}
