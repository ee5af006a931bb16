use unicode_normalization::UnicodeNormalization;

/// NFKC-normalizes the question and collapses whitespace runs; blank input yields `None`.
pub fn normalize_question(raw: &str) -> Option<String> {
	let normalized: String = raw.nfkc().collect();
	let mut out = String::with_capacity(normalized.len());

	for part in normalized.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}

		out.push_str(part);
	}

	if out.is_empty() { None } else { Some(out) }
}
