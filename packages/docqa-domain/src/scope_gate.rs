//! Decides whether a question concerns the indexed corpus at all.

use unicode_segmentation::UnicodeSegmentation;

/// Longest suffix tolerated after a single-word keyword ("event" matches "events").
const MAX_INFLECTION_CHARS: usize = 2;

pub trait ScopeGate
where
	Self: Send + Sync,
{
	fn is_in_scope(&self, question: &str) -> bool;
}

/// Admits every question.
pub struct OpenScopeGate;
impl ScopeGate for OpenScopeGate {
	fn is_in_scope(&self, _question: &str) -> bool {
		true
	}
}

pub struct KeywordScopeGate {
	enabled: bool,
	words: Vec<String>,
	phrases: Vec<Vec<String>>,
}
impl KeywordScopeGate {
	pub fn new(cfg: &docqa_config::Scope) -> Self {
		let mut words = Vec::new();
		let mut phrases = Vec::new();

		for keyword in &cfg.keywords {
			let parts = tokenize(keyword);

			match parts.len() {
				0 => {},
				1 => words.extend(parts),
				_ => phrases.push(parts),
			}
		}

		Self { enabled: cfg.enabled, words, phrases }
	}
}
impl ScopeGate for KeywordScopeGate {
	fn is_in_scope(&self, question: &str) -> bool {
		if !self.enabled {
			return true;
		}

		let tokens = tokenize(question);

		if tokens.iter().any(|token| self.words.iter().any(|word| word_matches(token, word))) {
			return true;
		}

		self.phrases.iter().any(|phrase| {
			tokens.windows(phrase.len()).any(|window| {
				window.iter().zip(phrase.iter()).all(|(token, word)| word_matches(token, word))
			})
		})
	}
}

fn tokenize(text: &str) -> Vec<String> {
	text.unicode_words().map(str::to_lowercase).collect()
}

fn word_matches(token: &str, keyword: &str) -> bool {
	match token.strip_prefix(keyword) {
		Some(rest) => rest.chars().count() <= MAX_INFLECTION_CHARS,
		None => false,
	}
}
