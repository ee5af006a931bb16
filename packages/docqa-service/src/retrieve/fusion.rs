use std::{cmp::Ordering, collections::HashMap};

use docqa_config::Fusion;
use docqa_domain::{index::ScoredMatch, metadata::MatchMetadata};

use super::{RankedDocument, SourceMatches};

/// Chunk payloads written by older ingestion runs used these keys for the parent document.
const FALLBACK_ID_FIELDS: [&str; 2] = ["doc_id", "id"];

/// Payload keys that name the parent document in each index.
#[derive(Clone, Copy, Debug)]
pub struct SourceIdFields<'a> {
	pub summaries: &'a str,
	pub questions: &'a str,
	pub chunks: &'a str,
}

#[derive(Clone, Copy)]
enum Source {
	Summary,
	Question,
	Chunk,
}

#[derive(Default)]
struct ScoreRecord {
	id: String,
	summary: Option<f32>,
	question: Option<f32>,
	chunk: Option<f32>,
	name: Option<String>,
	year: Option<String>,
	link: Option<String>,
	num_questions: u32,
}
impl ScoreRecord {
	fn observe(&mut self, source: Source, hit: &ScoredMatch) {
		let slot = match source {
			Source::Summary => &mut self.summary,
			Source::Question => &mut self.question,
			Source::Chunk => &mut self.chunk,
		};

		*slot = Some(slot.map_or(hit.score, |current| current.max(hit.score)));

		let view = MatchMetadata::new(&hit.metadata);

		if self.name.is_none() {
			self.name = view.name();
		}
		if self.year.is_none() {
			self.year = view.year();
		}
		if self.link.is_none() {
			self.link = view.link();
		}
		if let Source::Question = source {
			self.num_questions = self.num_questions.max(view.num_questions().unwrap_or(0));
		}
	}

	fn into_ranked(self, chunk_id_field: &str, cfg: &Fusion) -> RankedDocument {
		let summary_score = self.summary.unwrap_or(0.0);
		let question_score = self.question.unwrap_or(0.0);
		let chunk_score = self.chunk.unwrap_or(0.0);
		let source_count =
			[summary_score, question_score, chunk_score].iter().filter(|score| **score != 0.0).count()
				as u32;
		let mut hybrid_score = cfg.summary_weight * summary_score
			+ cfg.question_weight * question_score
			+ cfg.chunk_weight * chunk_score;

		if source_count >= cfg.boost_min_sources {
			hybrid_score *= cfg.boost_base + cfg.boost_per_source * source_count as f32;
		}

		RankedDocument {
			id: self.id,
			id_field: chunk_id_field.to_string(),
			hybrid_score,
			summary_score,
			question_score,
			chunk_score,
			name: self.name,
			year: self.year,
			link: self.link,
			num_questions: self.num_questions,
		}
	}
}

/// Insertion-ordered score table keyed by document id.
#[derive(Default)]
struct ScoreTable {
	records: Vec<ScoreRecord>,
	positions: HashMap<String, usize>,
}
impl ScoreTable {
	fn fold(&mut self, source: Source, hits: &[ScoredMatch], id_field: &str) {
		for hit in hits {
			let Some(id) = MatchMetadata::new(&hit.metadata).document_id(id_field) else {
				tracing::warn!(id_field, "Index match is missing its document id.");

				continue;
			};
			let position = match self.positions.get(&id) {
				Some(position) => *position,
				None => {
					self.records.push(ScoreRecord { id: id.clone(), ..Default::default() });
					self.positions.insert(id, self.records.len() - 1);

					self.records.len() - 1
				},
			};

			self.records[position].observe(source, hit);
		}
	}
}

/// Merges the three match lists into at most `top_k` documents ordered by hybrid score.
///
/// Ties keep first-seen order. When nothing fuses but chunk hits exist, the chunk hits
/// alone seed the ranking.
pub fn fuse(
	matches: &SourceMatches,
	id_fields: &SourceIdFields<'_>,
	cfg: &Fusion,
	top_k: usize,
) -> Vec<RankedDocument> {
	let mut table = ScoreTable::default();

	table.fold(Source::Summary, &matches.summaries, id_fields.summaries);
	table.fold(Source::Question, &matches.questions, id_fields.questions);
	table.fold(Source::Chunk, &matches.chunks, id_fields.chunks);

	let mut ranked: Vec<RankedDocument> = table
		.records
		.into_iter()
		.map(|record| record.into_ranked(id_fields.chunks, cfg))
		.collect();

	ranked.sort_by(|a, b| cmp_f32_desc(a.hybrid_score, b.hybrid_score));
	ranked.truncate(top_k);

	if ranked.is_empty() && !matches.chunks.is_empty() {
		tracing::info!(chunks = matches.chunks.len(), "Fusion was empty; ranking from chunk hits.");

		return chunk_fallback(&matches.chunks, id_fields.chunks, top_k);
	}

	ranked
}

fn chunk_fallback(chunks: &[ScoredMatch], id_field: &str, top_k: usize) -> Vec<RankedDocument> {
	let mut out: Vec<RankedDocument> = Vec::new();

	for hit in chunks {
		if out.len() >= top_k {
			break;
		}

		let view = MatchMetadata::new(&hit.metadata);
		let Some((key, id)) = std::iter::once(id_field)
			.chain(FALLBACK_ID_FIELDS)
			.find_map(|key| view.document_id(key).map(|id| (key, id)))
		else {
			continue;
		};

		if out.iter().any(|doc| doc.id == id) {
			continue;
		}

		out.push(RankedDocument {
			id,
			id_field: key.to_string(),
			hybrid_score: 0.0,
			summary_score: 0.0,
			question_score: 0.0,
			chunk_score: hit.score,
			name: view.name(),
			year: view.year(),
			link: view.link(),
			num_questions: 0,
		});
	}

	out
}

/// Descending order with NaN sorted last.
pub(crate) fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
