use std::collections::HashSet;

use super::{EvidenceItem, RankedDocument, fusion::cmp_f32_desc};

/// Restricts the ranked documents to those backed by evidence, and the evidence to those documents.
///
/// Returns the used documents ordered by hybrid score together with the surviving evidence.
pub fn assemble(
	ranked: &[RankedDocument],
	evidence: Vec<EvidenceItem>,
) -> (Vec<RankedDocument>, Vec<EvidenceItem>) {
	let mut seen = HashSet::new();
	let mut used = Vec::new();

	for item in &evidence {
		if !seen.insert(item.document_id.as_str()) {
			continue;
		}

		match ranked.iter().find(|doc| doc.id == item.document_id) {
			Some(doc) => used.push(doc.clone()),
			None => tracing::warn!(document_id = %item.document_id, "Evidence has no ranked document."),
		}
	}

	used.sort_by(|a, b| cmp_f32_desc(a.hybrid_score, b.hybrid_score));

	let used_ids: HashSet<&str> = used.iter().map(|doc| doc.id.as_str()).collect();
	let total = evidence.len();
	let evidence: Vec<EvidenceItem> =
		evidence.into_iter().filter(|item| used_ids.contains(item.document_id.as_str())).collect();

	if evidence.len() != total {
		tracing::warn!(dropped = total - evidence.len(), "Dropped evidence without a used document.");
	}

	(used, evidence)
}
