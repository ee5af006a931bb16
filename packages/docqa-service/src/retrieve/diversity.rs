use std::collections::{HashMap, VecDeque};

use super::EvidenceItem;

/// Emits evidence round-robin across documents so early documents cannot starve later ones.
///
/// Groups keep the order in which their document first appears.
pub fn interleave_by_document(evidence: Vec<EvidenceItem>, limit: usize) -> Vec<EvidenceItem> {
	let mut groups: Vec<VecDeque<EvidenceItem>> = Vec::new();
	let mut positions: HashMap<String, usize> = HashMap::new();

	for item in evidence {
		match positions.get(&item.document_id) {
			Some(position) => groups[*position].push_back(item),
			None => {
				positions.insert(item.document_id.clone(), groups.len());
				groups.push(VecDeque::from([item]));
			},
		}
	}

	let mut out = Vec::with_capacity(limit.min(groups.iter().map(VecDeque::len).sum()));

	while out.len() < limit {
		let mut emitted = false;

		for group in &mut groups {
			if out.len() >= limit {
				break;
			}
			if let Some(item) = group.pop_front() {
				out.push(item);

				emitted = true;
			}
		}

		if !emitted {
			break;
		}
	}

	out
}
