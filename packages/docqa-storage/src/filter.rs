//! Translation of [`MetadataPredicate`] into Qdrant payload filters.

use qdrant_client::qdrant::{Condition, Filter};

use docqa_domain::filter::MetadataPredicate;

pub fn to_qdrant_filter(predicate: &MetadataPredicate) -> Filter {
	match predicate {
		MetadataPredicate::And(args) => Filter::must(args.iter().map(to_condition)),
		MetadataPredicate::Or(args) => Filter::should(args.iter().map(to_condition)),
		MetadataPredicate::Ne { field, value } =>
			Filter::must_not([Condition::matches(field.as_str(), value.clone())]),
		predicate => Filter::must([to_condition(predicate)]),
	}
}

fn to_condition(predicate: &MetadataPredicate) -> Condition {
	match predicate {
		MetadataPredicate::In { field, values } => Condition::matches(field.as_str(), values.clone()),
		MetadataPredicate::Eq { field, value } => Condition::matches(field.as_str(), value.clone()),
		nested => Condition::from(to_qdrant_filter(nested)),
	}
}
