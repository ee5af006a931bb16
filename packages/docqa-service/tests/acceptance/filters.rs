use docqa_domain::{
	filter::DataTypeCategory,
	index::{AccessTier, IndexKind},
};
use docqa_service::RetrieveRequest;

use super::{
	BOARD_QUESTION, assert_used_documents_consistent, document_ids, harness, request, seed_corpus,
	test_config,
};

#[tokio::test]
async fn year_filter_keeps_matching_documents() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(RetrieveRequest {
			selected_years: vec!["2022".to_string()],
			..request(BOARD_QUESTION)
		})
		.await
		.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["b"]);
	assert_eq!(response.years, ["2022"]);
	assert_used_documents_consistent(&response);
}

#[tokio::test]
async fn excel_filter_keeps_spreadsheets() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(RetrieveRequest {
			selected_data_types: vec![DataTypeCategory::Excel],
			..request(BOARD_QUESTION)
		})
		.await
		.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["b"]);
}

#[tokio::test]
async fn documents_filter_excludes_spreadsheets() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(RetrieveRequest {
			selected_data_types: vec![DataTypeCategory::Documents],
			..request(BOARD_QUESTION)
		})
		.await
		.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["a", "d"]);
	assert_used_documents_consistent(&response);
}

#[tokio::test]
async fn both_categories_apply_no_type_filter() {
	let h = harness(test_config());

	seed_corpus(&h.index, AccessTier::Standard);

	let response = h
		.service
		.retrieve(RetrieveRequest {
			selected_data_types: vec![DataTypeCategory::Documents, DataTypeCategory::Excel],
			..request(BOARD_QUESTION)
		})
		.await
		.expect("Retrieval failed.");

	assert_eq!(document_ids(&response), ["a", "b", "d"]);
	assert!(h.index.queries_for(IndexKind::Summaries).iter().all(|query| query.filter.is_none()));
}
