use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use docqa_domain::index::AccessTier;
use docqa_service::{AnswerResponse, Error as ServiceError, RetrieveRequest, RetrieveResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/retrieve", post(retrieve))
		.route("/api/answer", post(answer))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn retrieve(
	State(state): State<AppState>,
	Json(payload): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
	let response = state.service.retrieve(payload).await.map_err(|err| state.api_error(err))?;

	Ok(Json(response))
}

async fn answer(
	State(state): State<AppState>,
	Json(payload): Json<RetrieveRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
	let response = state.service.answer(payload).await.map_err(|err| state.api_error(err))?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	tier: Option<AccessTier>,
	#[serde(skip_serializing_if = "Option::is_none")]
	contact_email: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	body: ErrorBody,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self {
			status,
			body: ErrorBody { error_code, message: message.into(), tier: None, contact_email: None },
		}
	}

	/// Maps a service error; only tier errors carry the contact address.
	pub fn from_service(err: ServiceError, contact_email: &str) -> Self {
		match err {
			ServiceError::MissingQuestion =>
				Self::new(StatusCode::BAD_REQUEST, "missing_question", err.to_string()),
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::AccessTierUnavailable { tier } => {
				let message = err.remediation().map(str::to_string).unwrap_or_else(|| err.to_string());
				let mut api = Self::new(StatusCode::BAD_REQUEST, "access_tier_unavailable", message);

				api.body.tier = Some(tier);
				api.body.contact_email = Some(contact_email.to_string());

				api
			},
			ServiceError::Upstream { message } => {
				tracing::error!(error = %message, "Request failed upstream.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal error.")
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(self.body)).into_response()
	}
}

impl AppState {
	fn api_error(&self, err: ServiceError) -> ApiError {
		ApiError::from_service(err, &self.service.cfg.service.contact_email)
	}
}
