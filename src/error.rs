use axum::{
	body::Body,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{dataset, langflow};

/// Error type for the application.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information. Module errors decide their own client-facing
/// messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("invalid request body")]
	Body(axum_jsonschema::JsonSchemaRejection),
	#[error("flow error: {0}")]
	Flow(#[from] langflow::Error),
	#[error("dataset error: {0}")]
	Dataset(#[from] dataset::Error),
}

impl From<axum_jsonschema::JsonSchemaRejection> for Error {
	fn from(rejection: axum_jsonschema::JsonSchemaRejection) -> Self {
		Self::Body(rejection)
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
	pub success: bool,
	pub errors: Vec<String>,
}

impl ErrorResponse {
	fn new(errors: Vec<String>) -> Self {
		Self {
			success: false,
			errors,
		}
	}
}

impl aide::OperationOutput for Error {
	type Inner = ErrorResponse;
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		match self {
			Error::Validation(errors) => (
				StatusCode::BAD_REQUEST,
				Json(ErrorResponse::new(
					errors
						.field_errors()
						.into_iter()
						.flat_map(move |(field, errors)| {
							errors.iter().map(move |error| format!("{field}: {error}"))
						})
						.collect(),
				)),
			)
				.into_response(),
			Error::Body(rejection) => rejection.into_response(),
			Error::Flow(error) => {
				if error.status().is_server_error() {
					tracing::error!(%error, "flow invocation failed");
				}

				(
					error.status(),
					Json(ErrorResponse::new(vec![error.message()])),
				)
					.into_response()
			}
			Error::Dataset(error) => {
				tracing::warn!(%error, "dataset rejected");

				(
					error.status(),
					Json(ErrorResponse::new(vec![error.message()])),
				)
					.into_response()
			}
		}
	}
}
