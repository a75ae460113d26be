use std::sync::Arc;

use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{
	config::Config,
	extract::Json,
	langflow::{self, FlowRequest, IoType},
	openapi::tag,
	AppState, Error,
};

use super::model;

pub fn get_defaults_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get form defaults")
		.description("Returns the initial values for the flow form.")
		.tag(tag::FLOW)
}

/// Returns the initial values for the flow form.
pub async fn get_defaults(State(config): State<Arc<Config>>) -> Json<model::FlowDefaults> {
	Json(model::FlowDefaults {
		endpoint: config.flow_id.clone(),
		io_types: IoType::ALL.to_vec(),
		has_token: config.application_token.is_some(),
		tweaks: serde_json::to_string_pretty(&langflow::default_tweaks()).unwrap_or_default(),
	})
}

pub fn run_flow_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Run flow")
		.description(
			"Sends one message to the configured flow and returns the reply text. \
			Replies without text return a fixed fallback string.",
		)
		.tag(tag::FLOW)
}

/// Sends one message to the flow and returns the reply text.
pub async fn run_flow(
	State(state): State<AppState>,
	Json(input): Json<model::RunFlowInput>,
) -> Result<Json<model::RunFlowOutput>, Error> {
	let config = &state.config;

	let endpoint = input
		.endpoint
		.or_else(|| config.flow_id.clone())
		.ok_or(langflow::Error::MissingEndpoint)?;
	let tweaks = match input.tweaks.as_deref() {
		Some(text) => langflow::parse_tweaks(text)?,
		None => Some(langflow::default_tweaks()),
	};
	let token = input
		.application_token
		.or_else(|| config.application_token.clone());

	let request = FlowRequest::new(input.message, endpoint)
		.io_types(input.output_type, input.input_type)
		.tweaks(tweaks)
		.token(token);

	let reply = state.flow.run(&request).await?;

	if let Some(shape) = reply.shape.filter(|_| config.strict_responses) {
		return Err(langflow::Error::Shape(shape).into());
	}

	Ok(Json(model::RunFlowOutput {
		success: true,
		fallback: reply.shape.is_some(),
		text: reply.text,
	}))
}
