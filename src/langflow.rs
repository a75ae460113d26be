//! Client for running a hosted conversational flow.
//!
//! A flow is addressed by a collection id (`LANGFLOW_ID`) and an endpoint
//! (usually `FLOW_ID`). Every invocation is a single POST; the reply text
//! lives at `outputs[-1].outputs[-1].results.message.data.text`.

use std::time::Instant;

use axum::http::{header, StatusCode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Map = serde_json::Map<String, Value>;

/// Shown when the reply has the expected structure but no text.
pub const DEFAULT_TEXT: &str = "Default text if not found";
/// Shown when the reply does not have the expected structure.
pub const ERROR_TEXT: &str = "Error retrieving data";

/// The components of the default flow, each without overrides.
pub const DEFAULT_TWEAK_COMPONENTS: [&str; 7] = [
	"ChatInput-zqJHc",
	"AzureOpenAIModel-wSMfJ",
	"ChatOutput-UFwns",
	"Prompt-L08F8",
	"Prompt-yPXwF",
	"AstraDBToolComponent-dCiii",
	"Agent-TGf7G",
];

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid tweaks JSON format.")]
	InvalidTweaks(Option<serde_json::Error>),
	#[error("no flow collection configured, set LANGFLOW_ID")]
	MissingCollection,
	#[error("no flow endpoint given and FLOW_ID is not set")]
	MissingEndpoint,
	#[error("An error occurred: {0}")]
	Request(#[from] reqwest::Error),
	#[error("unexpected flow response: {0}")]
	Shape(ShapeError),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::InvalidTweaks(..) | Self::MissingEndpoint => StatusCode::BAD_REQUEST,
			Self::MissingCollection => StatusCode::SERVICE_UNAVAILABLE,
			Self::Request(..) | Self::Shape(..) => StatusCode::BAD_GATEWAY,
		}
	}

	/// The message presented to the user.
	pub fn message(&self) -> String {
		self.to_string()
	}
}

/// Why a flow reply did not yield its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
	#[error("body is not JSON")]
	NotJson,
	#[error("`outputs` is missing, empty or not a list")]
	Outputs,
	#[error("last run has no `outputs` list")]
	RunOutputs,
	#[error("`results.message.data` has an unexpected type")]
	Results,
	#[error("`results.message.data.text` is missing")]
	MissingText,
	#[error("`text` is not a string")]
	NotText,
}

impl ShapeError {
	/// The string displayed in place of the reply text.
	pub fn fallback(self) -> &'static str {
		match self {
			Self::MissingText => DEFAULT_TEXT,
			_ => ERROR_TEXT,
		}
	}
}

/// Whether the flow consumes and produces chat messages or raw JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IoType {
	#[default]
	Chat,
	Json,
}

impl IoType {
	pub const ALL: [Self; 2] = [Self::Chat, Self::Json];
}

/// One flow invocation.
#[derive(Debug, Clone)]
pub struct FlowRequest {
	pub message: String,
	pub endpoint: String,
	pub output_type: IoType,
	pub input_type: IoType,
	pub tweaks: Option<Map>,
	pub token: Option<String>,
}

impl FlowRequest {
	pub fn new(message: impl Into<String>, endpoint: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			endpoint: endpoint.into(),
			output_type: IoType::Chat,
			input_type: IoType::Chat,
			tweaks: None,
			token: None,
		}
	}

	#[must_use]
	pub fn io_types(mut self, output_type: IoType, input_type: IoType) -> Self {
		self.output_type = output_type;
		self.input_type = input_type;
		self
	}

	/// Empty tweaks are not sent.
	#[must_use]
	pub fn tweaks(mut self, tweaks: Option<Map>) -> Self {
		self.tweaks = tweaks.filter(|tweaks| !tweaks.is_empty());
		self
	}

	/// An empty token sends no `Authorization` header.
	#[must_use]
	pub fn token(mut self, token: Option<String>) -> Self {
		self.token = token.filter(|token| !token.is_empty());
		self
	}
}

#[derive(Serialize)]
struct Payload<'a> {
	input_value: &'a str,
	output_type: IoType,
	input_type: IoType,
	#[serde(skip_serializing_if = "Option::is_none")]
	tweaks: Option<&'a Map>,
}

/// The text to display, and the reason when it is a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReply {
	pub text: String,
	pub shape: Option<ShapeError>,
}

impl FlowReply {
	fn from_body(body: &[u8]) -> Self {
		let text = serde_json::from_slice::<Value>(body)
			.map_err(|_| ShapeError::NotJson)
			.and_then(|value| extract_text(&value));

		match text {
			Ok(text) => Self { text, shape: None },
			Err(shape) => Self {
				text: shape.fallback().to_owned(),
				shape: Some(shape),
			},
		}
	}
}

#[derive(Debug, Clone)]
pub struct FlowClient {
	http: reqwest::Client,
	base_url: String,
	langflow_id: Option<String>,
}

impl FlowClient {
	pub fn new(base_url: &str, langflow_id: Option<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url: base_url.trim_end_matches('/').to_owned(),
			langflow_id,
		}
	}

	pub fn run_url(&self, endpoint: &str) -> Result<String, Error> {
		let langflow_id = self.langflow_id.as_deref().ok_or(Error::MissingCollection)?;

		Ok(format!(
			"{}/lf/{langflow_id}/api/v1/run/{endpoint}",
			self.base_url
		))
	}

	/// Runs the flow once. Transport failures are errors; a reply of any
	/// other shape degrades to a fallback text.
	#[tracing::instrument(skip_all, fields(endpoint = %request.endpoint))]
	pub async fn run(&self, request: &FlowRequest) -> Result<FlowReply, Error> {
		let url = self.run_url(&request.endpoint)?;
		let payload = Payload {
			input_value: &request.message,
			output_type: request.output_type,
			input_type: request.input_type,
			tweaks: request.tweaks.as_ref(),
		};

		let mut builder = self.http.post(url).json(&payload);

		if let Some(token) = &request.token {
			builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
		}

		let started = Instant::now();
		let response = builder.send().await?;
		let status = response.status();
		let body = response.bytes().await?;

		tracing::info!(
			histogram.flow_latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
			%status,
			"flow responded"
		);

		let reply = FlowReply::from_body(&body);

		if let Some(shape) = reply.shape {
			tracing::warn!(
				monotonic_counter.flow_fallbacks = 1_u64,
				%status,
				reason = %shape,
				"flow reply fell back to {:?}",
				reply.text
			);
		}

		Ok(reply)
	}
}

/// Follows `outputs[-1].outputs[-1].results.message.data.text`.
pub fn extract_text(value: &Value) -> Result<String, ShapeError> {
	let run = last_of(value.get("outputs")).ok_or(ShapeError::Outputs)?;
	if !run.is_object() {
		return Err(ShapeError::RunOutputs);
	}

	let mut current = last_of(run.get("outputs")).ok_or(ShapeError::RunOutputs)?;

	for key in ["results", "message", "data"] {
		current = match current.get(key) {
			Some(next @ Value::Object(..)) => next,
			None | Some(Value::Null) => {
				return Err(if current.is_object() {
					ShapeError::MissingText
				} else {
					ShapeError::Results
				})
			}
			Some(..) => return Err(ShapeError::Results),
		};
	}

	match current.get("text") {
		Some(Value::String(text)) => Ok(text.clone()),
		None | Some(Value::Null) => Err(ShapeError::MissingText),
		Some(..) => Err(ShapeError::NotText),
	}
}

fn last_of(value: Option<&Value>) -> Option<&Value> {
	value?.as_array()?.last()
}

/// Parses the user-edited tweaks text.
pub fn parse_tweaks(text: &str) -> Result<Option<Map>, Error> {
	if text.trim().is_empty() {
		return Ok(None);
	}

	match serde_json::from_str::<Value>(text) {
		Ok(Value::Object(map)) => Ok(Some(map).filter(|map| !map.is_empty())),
		Ok(..) => Err(Error::InvalidTweaks(None)),
		Err(error) => Err(Error::InvalidTweaks(Some(error))),
	}
}

pub fn default_tweaks() -> Map {
	DEFAULT_TWEAK_COMPONENTS
		.iter()
		.map(|component| ((*component).to_owned(), Value::Object(Map::new())))
		.collect()
}
