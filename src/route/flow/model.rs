use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use crate::langflow::IoType;

/// A single flow invocation, as entered in the form.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RunFlowInput {
	/// The message passed to the flow as its input value.
	#[validate(length(max = 32768))]
	pub message: String,
	/// The flow endpoint. Defaults to the configured flow id.
	#[validate(length(min = 1, max = 256))]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub output_type: IoType,
	#[serde(default)]
	pub input_type: IoType,
	/// Per-component overrides as JSON text. Defaults to the flow's
	/// component list; an empty string sends none.
	pub tweaks: Option<String>,
	/// Bearer token. Defaults to the configured token; an empty string
	/// sends no `Authorization` header.
	pub application_token: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct RunFlowOutput {
	pub success: bool,
	/// The reply text, or a fallback when the reply had no text.
	pub text: String,
	/// Whether `text` is a fallback.
	pub fallback: bool,
}

/// Initial values for the flow form.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FlowDefaults {
	pub endpoint: Option<String>,
	pub io_types: Vec<IoType>,
	/// Whether a token is configured on the server. The token itself is
	/// never sent to the client.
	pub has_token: bool,
	/// The default tweaks, pretty-printed for editing.
	pub tweaks: String,
}
