use std::path::PathBuf;

pub const DEFAULT_BASE_API_URL: &str = "https://api.langflow.astra.datastax.com";
pub const DEFAULT_DATASET: &str = "arijitsingh_instagram_posts.csv";
pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_USERNAME: &str = "thevarunmayya";
pub const DEFAULT_INSTAGRAM_API_URL: &str = "https://i.instagram.com";
pub const DEFAULT_INSTAGRAM_WEB_URL: &str = "https://www.instagram.com";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{name} must be a number, got {value:?}")]
	NotANumber { name: &'static str, value: String },
	#[error("{name} must be true or false, got {value:?}")]
	NotABool { name: &'static str, value: String },
}

/// Settings for the dashboard server.
///
/// Missing flow identifiers or tokens never fail startup, they only
/// leave the matching form fields empty.
#[derive(Debug, Clone)]
pub struct Config {
	pub base_api_url: String,
	pub langflow_id: Option<String>,
	pub flow_id: Option<String>,
	pub application_token: Option<String>,
	pub dataset_path: PathBuf,
	/// Turn response-shape fallbacks into errors.
	pub strict_responses: bool,
	pub port: u16,
}

impl Config {
	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
	where
		F: Fn(&str) -> Option<String>,
	{
		let lookup = non_blank(lookup);

		Ok(Self {
			base_api_url: lookup("BASE_API_URL").unwrap_or_else(|| DEFAULT_BASE_API_URL.into()),
			langflow_id: lookup("LANGFLOW_ID"),
			flow_id: lookup("FLOW_ID"),
			application_token: lookup("APPLICATION_TOKEN"),
			dataset_path: lookup("DASHBOARD_CSV")
				.map_or_else(|| PathBuf::from(DEFAULT_DATASET), PathBuf::from),
			strict_responses: parse_bool("FLOW_STRICT_RESPONSES", lookup("FLOW_STRICT_RESPONSES"))?,
			port: match lookup("PORT") {
				Some(value) => value.parse().map_err(|_| Error::NotANumber { name: "PORT", value })?,
				None => DEFAULT_PORT,
			},
		})
	}
}

/// Settings for the one-shot collector.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
	pub username: String,
	pub api_url: String,
	pub web_url: String,
	pub output_dir: PathBuf,
}

impl CollectorConfig {
	pub fn from_env() -> Self {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let lookup = non_blank(lookup);

		Self {
			username: lookup("INSTAGRAM_USERNAME").unwrap_or_else(|| DEFAULT_USERNAME.into()),
			api_url: lookup("INSTAGRAM_API_URL").unwrap_or_else(|| DEFAULT_INSTAGRAM_API_URL.into()),
			web_url: lookup("INSTAGRAM_WEB_URL").unwrap_or_else(|| DEFAULT_INSTAGRAM_WEB_URL.into()),
			output_dir: lookup("OUTPUT_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from),
		}
	}
}

/// Blank values count as unset.
fn non_blank<F>(lookup: F) -> impl Fn(&str) -> Option<String>
where
	F: Fn(&str) -> Option<String>,
{
	move |name| {
		lookup(name)
			.map(|value| value.trim().to_owned())
			.filter(|value| !value.is_empty())
	}
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, Error> {
	let Some(value) = value else {
		return Ok(false);
	};

	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(Error::NotABool { name, value }),
	}
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::*;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars = vars
			.iter()
			.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
			.collect::<HashMap<_, _>>();

		move |name| vars.get(name).cloned()
	}

	#[test]
	fn test_defaults_without_env() {
		let config = Config::from_lookup(lookup(&[])).unwrap();

		assert_eq!(config.base_api_url, DEFAULT_BASE_API_URL);
		assert_eq!(config.langflow_id, None);
		assert_eq!(config.flow_id, None);
		assert_eq!(config.application_token, None);
		assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET));
		assert!(!config.strict_responses);
		assert_eq!(config.port, DEFAULT_PORT);
	}

	#[test]
	fn test_blank_values_are_unset() {
		let config = Config::from_lookup(lookup(&[
			("LANGFLOW_ID", "  "),
			("APPLICATION_TOKEN", ""),
			("FLOW_ID", "flow-1"),
		]))
		.unwrap();

		assert_eq!(config.langflow_id, None);
		assert_eq!(config.application_token, None);
		assert_eq!(config.flow_id.as_deref(), Some("flow-1"));
	}

	#[test]
	fn test_invalid_port() {
		let error = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();

		assert!(matches!(error, Error::NotANumber { name: "PORT", .. }));
	}

	#[test]
	fn test_strict_responses() {
		let config = Config::from_lookup(lookup(&[("FLOW_STRICT_RESPONSES", "TRUE")])).unwrap();
		assert!(config.strict_responses);

		let error = Config::from_lookup(lookup(&[("FLOW_STRICT_RESPONSES", "maybe")])).unwrap_err();
		assert!(matches!(error, Error::NotABool { .. }));
	}

	#[test]
	fn test_collector_defaults() {
		let config = CollectorConfig::from_lookup(lookup(&[("INSTAGRAM_USERNAME", "someone")]));

		assert_eq!(config.username, "someone");
		assert_eq!(config.api_url, DEFAULT_INSTAGRAM_API_URL);
		assert_eq!(config.web_url, DEFAULT_INSTAGRAM_WEB_URL);
		assert_eq!(config.output_dir, PathBuf::from("."));
	}
}
