pub use axum_test::TestServer;
pub use serde_json::{json, Value};

pub use crate::config::Config;

/// A configuration built only from the given variables.
pub fn config(vars: &[(&str, &str)]) -> Config {
	Config::from_lookup(|name| {
		vars.iter()
			.find(|(key, _)| *key == name)
			.map(|(_, value)| (*value).to_owned())
	})
	.unwrap()
}

pub fn server(config: Config) -> TestServer {
	TestServer::new(crate::app(crate::State::new(config))).unwrap()
}
