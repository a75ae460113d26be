//! Pulls a public profile's newest posts into `{username}_instagram_posts.csv`.

#![warn(clippy::pedantic)]

use std::process::ExitCode;

use flow_dashboard::{collector, config::CollectorConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	dotenvy::dotenv().ok();
	tracing_subscriber::fmt::init();

	let config = CollectorConfig::from_env();

	match collector::run(&config).await {
		Ok(..) => ExitCode::SUCCESS,
		Err(error) => {
			tracing::error!("{error}");
			ExitCode::FAILURE
		}
	}
}
