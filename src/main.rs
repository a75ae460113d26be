#![warn(clippy::pedantic)]

use flow_dashboard::{config::Config, trace, State};

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let _guard = trace::init_tracing_subscriber().expect("failed to initialize tracing");
	let config = Config::from_env().expect("invalid configuration");

	if config.langflow_id.is_none() {
		tracing::warn!("LANGFLOW_ID is not set, flow requests will fail");
	}

	let port = config.port;
	let app = flow_dashboard::app(State::new(config));

	let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", port);

	axum::serve(listener, app).await.expect("server error");
}
