#![warn(clippy::pedantic)]

pub mod collector;
pub mod config;
pub mod dataset;
mod error;
mod extract;
pub mod instagram;
pub mod langflow;
pub mod model;
mod openapi;
mod route;
pub mod trace;

#[cfg(test)]
mod test;

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

pub use error::Error;

use config::Config;
use langflow::FlowClient;

pub type AppState = State;

/// The shared application state.
///
/// Configuration is read once at startup and never changes; the flow
/// client shares one connection pool across requests.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub config: Arc<Config>,
	pub flow: FlowClient,
}

impl State {
	pub fn new(config: Config) -> Self {
		Self {
			flow: FlowClient::new(&config.base_api_url, config.langflow_id.clone()),
			config: Arc::new(config),
		}
	}
}

/// Builds the dashboard router: the page, its JSON API and the API docs.
pub fn app(state: AppState) -> Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.route("/", get(route::page::index))
		.nest("/flow", route::flow::routes())
		.merge(route::analytics::routes())
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}
