use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};

use crate::AppState;

pub mod model;
pub mod route;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/defaults", get_with(get_defaults, get_defaults_docs))
		.api_route("/run", post_with(run_flow, run_flow_docs))
}
