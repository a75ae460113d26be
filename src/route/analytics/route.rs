use std::sync::Arc;

use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{config::Config, dataset::Dataset, extract::Json, openapi::tag, Error};

use super::model;

pub fn get_dashboard_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get dashboard")
		.description(
			"Reads the posts file and returns the raw table, chart series and summary. \
			A file without the required columns returns a single error.",
		)
		.tag(tag::ANALYTICS)
}

/// Reads the posts file and returns everything the analytics panel draws.
pub async fn get_dashboard(
	State(config): State<Arc<Config>>,
) -> Result<Json<model::Dashboard>, Error> {
	let dataset = Dataset::read(&config.dataset_path).await?;

	tracing::debug!(posts = dataset.len(), path = %config.dataset_path.display(), "dataset loaded");

	Ok(Json(dataset.into()))
}
