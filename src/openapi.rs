use aide::{openapi::Tag, transform::TransformOpenApi};

use crate::{error::ErrorResponse, extract::Json};

pub mod tag {
	pub const FLOW: &str = "Flow";
	pub const ANALYTICS: &str = "Analytics";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Flow Dashboard")
		.summary("Flow invocation and post analytics")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::FLOW.into(),
			description: Some("Conversational flow invocation".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::ANALYTICS.into(),
			description: Some("Charts and insights over collected posts".into()),
			..Default::default()
		})
		.default_response_with::<Json<ErrorResponse>, _>(|res| {
			res.example(ErrorResponse {
				success: false,
				errors: vec!["error message".into()],
			})
		})
}
