use schemars::JsonSchema;
use serde::Serialize;

pub use crate::dataset::{LikesAt, PostTypeCount, Summary, TopPost};
use crate::dataset::{Dataset, TOP_POSTS};

/// Everything the analytics panel draws.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Dashboard {
	pub success: bool,
	/// Column names of the raw table.
	pub columns: Vec<String>,
	/// The raw table, in file order.
	pub rows: Vec<Vec<String>>,
	/// Pie chart of post types.
	pub post_types: Vec<PostTypeCount>,
	/// Bar chart of the most liked posts.
	pub top_posts: Vec<TopPost>,
	/// Line chart of likes, oldest first.
	pub likes_over_time: Vec<LikesAt>,
	pub summary: Summary,
}

impl From<Dataset> for Dashboard {
	fn from(dataset: Dataset) -> Self {
		Self {
			success: true,
			post_types: dataset.post_types(),
			top_posts: dataset.top_by_likes(TOP_POSTS),
			likes_over_time: dataset.likes_over_time(),
			summary: dataset.summary(),
			columns: dataset.columns().to_vec(),
			rows: dataset.rows().to_vec(),
		}
	}
}
