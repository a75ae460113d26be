//! Analytics over the collected posts file.
//!
//! The file is read eagerly and in full on every call; nothing is cached
//! between requests.

use std::{
	fs::File,
	io,
	path::{Path, PathBuf},
};

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::Serialize;

/// Columns the dashboard needs. `url` is optional.
pub const REQUIRED_COLUMNS: [&str; 6] = [
	"post_id",
	"post_type",
	"likes",
	"comments",
	"timestamp",
	"caption",
];

pub const TOP_POSTS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("dataset {0} not found")]
	NotFound(PathBuf),
	#[error("missing columns {0:?}")]
	MissingColumns(Vec<&'static str>),
	#[error("invalid {column} {value:?} on row {row}")]
	InvalidValue {
		row: usize,
		column: &'static str,
		value: String,
	},
	#[error("csv error: {0}")]
	Csv(#[from] csv::Error),
	#[error("io error: {0}")]
	Io(#[from] io::Error),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::NotFound(..) => StatusCode::NOT_FOUND,
			Self::MissingColumns(..) | Self::InvalidValue { .. } | Self::Csv(..) => {
				StatusCode::UNPROCESSABLE_ENTITY
			}
			Self::Io(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// The single message shown in place of the dashboard.
	pub fn message(&self) -> String {
		match self {
			Self::NotFound(path) => format!(
				"No data file found at {}. Run the collector first.",
				path.display()
			),
			Self::MissingColumns(..) => format!(
				"The CSV file must contain the required columns: {}.",
				REQUIRED_COLUMNS.join(", ")
			),
			Self::InvalidValue { row, column, value } => {
				format!("Row {row} has an invalid {column}: {value:?}.")
			}
			Self::Csv(error) => format!("The CSV file could not be read: {error}."),
			Self::Io(..) => "The CSV file could not be read.".into(),
		}
	}
}

/// The typed view of one row.
#[derive(Debug, Clone)]
struct Post {
	post_id: String,
	post_type: String,
	likes: u64,
	comments: u64,
	timestamp: NaiveDateTime,
	caption: String,
}

/// One slice of the post type pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PostTypeCount {
	pub post_type: String,
	pub count: usize,
}

/// One bar of the top posts chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TopPost {
	pub post_id: String,
	pub post_type: String,
	pub likes: u64,
}

/// One marker of the likes over time line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct LikesAt {
	pub timestamp: NaiveDateTime,
	pub likes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct BestPost {
	pub post_id: String,
	pub caption: String,
	pub likes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Summary {
	pub total_posts: usize,
	/// Summed without overflow.
	pub total_likes: u128,
	pub total_comments: u128,
	/// The first post with the most likes, if there are any posts.
	pub best_post: Option<BestPost>,
}

/// A loaded and validated posts file.
#[derive(Debug, Clone)]
pub struct Dataset {
	columns: Vec<String>,
	rows: Vec<Vec<String>>,
	posts: Vec<Post>,
}

impl Dataset {
	pub fn load(path: &Path) -> Result<Self, Error> {
		let file = File::open(path).map_err(|error| open_error(path, error))?;

		Self::from_reader(file)
	}

	/// Like [`Dataset::load`], without blocking the runtime on the read.
	pub async fn read(path: &Path) -> Result<Self, Error> {
		let bytes = tokio::fs::read(path)
			.await
			.map_err(|error| open_error(path, error))?;

		Self::from_reader(bytes.as_slice())
	}

	pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, Error> {
		let mut reader = csv::Reader::from_reader(reader);
		let columns = reader
			.headers()?
			.iter()
			.map(str::to_owned)
			.collect::<Vec<_>>();

		let missing = REQUIRED_COLUMNS
			.iter()
			.copied()
			.filter(|required| !columns.iter().any(|column| column == required))
			.collect::<Vec<_>>();

		if !missing.is_empty() {
			return Err(Error::MissingColumns(missing));
		}

		let index = |name: &str| columns.iter().position(|column| column == name);
		let [post_id, post_type, likes, comments, timestamp, caption] =
			REQUIRED_COLUMNS.map(|name| index(name).unwrap_or_default());

		let mut rows = Vec::new();
		let mut posts = Vec::new();

		for (row, record) in reader.records().enumerate() {
			let record = record?;
			let field = |index: usize| record.get(index).unwrap_or_default();
			// Rows are numbered from 1 after the header, as in a spreadsheet.
			let row = row + 1;

			posts.push(Post {
				post_id: field(post_id).to_owned(),
				post_type: field(post_type).to_owned(),
				likes: parse_count(row, "likes", field(likes))?,
				comments: parse_count(row, "comments", field(comments))?,
				timestamp: parse_timestamp(field(timestamp)).ok_or_else(|| Error::InvalidValue {
					row,
					column: "timestamp",
					value: field(timestamp).to_owned(),
				})?,
				caption: field(caption).to_owned(),
			});
			rows.push(record.iter().map(str::to_owned).collect());
		}

		Ok(Self {
			columns,
			rows,
			posts,
		})
	}

	/// Every column of the file, in file order.
	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	/// The unmodified table, in file order.
	pub fn rows(&self) -> &[Vec<String>] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.posts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.posts.is_empty()
	}

	/// Post type frequencies, in order of first appearance.
	pub fn post_types(&self) -> Vec<PostTypeCount> {
		let mut counts: Vec<PostTypeCount> = Vec::new();

		for post in &self.posts {
			match counts.iter_mut().find(|count| count.post_type == post.post_type) {
				Some(count) => count.count += 1,
				None => counts.push(PostTypeCount {
					post_type: post.post_type.clone(),
					count: 1,
				}),
			}
		}

		counts
	}

	/// The `limit` most liked posts. Ties keep file order.
	pub fn top_by_likes(&self, limit: usize) -> Vec<TopPost> {
		let mut posts = self.posts.iter().collect::<Vec<_>>();
		posts.sort_by(|a, b| b.likes.cmp(&a.likes));

		posts
			.into_iter()
			.take(limit)
			.map(|post| TopPost {
				post_id: post.post_id.clone(),
				post_type: post.post_type.clone(),
				likes: post.likes,
			})
			.collect()
	}

	/// Likes of every post, oldest first.
	pub fn likes_over_time(&self) -> Vec<LikesAt> {
		let mut points = self
			.posts
			.iter()
			.map(|post| LikesAt {
				timestamp: post.timestamp,
				likes: post.likes,
			})
			.collect::<Vec<_>>();

		points.sort_by_key(|point| point.timestamp);
		points
	}

	pub fn summary(&self) -> Summary {
		let best_post = self
			.posts
			.iter()
			.reduce(|best, post| if post.likes > best.likes { post } else { best })
			.map(|post| BestPost {
				post_id: post.post_id.clone(),
				caption: post.caption.clone(),
				likes: post.likes,
			});

		Summary {
			total_posts: self.posts.len(),
			total_likes: self.posts.iter().map(|post| u128::from(post.likes)).sum(),
			total_comments: self.posts.iter().map(|post| u128::from(post.comments)).sum(),
			best_post,
		}
	}
}

fn open_error(path: &Path, error: io::Error) -> Error {
	match error.kind() {
		io::ErrorKind::NotFound => Error::NotFound(path.to_owned()),
		_ => Error::Io(error),
	}
}

fn parse_count(row: usize, column: &'static str, value: &str) -> Result<u64, Error> {
	value.trim().parse().map_err(|_| Error::InvalidValue {
		row,
		column,
		value: value.to_owned(),
	})
}

/// Accepts the collector's format as well as ISO 8601 variants.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
	let value = value.trim();

	NaiveDateTime::parse_from_str(value, crate::model::timestamp::FORMAT)
		.or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
		.or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
		.ok()
		.or_else(|| {
			DateTime::parse_from_rfc3339(value)
				.ok()
				.map(|date| date.naive_utc())
		})
		.or_else(|| {
			NaiveDate::parse_from_str(value, "%Y-%m-%d")
				.ok()
				.and_then(|date| date.and_hms_opt(0, 0, 0))
		})
}
