use chrono::{DateTime, Utc};
use serde::Serialize;

/// The column order of the collected CSV file.
pub const CSV_HEADER: [&str; 7] = [
	"post_id",
	"post_type",
	"likes",
	"comments",
	"timestamp",
	"caption",
	"url",
];

/// The kind of media in a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
	/// Several media items in one post.
	Carousel,
	Reels,
	Static,
}

impl PostType {
	/// Classifies a post by the platform's internal type tag.
	pub fn from_typename(typename: &str) -> Self {
		match typename {
			"GraphSidecar" => Self::Carousel,
			"GraphVideo" => Self::Reels,
			_ => Self::Static,
		}
	}
}

/// A single collected post, one row of the CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
	/// The platform's numeric media id.
	pub post_id: u64,
	pub post_type: PostType,
	pub likes: u64,
	pub comments: u64,
	/// When the post was published, in UTC.
	#[serde(serialize_with = "timestamp::serialize")]
	pub timestamp: DateTime<Utc>,
	pub caption: String,
	pub url: String,
}

impl PostRecord {
	pub fn url_for(shortcode: &str) -> String {
		format!("https://www.instagram.com/p/{shortcode}/")
	}
}

/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub mod timestamp {
	use chrono::{DateTime, Utc};
	use serde::Serializer;

	pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

	#[allow(clippy::trivially_copy_pass_by_ref)]
	pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(&value.format(FORMAT))
	}
}

#[cfg(test)]
mod test {
	use chrono::TimeZone;

	use super::*;

	#[test]
	fn test_post_type_from_typename() {
		assert_eq!(PostType::from_typename("GraphSidecar"), PostType::Carousel);
		assert_eq!(PostType::from_typename("GraphVideo"), PostType::Reels);
		assert_eq!(PostType::from_typename("GraphImage"), PostType::Static);
		assert_eq!(PostType::from_typename(""), PostType::Static);
	}

	#[test]
	fn test_record_serializes_as_csv_row() {
		let record = PostRecord {
			post_id: 3_141_592,
			post_type: PostType::Reels,
			likes: 10,
			comments: 2,
			timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
			caption: "hello, world".into(),
			url: PostRecord::url_for("AbC"),
		};

		let mut writer = csv::WriterBuilder::new()
			.has_headers(false)
			.from_writer(Vec::new());
		writer.serialize(&record).unwrap();

		let row = String::from_utf8(writer.into_inner().unwrap()).unwrap();

		assert_eq!(
			row,
			"3141592,reels,10,2,2024-05-01 08:30:00,\"hello, world\",https://www.instagram.com/p/AbC/\n"
		);
	}
}
