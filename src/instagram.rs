//! Anonymous client for a public profile's timeline.

use chrono::DateTime;
use reqwest::{
	header::{self, HeaderMap, HeaderValue},
	StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::model::{PostRecord, PostType};

/// The web app id sent with every request.
pub const APP_ID: &str = "936619743392459";
/// Persisted query listing a profile's posts, newest first.
pub const TIMELINE_QUERY_HASH: &str = "003056d32c2554def87228bc3fd9668a";
pub const PAGE_SIZE: u32 = 12;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
	Chrome/124.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Profile '{0}' does not exist.")]
	ProfileNotExists(String),
	#[error("Profile '{0}' is private and cannot be accessed.")]
	PrivateProfileNotFollowed(String),
	#[error("request failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("unexpected response: {0}")]
	Malformed(String),
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct UserData<T> {
	user: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TimelineUser {
	edge_owner_to_timeline_media: Timeline,
}

/// A resolved profile and the first page of its timeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
	pub id: String,
	pub username: String,
	#[serde(default)]
	pub is_private: bool,
	#[serde(default)]
	pub followed_by_viewer: bool,
	#[serde(rename = "edge_owner_to_timeline_media")]
	pub timeline: Timeline,
}

impl Profile {
	/// Whether an anonymous session may read the timeline.
	pub fn is_accessible(&self) -> bool {
		!self.is_private || self.followed_by_viewer
	}
}

/// One page of posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Timeline {
	#[serde(default)]
	pub page_info: PageInfo,
	#[serde(default)]
	pub edges: Vec<Edge<Media>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageInfo {
	#[serde(default)]
	pub has_next_page: bool,
	pub end_cursor: Option<String>,
}

impl PageInfo {
	pub fn next_cursor(&self) -> Option<&str> {
		self.end_cursor
			.as_deref()
			.filter(|cursor| self.has_next_page && !cursor.is_empty())
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
	pub node: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Count {
	#[serde(default)]
	pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Caption {
	pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Captions {
	#[serde(default)]
	pub edges: Vec<Edge<Caption>>,
}

/// A post as returned by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct Media {
	#[serde(rename = "__typename")]
	pub typename: String,
	pub id: String,
	pub shortcode: String,
	pub taken_at_timestamp: i64,
	#[serde(default)]
	pub edge_media_to_caption: Captions,
	pub edge_media_preview_like: Option<Count>,
	pub edge_liked_by: Option<Count>,
	pub edge_media_to_comment: Option<Count>,
	pub edge_media_to_parent_comment: Option<Count>,
}

impl Media {
	pub fn to_record(&self) -> Result<PostRecord, Error> {
		let post_id = self
			.id
			.parse()
			.map_err(|_| Error::Malformed(format!("media id {:?} is not numeric", self.id)))?;
		let timestamp = DateTime::from_timestamp(self.taken_at_timestamp, 0).ok_or_else(|| {
			Error::Malformed(format!("timestamp {} out of range", self.taken_at_timestamp))
		})?;

		Ok(PostRecord {
			post_id,
			post_type: PostType::from_typename(&self.typename),
			likes: self
				.edge_media_preview_like
				.as_ref()
				.or(self.edge_liked_by.as_ref())
				.map_or(0, |likes| likes.count),
			comments: self
				.edge_media_to_comment
				.as_ref()
				.or(self.edge_media_to_parent_comment.as_ref())
				.map_or(0, |comments| comments.count),
			timestamp,
			caption: self
				.edge_media_to_caption
				.edges
				.first()
				.map(|edge| edge.node.text.clone())
				.unwrap_or_default(),
			url: PostRecord::url_for(&self.shortcode),
		})
	}
}

#[derive(Serialize)]
struct TimelineVariables<'a> {
	id: &'a str,
	first: u32,
	after: &'a str,
}

#[derive(Debug, Clone)]
pub struct Client {
	http: reqwest::Client,
	api_url: String,
	web_url: String,
}

impl Client {
	/// Creates an anonymous session.
	pub fn new(api_url: &str, web_url: &str) -> Result<Self, Error> {
		let mut headers = HeaderMap::new();
		headers.insert("x-ig-app-id", HeaderValue::from_static(APP_ID));
		headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

		let http = reqwest::Client::builder()
			.user_agent(USER_AGENT)
			.default_headers(headers)
			.build()?;

		Ok(Self {
			http,
			api_url: api_url.trim_end_matches('/').to_owned(),
			web_url: web_url.trim_end_matches('/').to_owned(),
		})
	}

	/// Resolves a profile by username.
	#[tracing::instrument(skip(self))]
	pub async fn profile(&self, username: &str) -> Result<Profile, Error> {
		let response = self
			.http
			.get(format!("{}/api/v1/users/web_profile_info/", self.api_url))
			.query(&[("username", username)])
			.send()
			.await?;

		if response.status() == StatusCode::NOT_FOUND {
			return Err(Error::ProfileNotExists(username.to_owned()));
		}

		let envelope = response
			.error_for_status()?
			.json::<Envelope<UserData<Profile>>>()
			.await?;

		envelope
			.data
			.and_then(|data| data.user)
			.ok_or_else(|| Error::ProfileNotExists(username.to_owned()))
	}

	/// Fetches the page of posts after `cursor`.
	#[tracing::instrument(skip(self))]
	pub async fn timeline(&self, profile_id: &str, cursor: &str) -> Result<Timeline, Error> {
		let variables = serde_json::to_string(&TimelineVariables {
			id: profile_id,
			first: PAGE_SIZE,
			after: cursor,
		})
		.map_err(|error| Error::Malformed(error.to_string()))?;

		let envelope = self
			.http
			.get(format!("{}/graphql/query/", self.web_url))
			.query(&[
				("query_hash", TIMELINE_QUERY_HASH),
				("variables", variables.as_str()),
			])
			.send()
			.await?
			.error_for_status()?
			.json::<Envelope<UserData<TimelineUser>>>()
			.await?;

		envelope
			.data
			.and_then(|data| data.user)
			.map(|user| user.edge_owner_to_timeline_media)
			.ok_or_else(|| Error::Malformed("timeline response has no user".into()))
	}
}

#[cfg(test)]
mod test {
	use serde_json::json;

	use super::*;

	fn media(typename: &str) -> serde_json::Value {
		json!({
			"__typename": typename,
			"id": "3301",
			"shortcode": "CxYz",
			"taken_at_timestamp": 1_700_000_000,
			"edge_media_to_caption": {"edges": [{"node": {"text": "sunset"}}, {"node": {"text": "ignored"}}]},
			"edge_media_preview_like": {"count": 42},
			"edge_media_to_comment": {"count": 3},
		})
	}

	#[test]
	fn test_media_to_record() {
		let media = serde_json::from_value::<Media>(media("GraphSidecar")).unwrap();
		let record = media.to_record().unwrap();

		assert_eq!(record.post_id, 3301);
		assert_eq!(record.post_type, PostType::Carousel);
		assert_eq!(record.likes, 42);
		assert_eq!(record.comments, 3);
		assert_eq!(record.caption, "sunset");
		assert_eq!(record.url, "https://www.instagram.com/p/CxYz/");
		assert_eq!(
			record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
			"2023-11-14 22:13:20"
		);
	}

	#[test]
	fn test_media_without_optional_edges() {
		let media = serde_json::from_value::<Media>(json!({
			"__typename": "GraphImage",
			"id": "7",
			"shortcode": "a",
			"taken_at_timestamp": 0,
			"edge_liked_by": {"count": 5},
		}))
		.unwrap();
		let record = media.to_record().unwrap();

		assert_eq!(record.post_type, PostType::Static);
		assert_eq!(record.likes, 5);
		assert_eq!(record.comments, 0);
		assert_eq!(record.caption, "");
	}

	#[test]
	fn test_media_with_bad_id() {
		let mut value = media("GraphVideo");
		value["id"] = json!("abc");

		let media = serde_json::from_value::<Media>(value).unwrap();

		assert!(matches!(media.to_record(), Err(Error::Malformed(..))));
	}

	#[test]
	fn test_next_cursor() {
		let info = PageInfo {
			has_next_page: true,
			end_cursor: Some("abc".into()),
		};
		assert_eq!(info.next_cursor(), Some("abc"));

		let info = PageInfo {
			has_next_page: false,
			end_cursor: Some("abc".into()),
		};
		assert_eq!(info.next_cursor(), None);

		let info = PageInfo {
			has_next_page: true,
			end_cursor: Some(String::new()),
		};
		assert_eq!(info.next_cursor(), None);
	}

	#[tokio::test]
	async fn test_profile_not_found() {
		let mut server = mockito::Server::new_async().await;
		let mock = server
			.mock("GET", "/api/v1/users/web_profile_info/")
			.match_query(mockito::Matcher::UrlEncoded("username".into(), "ghost".into()))
			.match_header("x-ig-app-id", APP_ID)
			.with_status(404)
			.create_async()
			.await;

		let client = Client::new(&server.url(), &server.url()).unwrap();
		let error = client.profile("ghost").await.unwrap_err();

		mock.assert_async().await;
		assert_eq!(error.to_string(), "Profile 'ghost' does not exist.");
	}

	#[tokio::test]
	async fn test_profile_with_null_user() {
		let mut server = mockito::Server::new_async().await;
		server
			.mock("GET", "/api/v1/users/web_profile_info/")
			.match_query(mockito::Matcher::Any)
			.with_body(json!({"data": {"user": null}, "status": "ok"}).to_string())
			.create_async()
			.await;

		let client = Client::new(&server.url(), &server.url()).unwrap();

		assert!(matches!(
			client.profile("ghost").await,
			Err(Error::ProfileNotExists(..))
		));
	}
}
