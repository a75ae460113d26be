use aide::axum::{routing::get_with, ApiRouter};

use crate::AppState;

pub mod model;
pub mod route;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/analytics", get_with(get_dashboard, get_dashboard_docs))
}

#[cfg(test)]
mod test {
	use std::io::Write;

	use tempfile::NamedTempFile;

	use crate::test::*;

	const POSTS: &str = "\
post_id,post_type,likes,comments,timestamp,caption,url
30,reels,10,1,2024-06-03 09:00:00,third,https://www.instagram.com/p/c/
20,carousel,50,5,2024-06-02 09:00:00,second,https://www.instagram.com/p/b/
10,static,50,2,2024-06-01 09:00:00,first,https://www.instagram.com/p/a/
";

	fn dataset_server(text: &str) -> (NamedTempFile, TestServer) {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(text.as_bytes()).unwrap();

		let path = file.path().to_str().unwrap().to_owned();
		let server = server(config(&[("DASHBOARD_CSV", path.as_str())]));

		(file, server)
	}

	#[tokio::test]
	async fn test_dashboard() {
		let (_file, server) = dataset_server(POSTS);

		let response = server.get("/analytics").await;
		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();
		assert_eq!(body["success"], true);
		assert_eq!(body["columns"].as_array().unwrap().len(), 7);
		assert_eq!(body["rows"][0][0], "30");
		assert_eq!(
			body["post_types"],
			json!([
				{"post_type": "reels", "count": 1},
				{"post_type": "carousel", "count": 1},
				{"post_type": "static", "count": 1},
			])
		);
		assert_eq!(
			body["top_posts"],
			json!([
				{"post_id": "20", "post_type": "carousel", "likes": 50},
				{"post_id": "10", "post_type": "static", "likes": 50},
				{"post_id": "30", "post_type": "reels", "likes": 10},
			])
		);
		assert_eq!(body["likes_over_time"][0]["likes"], 50);
		assert_eq!(body["likes_over_time"][0]["timestamp"], "2024-06-01T09:00:00");
		assert_eq!(
			body["summary"],
			json!({
				"total_posts": 3,
				"total_likes": 110,
				"total_comments": 8,
				"best_post": {"post_id": "20", "caption": "second", "likes": 50},
			})
		);
	}

	#[tokio::test]
	async fn test_dashboard_missing_column() {
		let (_file, server) = dataset_server("post_id,post_type,likes,timestamp,caption\n1,static,3,2024-01-01 00:00:00,x\n");

		let response = server.get("/analytics").await;

		assert_eq!(response.status_code(), 422);
		assert_eq!(
			response.json::<Value>(),
			json!({
				"success": false,
				"errors": ["The CSV file must contain the required columns: post_id, post_type, likes, comments, timestamp, caption."],
			})
		);
	}

	#[tokio::test]
	async fn test_dashboard_reads_file_on_every_request() {
		let (mut file, server) = dataset_server(POSTS);

		let first = server.get("/analytics").await.json::<Value>();
		assert_eq!(first["summary"]["total_posts"], 3);

		file.write_all(b"40,reels,1,0,2024-06-04 09:00:00,fourth,https://www.instagram.com/p/d/\n")
			.unwrap();

		let second = server.get("/analytics").await.json::<Value>();
		assert_eq!(second["summary"]["total_posts"], 4);
	}

	#[tokio::test]
	async fn test_dashboard_without_file() {
		let response = server(config(&[("DASHBOARD_CSV", "/no/such/posts.csv")]))
			.get("/analytics")
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"].as_array().unwrap().len(), 1);
	}
}
