use std::{
	collections::HashSet,
	path::{Path, PathBuf},
};

use crate::{
	config::CollectorConfig,
	instagram::{self, Client},
	model::{PostRecord, CSV_HEADER},
};

/// Posts kept per run.
pub const MAX_POSTS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
	#[error("csv error: {0}")]
	Csv(#[from] csv::Error),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Profile(#[from] instagram::Error),
	#[error("failed to write {}: {source}", path.display())]
	Write { path: PathBuf, source: WriteError },
}

/// Collects the configured profile and writes its posts file.
///
/// The file is only created once every page has been fetched, so a failed
/// run leaves any previous file untouched.
pub async fn run(config: &CollectorConfig) -> Result<PathBuf, Error> {
	let client = Client::new(&config.api_url, &config.web_url)?;
	let records = collect(&client, &config.username).await?;
	let path = output_path(&config.output_dir, &config.username);

	write_csv(&path, &records).map_err(|source| Error::Write {
		path: path.clone(),
		source,
	})?;

	tracing::info!(posts = records.len(), "Data saved to {}", path.display());
	Ok(path)
}

/// Pulls up to [`MAX_POSTS`] of a profile's newest posts.
///
/// The profile is resolved first, so nothing is fetched for a missing or
/// private profile. Posts keep the platform's order, newest first.
pub async fn collect(client: &Client, username: &str) -> Result<Vec<PostRecord>, instagram::Error> {
	let profile = client.profile(username).await?;

	if !profile.is_accessible() {
		return Err(instagram::Error::PrivateProfileNotFollowed(
			username.to_owned(),
		));
	}

	let mut seen = HashSet::new();
	let mut records = Vec::with_capacity(MAX_POSTS);
	let mut page = profile.timeline;

	loop {
		for edge in &page.edges {
			let record = edge.node.to_record()?;

			if seen.insert(record.post_id) {
				records.push(record);
			}

			if records.len() >= MAX_POSTS {
				return Ok(records);
			}
		}

		let Some(cursor) = page.page_info.next_cursor() else {
			break;
		};

		tracing::debug!(collected = records.len(), cursor, "fetching next page");
		page = client.timeline(&profile.id, cursor).await?;
	}

	Ok(records)
}

/// Where the posts of `username` are written.
pub fn output_path(dir: &Path, username: &str) -> PathBuf {
	dir.join(format!("{username}_instagram_posts.csv"))
}

/// Replaces the file at `path` with the given records.
pub fn write_csv(path: &Path, records: &[PostRecord]) -> Result<(), WriteError> {
	let mut writer = csv::WriterBuilder::new()
		.has_headers(false)
		.from_path(path)?;

	writer.write_record(CSV_HEADER)?;

	for record in records {
		writer.serialize(record)?;
	}

	writer.flush()?;
	Ok(())
}
