use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Response};

/// Downloads build inputs into the working directory.
#[derive(Debug, Default)]
pub struct Downloader {
	client: Client,
}

impl Downloader {
	pub fn new() -> Downloader {
		Downloader {
			client: Client::new(),
		}
	}

	async fn get(&self, url: &str) -> Result<Response> {
		let response = self.client.get(url).send().await?;

		if response.status().is_success() {
			Ok(response)
		} else {
			bail!("Got a \"{}\" for {url:?}", response.status());
		}
	}

	/// Downloads `url` to `dest`, skipping the download if `dest` already exists.
	///
	/// With `refresh` set the file is fetched again even if present.
	pub async fn download_if_changed(&self, url: &str, dest: &Path, refresh: bool) -> Result<()> {
		if dest.exists() && !refresh {
			log::debug!("reusing {dest:?}");
			return Ok(());
		}

		log::info!("downloading {url:?}");
		let bytes = self.get(url).await?.bytes().await
			.with_context(|| anyhow!("Failed to read response body of {url:?}"))?;

		if let Some(parent) = dest.parent() {
			std::fs::create_dir_all(parent)
				.with_context(|| anyhow!("Failed to create directory {parent:?}"))?;
		}
		std::fs::write(dest, &bytes)
			.with_context(|| anyhow!("Failed to write {url:?} to {dest:?}"))?;

		Ok(())
	}
}
