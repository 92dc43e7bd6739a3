use std::path::PathBuf;
use anyhow::Result;
use crate::download::Downloader;

/// Everything layer resolution needs from the surrounding build: where downloaded files
/// live, which game version is targeted, and where its mapping artifacts come from.
///
/// Passed explicitly to [`crate::processor::LayeredMappingsProcessor::resolve_layers`]
/// instead of living in some global service registry.
#[derive(Debug)]
pub struct MappingContext {
	pub working_dir: PathBuf,
	pub minecraft_version: String,
	/// The published intermediary mappings, either a bare tiny file or a jar holding
	/// `mappings/mappings.tiny`.
	pub intermediary_url: String,
	pub client_mappings_url: Option<String>,
	pub server_mappings_url: Option<String>,
	/// Re-download files even when they are already present in the working directory.
	pub refresh_deps: bool,
	pub downloader: Downloader,
}

impl MappingContext {
	pub fn new(working_dir: impl Into<PathBuf>, minecraft_version: impl Into<String>, intermediary_url: impl Into<String>) -> MappingContext {
		MappingContext {
			working_dir: working_dir.into(),
			minecraft_version: minecraft_version.into(),
			intermediary_url: intermediary_url.into(),
			client_mappings_url: None,
			server_mappings_url: None,
			refresh_deps: false,
			downloader: Downloader::new(),
		}
	}

	/// Downloads `url` into the working directory under `file_name` and returns the path.
	pub(crate) async fn download(&self, url: &str, file_name: &str) -> Result<PathBuf> {
		let dest = self.working_dir.join(file_name);
		self.downloader.download_if_changed(url, &dest, self.refresh_deps).await?;
		Ok(dest)
	}

	pub(crate) fn file_name_of(url: &str) -> &str {
		url.rsplit('/').next().filter(|x| !x.is_empty()).unwrap_or("download")
	}
}
