use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use shuttle::jar::MemJar;

pub(crate) const UNPICK_METADATA_PATH: &str = "extras/unpick.json";
pub(crate) const UNPICK_DEFINITIONS_PATH: &str = "extras/definitions.unpick";

/// The `extras/unpick.json` sidecar describing the constant-uninlining artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpickMetadata {
	pub version: u32,
	#[serde(rename = "unpickGroup")]
	pub unpick_group: String,
	#[serde(rename = "unpickVersion")]
	pub unpick_version: String,
}

/// Constant-unpacking definitions plus their metadata, carried through the pipeline
/// untouched and written back into the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpickData {
	pub definitions: Vec<u8>,
	pub metadata: UnpickMetadata,
}

impl UnpickData {
	pub(crate) fn parse(definitions: Vec<u8>, metadata: &[u8]) -> Result<UnpickData> {
		let metadata: UnpickMetadata = serde_json::from_slice(metadata)
			.context("failed to parse unpick metadata")?;

		if metadata.version != 1 {
			bail!("unsupported unpick metadata version {}", metadata.version);
		}

		Ok(UnpickData { definitions, metadata })
	}
}

/// A standalone unpick layer: a zip carrying only the `extras/` unpick entries.
#[derive(Debug, Clone)]
pub struct UnpickLayer {
	data: UnpickData,
}

impl UnpickLayer {
	pub fn new(data: UnpickData) -> UnpickLayer {
		UnpickLayer { data }
	}

	pub(crate) fn resolve(path: &Path) -> Result<UnpickLayer> {
		let jar = MemJar::from_path(path)?;

		let metadata = jar.entry(UNPICK_METADATA_PATH)
			.with_context(|| anyhow!("could not find {UNPICK_METADATA_PATH:?} inside {path:?}"))?;
		let definitions = jar.entry(UNPICK_DEFINITIONS_PATH)
			.with_context(|| anyhow!("could not find {UNPICK_DEFINITIONS_PATH:?} inside {path:?}"))?;

		Ok(UnpickLayer::new(UnpickData::parse(definitions.to_vec(), metadata)?))
	}

	pub fn data(&self) -> &UnpickData {
		&self.data
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::UnpickData;

	#[test]
	fn metadata_version_is_checked() -> anyhow::Result<()> {
		let good = br#"{"version": 1, "unpickGroup": "net.fabricmc.unpick", "unpickVersion": "2.3.0"}"#;
		let data = UnpickData::parse(b"v2".to_vec(), good)?;
		assert_eq!(data.metadata.unpick_group, "net.fabricmc.unpick");

		let bad = br#"{"version": 2, "unpickGroup": "g", "unpickVersion": "v"}"#;
		assert!(UnpickData::parse(Vec::new(), bad).is_err());
		Ok(())
	}
}
