use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use shuttle::jar::MemJar;
use warp::tree::mappings::MappingTree;
use crate::layer::MappingsNamespace;
use crate::layer::unpick::{UnpickData, UNPICK_DEFINITIONS_PATH, UNPICK_METADATA_PATH};

/// Fallback namespace names some tools write into tiny headers instead of real ones.
const NS_SOURCE_FALLBACK: &str = "source";
const NS_TARGET_FALLBACK: &str = "target";

const DEFAULT_MAPPING_PATH: &str = "mappings/mappings.tiny";

/// Reads a tiny file either bare or from inside a zip.
///
/// Zip detection is by content, not file name. `mapping_path` overrides the
/// `mappings/mappings.tiny` entry path and is an error for a bare file.
pub(crate) fn read_tiny(path: &Path, mapping_path: Option<&str>) -> Result<MappingTree> {
	let data = std::fs::read(path)
		.with_context(|| anyhow!("failed to read mappings file {path:?}"))?;

	if data.starts_with(b"PK") {
		let jar = MemJar::from_bytes(None, &data)?;
		let entry_path = mapping_path.unwrap_or(DEFAULT_MAPPING_PATH);
		let entry = jar.entry(entry_path)
			.with_context(|| anyhow!("could not find mappings at {entry_path:?} inside {path:?}"))?;
		warp::tiny_v2::read(entry)
			.with_context(|| anyhow!("failed to parse mappings at {entry_path:?} inside {path:?}"))
	} else {
		if let Some(entry_path) = mapping_path {
			bail!("a mapping path {entry_path:?} was given, but {path:?} is not a zip");
		}
		warp::tiny_v2::read(&data[..])
			.with_context(|| anyhow!("failed to parse mappings file {path:?}"))
	}
}

fn has_namespace(tree: &MappingTree, name: &str) -> bool {
	tree.src_namespace() == Some(name) || tree.namespaces.dst().iter().any(|x| x == name)
}

/// A custom tiny mappings file, bare or zipped, merged into the tree keyed by
/// `merge_namespace` (intermediary or named).
///
/// A zipped file may additionally carry unpick data under `extras/`.
#[derive(Debug, Clone)]
pub struct FileBasedLayer {
	tree: MappingTree,
	merge_namespace: MappingsNamespace,
	unpick: Option<UnpickData>,
}

impl FileBasedLayer {
	/// Reprojects `tree` onto `merge_namespace` if it is keyed differently.
	pub fn new(tree: MappingTree, merge_namespace: MappingsNamespace, unpick: Option<UnpickData>) -> Result<FileBasedLayer> {
		if merge_namespace == MappingsNamespace::Official {
			bail!("file mapping layers cannot merge on the official namespace");
		}

		let tree = if tree.src_namespace() == Some(merge_namespace.as_str()) {
			tree
		} else {
			tree.switch_source(merge_namespace.as_str())
				.context("file mappings lack their merge namespace")?
		};

		Ok(FileBasedLayer { tree, merge_namespace, unpick })
	}

	pub(crate) fn resolve(
		path: &Path,
		mapping_path: Option<&str>,
		fallback_source: &str,
		fallback_target: &str,
		merge_namespace: MappingsNamespace,
		unpick: bool,
	) -> Result<FileBasedLayer> {
		let mut tree = read_tiny(path, mapping_path)?;

		if has_namespace(&tree, NS_SOURCE_FALLBACK) {
			tree.rename_namespace(NS_SOURCE_FALLBACK, fallback_source)?;
		}
		if has_namespace(&tree, NS_TARGET_FALLBACK) {
			tree.rename_namespace(NS_TARGET_FALLBACK, fallback_target)?;
		}

		let unpick = if unpick {
			read_unpick(path)?
		} else {
			None
		};

		FileBasedLayer::new(tree, merge_namespace, unpick)
			.with_context(|| anyhow!("failed to prepare file mapping layer {path:?}"))
	}

	pub fn merge_namespace(&self) -> MappingsNamespace {
		self.merge_namespace
	}

	pub fn unpick_data(&self) -> Option<&UnpickData> {
		self.unpick.as_ref()
	}

	pub(crate) fn visit(&self, tree: &mut MappingTree) -> Result<()> {
		tree.merge_from(&self.tree)
	}
}

/// Unpick is only stored in zipped mapping files; a zip without the metadata entry
/// simply has none.
fn read_unpick(path: &Path) -> Result<Option<UnpickData>> {
	let data = std::fs::read(path)
		.with_context(|| anyhow!("failed to read mappings file {path:?}"))?;

	if !data.starts_with(b"PK") {
		bail!("unpick is only supported for zip file mapping layers, {path:?} is a bare file");
	}

	let jar = MemJar::from_bytes(None, &data)?;
	let Some(metadata) = jar.entry(UNPICK_METADATA_PATH) else {
		return Ok(None);
	};
	let definitions = jar.entry(UNPICK_DEFINITIONS_PATH)
		.with_context(|| anyhow!("{path:?} has unpick metadata but no {UNPICK_DEFINITIONS_PATH:?}"))?;

	Ok(Some(UnpickData::parse(definitions.to_vec(), metadata)?))
}
