//! Writing the distributable mapping bundle zip.

use std::io::{Cursor, Write};
use std::path::Path;
use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use warp::tree::mappings::MappingTree;
use warp::tree::names::Namespace;
use zip::ZipWriter;
use zip::write::FileOptions;
use crate::layer::{MappingsNamespace, UnpickData};
use crate::layer::signature_fix::SIGNATURE_FIXES_PATH;
use crate::layer::unpick::{UNPICK_DEFINITIONS_PATH, UNPICK_METADATA_PATH};

pub const MAPPINGS_PATH: &str = "mappings/mappings.tiny";

/// Gives `<init>` methods their name in every destination namespace.
///
/// ProGuard files don't list constructors, so the merged tree can hold `<init>` methods
/// with gaps; consumers of the bundle expect a name in every column.
fn complete_constructors(tree: &mut MappingTree) {
	let namespaces: Vec<Namespace> = tree.namespaces.dst().iter()
		.filter_map(|name| tree.namespace(name).ok())
		.collect();

	for class in tree.classes.values_mut() {
		for method in class.methods.values_mut() {
			if method.src.name == "<init>" {
				for ns in &namespaces {
					if method.dst.get(*ns).is_none() {
						method.dst.set(*ns, "<init>");
					}
				}
			}
		}
	}
}

/// Writes the bundle zip for a processed tree.
///
/// The stored mappings are keyed by intermediary with named as the only destination
/// namespace, matching what the remapping side of the toolchain consumes. On failure
/// no partially-written output survives.
pub fn write_bundle(
	tree: &MappingTree,
	signature_fixes: Option<&IndexMap<String, String>>,
	unpick: Option<&UnpickData>,
	path: &Path,
) -> Result<()> {
	let result = build(tree, signature_fixes, unpick)
		.and_then(|data| std::fs::write(path, data)
			.with_context(|| anyhow!("failed to write mapping bundle to {path:?}")));

	if result.is_err() {
		let _ = std::fs::remove_file(path);
	}
	result
}

fn build(
	tree: &MappingTree,
	signature_fixes: Option<&IndexMap<String, String>>,
	unpick: Option<&UnpickData>,
) -> Result<Vec<u8>> {
	let mut tree = tree.clone();
	complete_constructors(&mut tree);
	let tree = tree.switch_source(MappingsNamespace::Intermediary.as_str())?;
	let tree = tree.reorder_dst(&[MappingsNamespace::Named.as_str()])?;
	let mappings = warp::tiny_v2::write_vec(&tree)?;

	let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

	zip.start_file(MAPPINGS_PATH, FileOptions::<()>::default())?;
	zip.write_all(&mappings)?;

	if let Some(fixes) = signature_fixes {
		zip.start_file(SIGNATURE_FIXES_PATH, FileOptions::<()>::default())?;
		zip.write_all(&serde_json::to_vec(fixes)?)?;
	}

	if let Some(unpick) = unpick {
		zip.start_file(UNPICK_DEFINITIONS_PATH, FileOptions::<()>::default())?;
		zip.write_all(&unpick.definitions)?;

		zip.start_file(UNPICK_METADATA_PATH, FileOptions::<()>::default())?;
		zip.write_all(&serde_json::to_vec(&unpick.metadata)?)?;
	}

	Ok(zip.finish()?.into_inner())
}
