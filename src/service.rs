//! Build-scoped caching of parsed mapping trees.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use warp::tree::mappings::MappingTree;

/// `(mtime, size)` of the backing file. A changed fingerprint means the cached tree is
/// stale and must never be served.
type Fingerprint = (SystemTime, u64);

fn fingerprint_of(path: &Path) -> Result<Fingerprint> {
	let metadata = std::fs::metadata(path)
		.with_context(|| anyhow!("failed to stat mappings file {path:?}"))?;
	let modified = metadata.modified()
		.with_context(|| anyhow!("failed to read modification time of {path:?}"))?;
	Ok((modified, metadata.len()))
}

struct CacheEntry {
	fingerprint: Fingerprint,
	tree: Arc<MappingTree>,
}

/// Memoizes parsed tiny files per absolute path for the lifetime of one build.
///
/// Lookups verify the stored fingerprint against the file first, so an edited file is
/// reparsed instead of served stale. Safe to share between worker threads; a racing
/// duplicate parse would only waste work, never corrupt anything.
#[derive(Default)]
pub struct MappingsCache {
	entries: Mutex<IndexMap<PathBuf, CacheEntry>>,
}

impl MappingsCache {
	pub fn new() -> MappingsCache {
		MappingsCache::default()
	}

	pub fn get(&self, path: &Path) -> Result<Arc<MappingTree>> {
		let fingerprint = fingerprint_of(path)?;

		let mut entries = self.entries.lock()
			.map_err(|_| anyhow!("mappings cache lock poisoned"))?;

		if let Some(entry) = entries.get(path) {
			if entry.fingerprint == fingerprint {
				return Ok(entry.tree.clone());
			}
			log::debug!("mappings file {path:?} changed, reparsing");
		}

		let data = std::fs::read(path)
			.with_context(|| anyhow!("failed to read mappings file {path:?}"))?;
		let tree = Arc::new(warp::tiny_v2::read(&data[..])
			.with_context(|| anyhow!("failed to parse mappings file {path:?}"))?);

		entries.insert(path.to_owned(), CacheEntry { fingerprint, tree: tree.clone() });
		Ok(tree)
	}

	/// Drops everything; used when the build asks for a full dependency refresh.
	pub fn invalidate(&self) {
		if let Ok(mut entries) = self.entries.lock() {
			entries.clear();
		}
	}
}

#[cfg(test)]
mod testing {
	use std::path::PathBuf;
	use std::sync::Arc;
	use super::MappingsCache;

	fn scratch_file(name: &str, content: &str) -> anyhow::Result<PathBuf> {
		let path = std::env::temp_dir().join(format!("treadle-cache-test-{}-{name}", std::process::id()));
		std::fs::write(&path, content)?;
		Ok(path)
	}

	#[test]
	fn cached_until_the_file_changes() -> anyhow::Result<()> {
		let path = scratch_file("a.tiny", "tiny\t2\t0\tintermediary\tnamed\nc\tclass_1\tpkg/Foo\n")?;

		let cache = MappingsCache::new();
		let first = cache.get(&path)?;
		let second = cache.get(&path)?;
		assert!(Arc::ptr_eq(&first, &second));

		// longer content, so the size part of the fingerprint must differ
		std::fs::write(&path, "tiny\t2\t0\tintermediary\tnamed\nc\tclass_1\tpkg/FooBarBaz\n")?;
		let third = cache.get(&path)?;
		assert!(!Arc::ptr_eq(&first, &third));

		let class = third.get_class("class_1").ok_or_else(|| anyhow::anyhow!("no class"))?;
		assert_eq!(class.dst.get(third.namespace("named")?), Some("pkg/FooBarBaz"));

		std::fs::remove_file(&path)?;
		Ok(())
	}

	#[test]
	fn invalidate_clears_everything() -> anyhow::Result<()> {
		let path = scratch_file("b.tiny", "tiny\t2\t0\tintermediary\tnamed\nc\tclass_1\tpkg/Foo\n")?;

		let cache = MappingsCache::new();
		let first = cache.get(&path)?;
		cache.invalidate();
		let second = cache.get(&path)?;
		assert!(!Arc::ptr_eq(&first, &second));

		std::fs::remove_file(&path)?;
		Ok(())
	}
}
