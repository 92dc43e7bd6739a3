//! In-memory jars.

use std::fmt::{Debug, Formatter};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// A jar held fully in memory, entry by entry.
///
/// Entry order is preserved from the file that was read, and writing emits the entries
/// in stored order, so read-modify-write only changes the entries actually touched.
#[derive(Clone, Default)]
pub struct MemJar {
	name: Option<String>,
	entries: IndexMap<String, Vec<u8>>,
}

impl Debug for MemJar {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemJar")
			.field("name", &self.name)
			.field("entries", &self.entries.len())
			.finish()
	}
}

impl MemJar {
	pub fn new(name: Option<String>) -> MemJar {
		MemJar { name, entries: IndexMap::new() }
	}

	pub fn from_bytes(name: Option<String>, data: &[u8]) -> Result<MemJar> {
		let mut zip = ZipArchive::new(Cursor::new(data))?;

		let mut entries = IndexMap::new();
		for index in 0..zip.len() {
			let mut file = zip.by_index(index)?;
			if file.is_dir() {
				continue;
			}

			let mut vec = Vec::new();
			file.read_to_end(&mut vec)?;
			entries.insert(file.name().to_owned(), vec);
		}

		Ok(MemJar { name, entries })
	}

	pub fn from_path(path: impl AsRef<Path>) -> Result<MemJar> {
		let path = path.as_ref();
		let data = std::fs::read(path)
			.with_context(|| anyhow!("failed to read jar {path:?}"))?;
		let name = path.file_name().map(|x| x.to_string_lossy().into_owned());
		MemJar::from_bytes(name, &data)
			.with_context(|| anyhow!("failed to open jar {path:?}"))
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn entry(&self, name: &str) -> Option<&[u8]> {
		self.entries.get(name).map(|x| x.as_slice())
	}

	/// Stores an entry, replacing any existing entry of the same name.
	pub fn put_entry(&mut self, name: impl Into<String>, data: Vec<u8>) {
		self.entries.insert(name.into(), data);
	}

	pub fn entry_names(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(|x| x.as_str())
	}

	/// The class file entries, as `(class name, bytes)` pairs.
	pub fn classes(&self) -> impl Iterator<Item = (&str, &[u8])> {
		self.entries.iter()
			.filter_map(|(name, data)| {
				name.strip_suffix(".class").map(|class| (class, data.as_slice()))
			})
	}

	pub fn write_to(&self, writer: impl Write + Seek) -> Result<()> {
		let mut zip = ZipWriter::new(writer);

		for (name, data) in &self.entries {
			zip.start_file(name, FileOptions::<()>::default())?;
			zip.write_all(data)?;
		}

		zip.finish()?;
		Ok(())
	}

	pub fn to_vec(&self) -> Result<Vec<u8>> {
		let mut cursor = Cursor::new(Vec::new());
		self.write_to(&mut cursor)?;
		Ok(cursor.into_inner())
	}
}

#[cfg(test)]
mod testing {
	use super::MemJar;

	#[test]
	fn jar_round_trip() -> anyhow::Result<()> {
		let mut jar = MemJar::new(Some("test.jar".to_owned()));
		jar.put_entry("pkg/Foo.class", vec![0xca, 0xfe, 0xba, 0xbe]);
		jar.put_entry("fabric.mod.json", b"{}".to_vec());

		let bytes = jar.to_vec()?;
		let back = MemJar::from_bytes(None, &bytes)?;

		assert_eq!(back.entry("pkg/Foo.class"), Some(&[0xca, 0xfe, 0xba, 0xbe][..]));
		assert_eq!(back.classes().count(), 1);
		assert_eq!(back.entry_names().count(), 2);
		Ok(())
	}
}
