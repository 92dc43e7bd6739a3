//! The remap orchestration service wrapping an external symbol remapper engine.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use anyhow::{anyhow, bail, Result};
use indexmap::{IndexMap, IndexSet};
use warp::remapper::MemberRemapper;
use warp::tree::mappings::MappingTree;
use crate::jar::MemJar;

/// The external symbol remapper engine contract.
///
/// `read_class_path` may index asynchronously internally; the engine serializes remap
/// starts against pending reads itself, so the caller needs no explicit join. `finish`
/// releases engine resources.
pub trait RemapperEngine {
	fn read_class_path(&mut self, path: &Path) -> Result<()>;
	fn remap_jar(&mut self, input: &MemJar, remapper: &MemberRemapper) -> Result<MemJar>;
	fn finish(&mut self) -> Result<()>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
	Created,
	AcceptingInputs,
	Remapping,
	Closed,
}

/// A per-build shared handle around one remapper engine instance.
///
/// Inputs (classpath entries) may only be fed before the first remap operation is
/// observed; the classpath is deduplicated, so re-feeding a path is a no-op rather
/// than a duplicate read. Closing is idempotent.
///
/// Mapping providers are built from the held tree once per namespace pair and cached
/// for the lifetime of the service.
pub struct RemapService<E> {
	engine: E,
	mappings: Arc<MappingTree>,
	mappings_id: String,
	state: State,
	classpath: IndexSet<PathBuf>,
	providers: Mutex<IndexMap<String, Arc<MemberRemapper>>>,
}

impl<E: RemapperEngine> RemapService<E> {
	pub fn new(engine: E, mappings: Arc<MappingTree>, mappings_id: impl Into<String>) -> RemapService<E> {
		RemapService {
			engine,
			mappings,
			mappings_id: mappings_id.into(),
			state: State::Created,
			classpath: IndexSet::new(),
			providers: Mutex::new(IndexMap::new()),
		}
	}

	/// Builds (or returns the cached) remapper for one namespace pair.
	pub fn mappings_provider(&self, from: &str, to: &str) -> Result<Arc<MemberRemapper>> {
		let key = format!("{}:{from}>{to}", self.mappings_id);

		let mut providers = self.providers.lock()
			.map_err(|_| anyhow!("provider cache lock poisoned"))?;
		if let Some(provider) = providers.get(&key) {
			return Ok(provider.clone());
		}

		let provider = Arc::new(self.mappings.member_remapper(from, to)?);
		providers.insert(key, provider.clone());
		Ok(provider)
	}

	/// Feeds classpath entries to the engine, skipping entries fed before.
	pub fn read_classpath(&mut self, paths: &[PathBuf]) -> Result<()> {
		match self.state {
			State::Created => self.state = State::AcceptingInputs,
			State::AcceptingInputs => {},
			State::Remapping => bail!("cannot read classpath after remapping has started"),
			State::Closed => bail!("cannot read classpath on a closed remap service"),
		}

		for path in paths {
			if self.classpath.insert(path.clone()) {
				self.engine.read_class_path(path)?;
			}
		}
		Ok(())
	}

	/// Remaps one jar from namespace `from` to namespace `to`.
	pub fn remap_jar(&mut self, input: &MemJar, from: &str, to: &str) -> Result<MemJar> {
		match self.state {
			State::Created | State::AcceptingInputs | State::Remapping => self.state = State::Remapping,
			State::Closed => bail!("cannot remap with a closed remap service"),
		}

		let provider = self.mappings_provider(from, to)?;
		self.engine.remap_jar(input, &provider)
	}

	/// Releases the engine. Closing twice is a no-op.
	pub fn close(&mut self) -> Result<()> {
		if self.state == State::Closed {
			return Ok(());
		}
		self.state = State::Closed;
		self.engine.finish()
	}
}

#[cfg(test)]
mod testing {
	use std::path::{Path, PathBuf};
	use std::sync::Arc;
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use warp::remapper::{MemberRemapper, Remapper};
	use crate::jar::MemJar;
	use super::{RemapService, RemapperEngine};

	#[derive(Default)]
	struct FakeEngine {
		read: Vec<PathBuf>,
		remapped: usize,
		finished: usize,
	}

	impl RemapperEngine for FakeEngine {
		fn read_class_path(&mut self, path: &Path) -> Result<()> {
			self.read.push(path.to_owned());
			Ok(())
		}

		fn remap_jar(&mut self, input: &MemJar, remapper: &MemberRemapper) -> Result<MemJar> {
			self.remapped += 1;
			let mut out = MemJar::new(None);
			for (class, data) in input.classes() {
				out.put_entry(format!("{}.class", remapper.map_class(class)), data.to_vec());
			}
			Ok(out)
		}

		fn finish(&mut self) -> Result<()> {
			self.finished += 1;
			Ok(())
		}
	}

	fn mappings() -> Result<Arc<warp::tree::mappings::MappingTree>> {
		let input = "\
tiny	2	0	intermediary	named
c	class_1	pkg/Foo
";
		Ok(Arc::new(warp::tiny_v2::read(input.as_bytes())?))
	}

	#[test]
	fn classpath_dedupe_and_state_machine() -> Result<()> {
		let mut service = RemapService::new(FakeEngine::default(), mappings()?, "test-mappings");

		let a = PathBuf::from("a.jar");
		let b = PathBuf::from("b.jar");
		service.read_classpath(&[a.clone(), b.clone()])?;
		service.read_classpath(&[a.clone()])?;
		assert_eq!(service.engine.read, &[a, b]);

		let mut jar = MemJar::new(None);
		jar.put_entry("class_1.class", vec![1]);
		let out = service.remap_jar(&jar, "intermediary", "named")?;
		assert_eq!(out.entry("pkg/Foo.class"), Some(&[1][..]));

		// inputs are sealed once remapping was observed
		assert!(service.read_classpath(&[PathBuf::from("late.jar")]).is_err());

		service.close()?;
		service.close()?;
		assert_eq!(service.engine.finished, 1);
		assert!(service.remap_jar(&jar, "intermediary", "named").is_err());

		Ok(())
	}

	#[test]
	fn providers_are_cached_per_namespace_pair() -> Result<()> {
		let service = RemapService::new(FakeEngine::default(), mappings()?, "test-mappings");

		let first = service.mappings_provider("intermediary", "named")?;
		let second = service.mappings_provider("intermediary", "named")?;
		assert!(Arc::ptr_eq(&first, &second));

		let reversed = service.mappings_provider("named", "intermediary")?;
		assert!(!Arc::ptr_eq(&first, &reversed));

		Ok(())
	}
}
