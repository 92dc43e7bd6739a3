//! Access widener jar processing: discovery of rule files in mod jars, collation,
//! class transformation dispatch and the hash based staleness check.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use heddle::collate::AccessWidener;
use heddle::comment::MappingCommentVisitor;
use heddle::filter::TransitiveOnlyFilter;
use heddle::remap::AccessWidenerRemapper;
use heddle::write::AccessWidenerWriter;
use heddle::{AccessVerb, AccessWidenerVisitor};
use warp::remapper::Remapper;
use warp::tree::mappings::MappingTree;
use crate::jar::MemJar;

/// The jar entry holding the hash of the rules a processed jar was widened with.
const HASH_ENTRY: &str = "aw.sha256";

#[derive(Deserialize)]
struct FabricModJson {
	id: String,
	#[serde(rename = "accessWidener")]
	access_widener: Option<String>,
}

/// One access widener rule file, either the local project one or one discovered in a
/// dependency mod jar.
///
/// The derived ordering sorts by `(mod id, path)`, which is what makes collation order
/// independent of discovery order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AccessWidenerFile {
	/// `None` for the local project rule file.
	pub mod_id: Option<String>,
	pub path: String,
	pub content: Vec<u8>,
}

impl AccessWidenerFile {
	pub fn local(path: impl Into<String>, content: Vec<u8>) -> AccessWidenerFile {
		AccessWidenerFile { mod_id: None, path: path.into(), content }
	}

	/// Reads the access widener a mod jar declares in its `fabric.mod.json`, if any.
	pub fn from_mod_jar(jar: &MemJar) -> Result<Option<AccessWidenerFile>> {
		let Some(mod_json) = jar.entry("fabric.mod.json") else {
			return Ok(None);
		};
		let mod_json: FabricModJson = serde_json::from_slice(mod_json)
			.with_context(|| anyhow!("failed to parse fabric.mod.json of {:?}", jar.name()))?;

		let Some(path) = mod_json.access_widener else {
			return Ok(None);
		};

		let content = jar.entry(&path)
			.with_context(|| anyhow!("could not find access widener file ({path}) defined in the fabric.mod.json file of {:?}", jar.name()))?
			.to_vec();

		Ok(Some(AccessWidenerFile {
			mod_id: Some(mod_json.id),
			path,
			content,
		}))
	}

	/// A human readable identity for log and comment lines.
	pub fn display_id(&self) -> &str {
		self.mod_id.as_deref().unwrap_or(&self.path)
	}
}

/// The external bytecode-rewrite contract: given one class file and the collated
/// rules, produce the widened class file.
pub trait ClassTransformer {
	fn transform(&self, class_name: &str, data: &[u8], widener: &AccessWidener) -> Result<Vec<u8>>;
}

/// Records only the header namespace of a rule file.
#[derive(Default)]
struct HeaderPeek {
	namespace: Option<String>,
}

impl AccessWidenerVisitor for HeaderPeek {
	fn visit_header(&mut self, namespace: &str) -> Result<()> {
		self.namespace = Some(namespace.to_owned());
		Ok(())
	}
	fn visit_class(&mut self, _name: &str, _verb: AccessVerb, _transitive: bool) -> Result<()> {
		Ok(())
	}
	fn visit_method(&mut self, _owner: &str, _name: &str, _desc: &str, _verb: AccessVerb, _transitive: bool) -> Result<()> {
		Ok(())
	}
	fn visit_field(&mut self, _owner: &str, _name: &str, _desc: &str, _verb: AccessVerb, _transitive: bool) -> Result<()> {
		Ok(())
	}
}

fn peek_namespace(file: &AccessWidenerFile) -> Result<String> {
	let mut peek = HeaderPeek::default();
	heddle::read::read(&file.content, &mut peek)
		.with_context(|| anyhow!("failed to read access widener {:?}", file.display_id()))?;
	peek.namespace
		.with_context(|| anyhow!("access widener {:?} has no header", file.display_id()))
}

/// Applies the collated widen rules of a project to output jars.
///
/// Rule files in a namespace other than the target namespace are rewritten through the
/// configured remapper; dependency rule files additionally pass the transitive-only
/// filter and only take part at all when transitive propagation is enabled.
pub struct AccessWidenerJarProcessor<'a, T> {
	transformer: &'a T,
	target_namespace: String,
	remapper: Option<(&'a dyn Remapper, String)>,
	local: Vec<AccessWidenerFile>,
	dependency: Vec<AccessWidenerFile>,
	transitive_enabled: bool,
}

impl<'a, T: ClassTransformer> AccessWidenerJarProcessor<'a, T> {
	pub fn new(transformer: &'a T, target_namespace: impl Into<String>) -> AccessWidenerJarProcessor<'a, T> {
		AccessWidenerJarProcessor {
			transformer,
			target_namespace: target_namespace.into(),
			remapper: None,
			local: Vec::new(),
			dependency: Vec::new(),
			transitive_enabled: false,
		}
	}

	/// Configures the remapper used for rule files not authored in the target
	/// namespace; `from` names the namespace the remapper maps out of.
	pub fn with_remapper(mut self, remapper: &'a dyn Remapper, from: impl Into<String>) -> Self {
		self.remapper = Some((remapper, from.into()));
		self
	}

	pub fn transitive_enabled(mut self, enabled: bool) -> Self {
		self.transitive_enabled = enabled;
		self
	}

	pub fn add_local_file(&mut self, file: AccessWidenerFile) {
		self.local.push(file);
	}

	pub fn add_dependency_file(&mut self, file: AccessWidenerFile) {
		self.dependency.push(file);
	}

	fn read_into(&self, file: &AccessWidenerFile, transitive_only: bool, widener: &mut AccessWidener) -> Result<()> {
		let namespace = peek_namespace(file)?;

		if namespace == self.target_namespace {
			if transitive_only {
				heddle::read::read(&file.content, &mut TransitiveOnlyFilter::new(&mut *widener))
			} else {
				heddle::read::read(&file.content, widener)
			}
		} else {
			let (remapper, from) = self.remapper
				.as_ref()
				.with_context(|| anyhow!(
					"access widener {:?} is in namespace {namespace:?}, not {:?}, and no remapper is configured",
					file.display_id(), self.target_namespace,
				))?;

			let chain = AccessWidenerRemapper::new(&mut *widener, *remapper, from.as_str(), self.target_namespace.as_str());
			if transitive_only {
				heddle::read::read(&file.content, &mut TransitiveOnlyFilter::new(chain))
			} else {
				let mut chain = chain;
				heddle::read::read(&file.content, &mut chain)
			}
		}
		.with_context(|| anyhow!("failed to read access widener {:?}", file.display_id()))
	}

	/// Merges all applicable rule files into one collated accumulator.
	pub fn collate(&self) -> Result<AccessWidener> {
		let mut widener = AccessWidener::new();

		let mut local: Vec<&AccessWidenerFile> = self.local.iter().collect();
		local.sort();
		for file in local {
			self.read_into(file, false, &mut widener)?;
		}

		if self.transitive_enabled {
			let mut dependency: Vec<&AccessWidenerFile> = self.dependency.iter().collect();
			dependency.sort();
			for file in dependency {
				self.read_into(file, true, &mut widener)?;
			}
		}

		Ok(widener)
	}

	/// The hex sha256 over the collated serialized rules; `None` when no rules apply.
	pub fn rules_hash(&self) -> Result<Option<String>> {
		let widener = self.collate()?;
		if widener.is_empty() {
			return Ok(None);
		}

		let mut writer = AccessWidenerWriter::new();
		widener.replay(&mut writer)?;

		let hash = Sha256::digest(writer.as_bytes());
		Ok(Some(hex::encode(hash)))
	}

	/// Whether the jar needs (re)processing.
	///
	/// A jar without a stored hash is only stale when there are rules to apply; an
	/// untouched jar with zero active rules is valid as it is.
	pub fn is_stale(&self, jar: &MemJar) -> Result<bool> {
		let hash = self.rules_hash()?;
		let stored = jar.entry(HASH_ENTRY);

		Ok(match (stored, hash) {
			(None, None) => false,
			(Some(stored), Some(hash)) => stored != hash.as_bytes(),
			_ => true,
		})
	}

	/// Widens every target class inside the jar and stamps the rules hash.
	///
	/// A rule naming a class the jar doesn't contain is a hard error; the rules claim
	/// to describe this jar, so a miss means the configuration is wrong.
	pub fn process(&self, jar: &mut MemJar) -> Result<()> {
		let widener = self.collate()?;
		if widener.is_empty() {
			return Ok(());
		}

		for class in widener.target_classes() {
			let entry_name = format!("{class}.class");
			let data = jar.entry(&entry_name)
				.with_context(|| anyhow!("access widener target class {class:?} does not exist in the jar"))?;

			let transformed = self.transformer.transform(class, data, &widener)
				.with_context(|| anyhow!("failed to widen access of class {class:?}"))?;
			jar.put_entry(entry_name, transformed);
		}

		let mut writer = AccessWidenerWriter::new();
		widener.replay(&mut writer)?;
		let hash = hex::encode(Sha256::digest(writer.as_bytes()));
		jar.put_entry(HASH_ENTRY, hash.into_bytes());

		log::debug!("applied {} access widener rules to {:?}", widener.rule_count(), jar.name());
		Ok(())
	}

	/// Replays the applicable rules onto a mapping tree as comments.
	///
	/// The tree must be keyed by the namespace the rule files are in; lookup misses
	/// only log. This runs against the tree, not the jar, so it can run before or
	/// after [`Self::process`].
	pub fn annotate(&self, tree: &mut MappingTree) -> Result<()> {
		for file in &self.local {
			let mut visitor = MappingCommentVisitor::new(file.display_id(), tree);
			heddle::read::read(&file.content, &mut visitor)
				.with_context(|| anyhow!("failed to read access widener {:?}", file.display_id()))?;
		}

		if self.transitive_enabled {
			for file in &self.dependency {
				let visitor = MappingCommentVisitor::new(file.display_id(), tree);
				heddle::read::read(&file.content, &mut TransitiveOnlyFilter::new(visitor))
					.with_context(|| anyhow!("failed to read access widener {:?}", file.display_id()))?;
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use heddle::collate::{AccessWidener, Target};
	use crate::jar::MemJar;
	use super::{AccessWidenerFile, AccessWidenerJarProcessor, ClassTransformer};

	/// Appends a marker byte instead of doing real bytecode surgery.
	struct MarkTransformer;

	impl ClassTransformer for MarkTransformer {
		fn transform(&self, _class_name: &str, data: &[u8], _widener: &AccessWidener) -> Result<Vec<u8>> {
			let mut out = data.to_vec();
			out.push(0xff);
			Ok(out)
		}
	}

	fn dependency_file() -> AccessWidenerFile {
		AccessWidenerFile {
			mod_id: Some("some-mod".to_owned()),
			path: "some.accesswidener".to_owned(),
			content: b"\
accessWidener\tv2\tnamed
transitive-accessible\tclass\tcom/example/Foo
accessible\tclass\tcom/example/Private
".to_vec(),
		}
	}

	#[test]
	fn transitive_gating() -> Result<()> {
		let transformer = MarkTransformer;

		let mut enabled = AccessWidenerJarProcessor::new(&transformer, "named").transitive_enabled(true);
		enabled.add_dependency_file(dependency_file());
		let collated = enabled.collate()?;
		assert!(collated.verbs(&Target::Class("com/example/Foo".to_owned())).next().is_some());
		// the mod didn't export this rule
		assert!(collated.verbs(&Target::Class("com/example/Private".to_owned())).next().is_none());

		let mut disabled = AccessWidenerJarProcessor::new(&transformer, "named").transitive_enabled(false);
		disabled.add_dependency_file(dependency_file());
		assert!(disabled.collate()?.is_empty());

		Ok(())
	}

	#[test]
	fn process_and_staleness() -> Result<()> {
		let transformer = MarkTransformer;
		let mut processor = AccessWidenerJarProcessor::new(&transformer, "named");
		processor.add_local_file(AccessWidenerFile::local("local.accesswidener", b"\
accessWidener\tv2\tnamed
accessible\tclass\tcom/example/Foo
".to_vec()));

		let mut jar = MemJar::new(None);
		jar.put_entry("com/example/Foo.class", vec![1, 2, 3]);

		assert!(processor.is_stale(&jar)?);
		processor.process(&mut jar)?;
		assert_eq!(jar.entry("com/example/Foo.class"), Some(&[1, 2, 3, 0xff][..]));
		assert!(!processor.is_stale(&jar)?);

		// a jar with zero rules and no stamp is valid as it is
		let empty = AccessWidenerJarProcessor::new(&transformer, "named");
		assert!(!empty.is_stale(&MemJar::new(None))?);
		assert!(empty.is_stale(&jar)?);

		Ok(())
	}

	#[test]
	fn missing_target_class_is_fatal() -> Result<()> {
		let transformer = MarkTransformer;
		let mut processor = AccessWidenerJarProcessor::new(&transformer, "named");
		processor.add_local_file(AccessWidenerFile::local("local.accesswidener", b"\
accessWidener\tv2\tnamed
accessible\tclass\tcom/example/Gone
".to_vec()));

		let mut jar = MemJar::new(None);
		assert!(processor.process(&mut jar).is_err());

		Ok(())
	}

	#[test]
	fn discovery_from_mod_jar() -> Result<()> {
		let mut jar = MemJar::new(Some("some-mod.jar".to_owned()));
		jar.put_entry("fabric.mod.json", br#"{"id": "some-mod", "accessWidener": "some.accesswidener"}"#.to_vec());
		jar.put_entry("some.accesswidener", b"accessWidener\tv2\tnamed\n".to_vec());

		let file = AccessWidenerFile::from_mod_jar(&jar)?.unwrap();
		assert_eq!(file.mod_id.as_deref(), Some("some-mod"));
		assert_eq!(file.path, "some.accesswidener");

		let mut plain = MemJar::new(None);
		plain.put_entry("fabric.mod.json", br#"{"id": "plain-mod"}"#.to_vec());
		assert!(AccessWidenerFile::from_mod_jar(&plain)?.is_none());

		Ok(())
	}
}
