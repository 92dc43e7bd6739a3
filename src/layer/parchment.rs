use std::path::Path;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use shuttle::jar::MemJar;
use warp::tree::mappings::MappingTree;

const PARCHMENT_JSON_PATH: &str = "parchment.json";

/// The parchment export format: parameter names and javadoc, keyed by the names of the
/// official Mojang mappings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParchmentTreeV1 {
	pub version: String,
	#[serde(default)]
	pub classes: Vec<ParchmentClass>,
	#[serde(default)]
	pub packages: Vec<ParchmentPackage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParchmentClass {
	pub name: String,
	#[serde(default)]
	pub fields: Vec<ParchmentField>,
	#[serde(default)]
	pub methods: Vec<ParchmentMethod>,
	#[serde(default)]
	pub javadoc: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParchmentField {
	pub name: String,
	pub descriptor: String,
	#[serde(default)]
	pub javadoc: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParchmentMethod {
	pub name: String,
	pub descriptor: String,
	#[serde(default)]
	pub parameters: Vec<ParchmentParameter>,
	#[serde(default)]
	pub javadoc: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParchmentParameter {
	pub index: usize,
	pub name: String,
	pub javadoc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParchmentPackage {
	pub name: String,
	#[serde(default)]
	pub javadoc: Vec<String>,
}

/// A parchment doc layer: javadoc comments and parameter names laid over the tree the
/// Mojang layer produced, which is why it must come after that layer.
#[derive(Debug, Clone)]
pub struct ParchmentLayer {
	tree: ParchmentTreeV1,
	remove_prefix: bool,
}

impl ParchmentLayer {
	pub fn new(tree: ParchmentTreeV1, remove_prefix: bool) -> ParchmentLayer {
		ParchmentLayer { tree, remove_prefix }
	}

	pub(crate) fn resolve(path: &Path, remove_prefix: bool) -> Result<ParchmentLayer> {
		let data = std::fs::read(path)
			.with_context(|| anyhow!("failed to read parchment file {path:?}"))?;

		let json = if data.starts_with(b"PK") {
			let jar = MemJar::from_bytes(None, &data)?;
			jar.entry(PARCHMENT_JSON_PATH)
				.with_context(|| anyhow!("could not find {PARCHMENT_JSON_PATH:?} inside {path:?}"))?
				.to_vec()
		} else {
			data
		};

		let tree = serde_json::from_slice(&json)
			.with_context(|| anyhow!("failed to parse parchment file {path:?}"))?;

		Ok(ParchmentLayer::new(tree, remove_prefix))
	}

	/// The tree here is the named-keyed accumulator; parchment names and descriptors
	/// match its keys directly, so no reprojection happens for this layer.
	pub(crate) fn visit(&self, tree: &mut MappingTree) -> Result<()> {
		for class in &self.tree.classes {
			let c = tree.add_class(&class.name);

			if !class.javadoc.is_empty() {
				c.append_comment_once(&class.javadoc.join("\n"));
			}

			for field in &class.fields {
				let f = c.add_field(&field.name, &field.descriptor);
				if !field.javadoc.is_empty() {
					f.append_comment_once(&field.javadoc.join("\n"));
				}
			}

			for method in &class.methods {
				let m = c.add_method(&method.name, &method.descriptor);
				if !method.javadoc.is_empty() {
					m.append_comment_once(&method.javadoc.join("\n"));
				}

				for parameter in &method.parameters {
					let p = m.add_parameter(parameter.index);
					p.src = Some(self.parameter_name(&parameter.name));
					if let Some(javadoc) = &parameter.javadoc {
						p.comment = Some(javadoc.clone());
					}
				}
			}
		}

		Ok(())
	}

	/// Parchment prefixes parameter names with `p` (`pName`); strip and decapitalize
	/// unless configured to keep them.
	fn parameter_name(&self, name: &str) -> String {
		if self.remove_prefix {
			if let Some(rest) = name.strip_prefix('p') {
				let mut chars = rest.chars();
				if let Some(first) = chars.next() {
					if first.is_ascii_uppercase() {
						return first.to_ascii_lowercase().to_string() + chars.as_str();
					}
				}
			}
		}
		name.to_owned()
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::ParchmentLayer;

	const PARCHMENT: &str = r#"{
		"version": "1.1.0",
		"classes": [
			{
				"name": "pkg/FooBar",
				"javadoc": ["A thing.", "Mutable."],
				"methods": [
					{
						"name": "doThing",
						"descriptor": "(I)V",
						"javadoc": ["Does the thing."],
						"parameters": [
							{"index": 1, "name": "pCount", "javadoc": "how often"}
						]
					}
				]
			}
		]
	}"#;

	#[test]
	fn javadoc_and_parameters_land_in_the_tree() -> anyhow::Result<()> {
		let parchment = serde_json::from_str(PARCHMENT)?;
		let layer = ParchmentLayer::new(parchment, true);

		let input = "\
tiny	2	0	named	intermediary
c	pkg/FooBar	class_1
	m	(I)V	doThing	method_1
";
		let mut tree = warp::tiny_v2::read(input.as_bytes())?;
		layer.visit(&mut tree)?;

		let class = tree.get_class("pkg/FooBar").ok_or_else(|| anyhow::anyhow!("no class"))?;
		assert_eq!(class.comment.as_deref(), Some("A thing.\nMutable."));

		let method = class.get_method("doThing", "(I)V").ok_or_else(|| anyhow::anyhow!("no method"))?;
		assert_eq!(method.comment.as_deref(), Some("Does the thing."));

		let parameter = method.parameters.get(&1).ok_or_else(|| anyhow::anyhow!("no parameter"))?;
		assert_eq!(parameter.src.as_deref(), Some("count"));
		assert_eq!(parameter.comment.as_deref(), Some("how often"));
		Ok(())
	}

	#[test]
	fn prefixes_can_be_kept() -> anyhow::Result<()> {
		let parchment = serde_json::from_str(PARCHMENT)?;
		let layer = ParchmentLayer::new(parchment, false);

		let mut tree = warp::tree::mappings::MappingTree::new();
		tree.ensure_src("named")?;
		layer.visit(&mut tree)?;

		let parameter = tree.get_class("pkg/FooBar")
			.and_then(|c| c.get_method("doThing", "(I)V"))
			.and_then(|m| m.parameters.get(&1))
			.ok_or_else(|| anyhow::anyhow!("no parameter"))?;
		assert_eq!(parameter.src.as_deref(), Some("pCount"));
		Ok(())
	}
}
