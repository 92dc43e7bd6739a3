//! Folding resolved layers into one named-keyed mapping tree.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use warp::tree::mappings::MappingTree;
use crate::context::MappingContext;
use crate::layer::{MappingLayer, MappingsNamespace, UnpickData};
use crate::spec::LayeredMappingSpec;

pub struct LayeredMappingsProcessor {
	spec: LayeredMappingSpec,
	/// Set for game versions predating published intermediary mappings: the final tree
	/// gets an intermediary namespace synthesized from the named one.
	no_intermediate_mappings: bool,
}

impl LayeredMappingsProcessor {
	pub fn new(spec: LayeredMappingSpec, no_intermediate_mappings: bool) -> LayeredMappingsProcessor {
		LayeredMappingsProcessor { spec, no_intermediate_mappings }
	}

	pub fn spec(&self) -> &LayeredMappingSpec {
		&self.spec
	}

	/// Resolves every layer spec against the context, downloading whatever artifacts
	/// are missing from the working directory.
	pub async fn resolve_layers(&self, context: &MappingContext) -> Result<Vec<MappingLayer>> {
		let mut layers = Vec::with_capacity(self.spec.layers().len());
		for layer_spec in self.spec.layers() {
			layers.push(layer_spec.resolve(context).await?);
		}
		check_dependencies(&layers)?;
		Ok(layers)
	}

	/// Folds the layers, in order, into one tree keyed by the named namespace.
	///
	/// A layer authored against another namespace can't visit the accumulator directly;
	/// its contribution would land under the wrong keys. For those the accumulator is
	/// reprojected onto the layer's source namespace first, the layer visits that
	/// working tree, and the result is reprojected back onto named. Later layers win
	/// over earlier ones for the same slot.
	pub fn get_mappings(&self, layers: &[MappingLayer]) -> Result<MappingTree> {
		check_dependencies(layers)?;

		let named = MappingsNamespace::Named.as_str();
		let mut accumulator = MappingTree::new();

		for layer in layers {
			let source = layer.source_namespace();

			if source != named {
				let mut working = if accumulator.src_namespace().is_some() {
					accumulator.switch_source(source)?
				} else {
					// the very first layer starts from nothing
					MappingTree::new()
				};
				layer.visit(&mut working)?;
				accumulator = working.switch_source(named)?;
			} else {
				layer.visit(&mut accumulator)?;
			}
		}

		if self.no_intermediate_mappings {
			accumulator.complete_namespace(MappingsNamespace::Intermediary.as_str(), named)?;
		}

		Ok(accumulator)
	}

	/// Signature fixes of all contributing layers, merged; on a key collision the later
	/// layer wins. `None` when no layer carried any.
	pub fn get_signature_fixes(&self, layers: &[MappingLayer]) -> Option<IndexMap<String, String>> {
		let mut result: Option<IndexMap<String, String>> = None;
		for layer in layers {
			if let Some(fixes) = layer.signature_fixes() {
				result.get_or_insert_with(IndexMap::new)
					.extend(fixes.iter().map(|(k, v)| (k.clone(), v.clone())));
			}
		}
		result
	}

	pub fn get_unpick_data<'a>(&self, layers: &'a [MappingLayer]) -> Result<Option<&'a UnpickData>> {
		let mut result = None;
		for layer in layers {
			if let Some(data) = layer.unpick_data() {
				if result.is_some() {
					bail!("only one unpick layer is currently supported");
				}
				result = Some(data);
			}
		}
		Ok(result)
	}
}

/// Every dependency of a layer must be satisfied by a layer earlier in the list.
/// Violations abort before any layer visits anything.
fn check_dependencies(layers: &[MappingLayer]) -> Result<()> {
	for (index, layer) in layers.iter().enumerate() {
		for dependency in layer.depends_on() {
			if !layers[..index].iter().any(|x| x.kind() == *dependency) {
				bail!("layer {:?} depends on layer {:?}, which must come earlier in the layer list", layer.kind(), dependency);
			}
		}
	}
	Ok(())
}
