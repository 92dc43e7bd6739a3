use anyhow::{Context, Result};
use warp::tree::mappings::MappingTree;
use crate::context::MappingContext;
use crate::layer::MappingsNamespace;
use crate::layer::file_based::read_tiny;

/// The base layer: the published official→intermediary mappings.
///
/// Always the first layer of a spec; it defines the class skeleton every naming layer
/// attaches to. A `named` column equal to the intermediary one is synthesized so later
/// layers always have a named column to write over.
#[derive(Debug, Clone)]
pub struct IntermediaryLayer {
	tree: MappingTree,
}

impl IntermediaryLayer {
	pub fn new(tree: MappingTree) -> IntermediaryLayer {
		IntermediaryLayer { tree }
	}

	pub(crate) async fn resolve(context: &MappingContext) -> Result<IntermediaryLayer> {
		let file_name = MappingContext::file_name_of(&context.intermediary_url);
		let path = context.download(&context.intermediary_url, file_name).await?;

		let tree = read_tiny(&path, None)
			.with_context(|| format!("failed to read intermediary mappings of version {:?}", context.minecraft_version))?;

		Ok(IntermediaryLayer::new(tree))
	}

	pub(crate) fn visit(&self, tree: &mut MappingTree) -> Result<()> {
		let mut own = self.tree.clone();
		own.complete_namespace(MappingsNamespace::Named.as_str(), MappingsNamespace::Intermediary.as_str())?;
		tree.merge_from(&own)
	}
}
