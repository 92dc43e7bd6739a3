use anyhow::{anyhow, Context, Result};
use warp::tree::mappings::MappingTree;
use crate::context::MappingContext;
use crate::layer::MappingsNamespace;

/// The official Mojang mappings: two ProGuard obfuscation maps (client and server),
/// both authored named→official and reversed into the official-keyed working tree.
#[derive(Debug, Clone)]
pub struct OfficialMojangLayer {
	client: MappingTree,
	server: MappingTree,
	license: Vec<String>,
}

impl OfficialMojangLayer {
	/// Both trees must be keyed by `named` with an `official` destination namespace,
	/// as [`warp::proguard::read`] produces them.
	pub fn new(client: MappingTree, server: MappingTree) -> OfficialMojangLayer {
		OfficialMojangLayer { client, server, license: Vec::new() }
	}

	pub(crate) async fn resolve(context: &MappingContext) -> Result<OfficialMojangLayer> {
		let client_url = context.client_mappings_url.as_deref()
			.with_context(|| anyhow!("no client mappings url is configured for version {:?}", context.minecraft_version))?;
		let server_url = context.server_mappings_url.as_deref()
			.with_context(|| anyhow!("no server mappings url is configured for version {:?}", context.minecraft_version))?;

		let client_path = context.download(client_url, &format!("{}.client.txt", context.minecraft_version)).await?;
		let server_path = context.download(server_url, &format!("{}.server.txt", context.minecraft_version)).await?;

		let client_text = std::fs::read_to_string(&client_path)
			.with_context(|| anyhow!("failed to read client mappings {client_path:?}"))?;
		let server_text = std::fs::read_to_string(&server_path)
			.with_context(|| anyhow!("failed to read server mappings {server_path:?}"))?;

		// the license rides along as leading comment lines
		let license = client_text.lines()
			.take_while(|line| line.starts_with('#'))
			.map(|line| line.to_owned())
			.collect();

		let named = MappingsNamespace::Named.as_str();
		let official = MappingsNamespace::Official.as_str();
		let client = warp::proguard::read(client_text.as_bytes(), named, official)
			.with_context(|| anyhow!("failed to parse client mappings {client_path:?}"))?;
		let server = warp::proguard::read(server_text.as_bytes(), named, official)
			.with_context(|| anyhow!("failed to parse server mappings {server_path:?}"))?;

		Ok(OfficialMojangLayer { client, server, license })
	}

	pub(crate) fn visit(&self, tree: &mut MappingTree) -> Result<()> {
		self.print_mappings_license();

		let official = MappingsNamespace::Official.as_str();
		tree.merge_from(&self.client.switch_source(official)?)?;
		tree.merge_from(&self.server.switch_source(official)?)?;
		Ok(())
	}

	fn print_mappings_license(&self) {
		log::warn!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
		log::warn!("Using of the official minecraft mappings is at your own risk!");
		log::warn!("Please make sure to read and understand the following license:");
		log::warn!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
		for line in &self.license {
			log::warn!("{line}");
		}
		log::warn!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
	}
}
