//! The mapping layers a spec can be built from.
//!
//! Each layer is one contribution to the final mapping tree, authored against the
//! namespace [`MappingLayer::source_namespace`] names. Layers are resolved once (see
//! [`crate::spec::LayerSpec::resolve`]), visited once into a working tree, and then only
//! queried for side-channel data.

use std::fmt::{Display, Formatter};
use anyhow::Result;
use indexmap::IndexMap;
use warp::tree::mappings::MappingTree;

pub mod intermediary;
pub mod mojmap;
pub mod parchment;
pub mod file_based;
pub mod signature_fix;
pub mod unpick;

pub use unpick::UnpickData;

/// The three naming schemes the pipeline moves between.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MappingsNamespace {
	/// The obfuscated names the game ships with.
	Official,
	/// Stable-across-versions identifiers.
	Intermediary,
	/// Human-readable names.
	Named,
}

impl MappingsNamespace {
	pub fn as_str(self) -> &'static str {
		match self {
			MappingsNamespace::Official => "official",
			MappingsNamespace::Intermediary => "intermediary",
			MappingsNamespace::Named => "named",
		}
	}
}

impl Display for MappingsNamespace {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
	Intermediary,
	OfficialMojang,
	Parchment,
	FileBased,
	SignatureFix,
	Unpick,
}

/// One resolved mapping layer, ready to visit a working tree.
#[derive(Debug, Clone)]
pub enum MappingLayer {
	Intermediary(intermediary::IntermediaryLayer),
	OfficialMojang(mojmap::OfficialMojangLayer),
	Parchment(parchment::ParchmentLayer),
	FileBased(file_based::FileBasedLayer),
	SignatureFix(signature_fix::SignatureFixLayer),
	Unpick(unpick::UnpickLayer),
}

impl MappingLayer {
	pub fn kind(&self) -> LayerKind {
		match self {
			MappingLayer::Intermediary(_) => LayerKind::Intermediary,
			MappingLayer::OfficialMojang(_) => LayerKind::OfficialMojang,
			MappingLayer::Parchment(_) => LayerKind::Parchment,
			MappingLayer::FileBased(_) => LayerKind::FileBased,
			MappingLayer::SignatureFix(_) => LayerKind::SignatureFix,
			MappingLayer::Unpick(_) => LayerKind::Unpick,
		}
	}

	/// The layer kinds that must appear earlier in the layer list.
	pub fn depends_on(&self) -> &'static [LayerKind] {
		match self.kind() {
			LayerKind::Intermediary | LayerKind::SignatureFix | LayerKind::Unpick => &[],
			LayerKind::OfficialMojang => &[LayerKind::Intermediary],
			LayerKind::Parchment => &[LayerKind::OfficialMojang],
			LayerKind::FileBased => &[LayerKind::Intermediary],
		}
	}

	/// The namespace this layer's contribution is keyed by.
	pub fn source_namespace(&self) -> &str {
		match self {
			MappingLayer::Intermediary(_) | MappingLayer::OfficialMojang(_) => MappingsNamespace::Official.as_str(),
			MappingLayer::Parchment(_) | MappingLayer::SignatureFix(_) | MappingLayer::Unpick(_) => MappingsNamespace::Named.as_str(),
			MappingLayer::FileBased(layer) => layer.merge_namespace().as_str(),
		}
	}

	/// Writes this layer's contribution into `tree`.
	///
	/// The caller must hand over a tree keyed by [`MappingLayer::source_namespace`]
	/// (or a fresh one without a source namespace yet).
	pub fn visit(&self, tree: &mut MappingTree) -> Result<()> {
		match self {
			MappingLayer::Intermediary(layer) => layer.visit(tree),
			MappingLayer::OfficialMojang(layer) => layer.visit(tree),
			MappingLayer::Parchment(layer) => layer.visit(tree),
			MappingLayer::FileBased(layer) => layer.visit(tree),
			// side-artifact layers don't touch names
			MappingLayer::SignatureFix(_) | MappingLayer::Unpick(_) => Ok(()),
		}
	}

	/// Record signature corrections, keyed by class name.
	pub fn signature_fixes(&self) -> Option<&IndexMap<String, String>> {
		match self {
			MappingLayer::SignatureFix(layer) => Some(layer.fixes()),
			MappingLayer::Intermediary(_) | MappingLayer::OfficialMojang(_) | MappingLayer::Parchment(_)
				| MappingLayer::FileBased(_) | MappingLayer::Unpick(_) => None,
		}
	}

	pub fn unpick_data(&self) -> Option<&UnpickData> {
		match self {
			MappingLayer::Unpick(layer) => Some(layer.data()),
			MappingLayer::FileBased(layer) => layer.unpick_data(),
			MappingLayer::Intermediary(_) | MappingLayer::OfficialMojang(_) | MappingLayer::Parchment(_)
				| MappingLayer::SignatureFix(_) => None,
		}
	}
}
