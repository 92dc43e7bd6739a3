//! Declarative layer specs and the versioned spec list they form.

use std::fmt::Write;
use std::path::PathBuf;
use anyhow::Result;
use sha2::{Digest, Sha256};
use crate::context::MappingContext;
use crate::layer::{MappingLayer, MappingsNamespace};
use crate::layer::file_based::FileBasedLayer;
use crate::layer::intermediary::IntermediaryLayer;
use crate::layer::mojmap::OfficialMojangLayer;
use crate::layer::parchment::ParchmentLayer;
use crate::layer::signature_fix::SignatureFixLayer;
use crate::layer::unpick::UnpickLayer;

/// The declarative form of one layer, before any file was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSpec {
	Intermediary,
	OfficialMojang,
	Parchment {
		path: PathBuf,
		/// Strip the `p` prefix off parameter names (`pCount` → `count`).
		remove_prefix: bool,
	},
	FileBased {
		path: PathBuf,
		/// Entry path inside a zip; `None` means a bare tiny file or the default
		/// `mappings/mappings.tiny` entry.
		mapping_path: Option<String>,
		fallback_source: String,
		fallback_target: String,
		merge_namespace: MappingsNamespace,
		unpick: bool,
	},
	SignatureFix {
		path: PathBuf,
	},
	Unpick {
		path: PathBuf,
	},
}

impl LayerSpec {
	pub(crate) async fn resolve(&self, context: &MappingContext) -> Result<MappingLayer> {
		Ok(match self {
			LayerSpec::Intermediary => MappingLayer::Intermediary(IntermediaryLayer::resolve(context).await?),
			LayerSpec::OfficialMojang => MappingLayer::OfficialMojang(OfficialMojangLayer::resolve(context).await?),
			LayerSpec::Parchment { path, remove_prefix } =>
				MappingLayer::Parchment(ParchmentLayer::resolve(path, *remove_prefix)?),
			LayerSpec::FileBased { path, mapping_path, fallback_source, fallback_target, merge_namespace, unpick } =>
				MappingLayer::FileBased(FileBasedLayer::resolve(
					path, mapping_path.as_deref(), fallback_source, fallback_target, *merge_namespace, *unpick,
				)?),
			LayerSpec::SignatureFix { path } => MappingLayer::SignatureFix(SignatureFixLayer::resolve(path)?),
			LayerSpec::Unpick { path } => MappingLayer::Unpick(UnpickLayer::resolve(path)?),
		})
	}

	/// A stable textual form, hashed into the spec version. Every field that changes
	/// the produced bundle must show up here.
	fn describe(&self, out: &mut String) {
		// infallible, String::write_fmt never errors
		let _ = match self {
			LayerSpec::Intermediary => write!(out, "intermediary"),
			LayerSpec::OfficialMojang => write!(out, "mojang"),
			LayerSpec::Parchment { path, remove_prefix } =>
				write!(out, "parchment\t{}\t{remove_prefix}", path.display()),
			LayerSpec::FileBased { path, mapping_path, fallback_source, fallback_target, merge_namespace, unpick } =>
				write!(out, "file\t{}\t{}\t{fallback_source}\t{fallback_target}\t{merge_namespace}\t{unpick}",
					path.display(), mapping_path.as_deref().unwrap_or("")),
			LayerSpec::SignatureFix { path } => write!(out, "signature-fix\t{}", path.display()),
			LayerSpec::Unpick { path } => write!(out, "unpick\t{}", path.display()),
		};
	}
}

/// An ordered, immutable list of layer specs.
///
/// The intermediary base layer is always first; the builder puts it there. The version
/// string is a content hash over the layer list, so two specs naming the same layers
/// share one cached bundle and any spec change produces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredMappingSpec {
	layers: Vec<LayerSpec>,
}

impl LayeredMappingSpec {
	pub fn builder() -> LayeredMappingSpecBuilder {
		LayeredMappingSpecBuilder::default()
	}

	pub fn layers(&self) -> &[LayerSpec] {
		&self.layers
	}

	pub fn version(&self) -> String {
		let mut hasher = Sha256::new();
		for layer in &self.layers {
			let mut line = String::new();
			layer.describe(&mut line);
			hasher.update(line.as_bytes());
			hasher.update([0]);
		}
		let hash = hex::encode(hasher.finalize());
		format!("layered+hash.{}", &hash[..16])
	}
}

#[derive(Debug, Default)]
pub struct LayeredMappingSpecBuilder {
	layers: Vec<LayerSpec>,
}

impl LayeredMappingSpecBuilder {
	pub fn add_layer(mut self, layer: LayerSpec) -> LayeredMappingSpecBuilder {
		self.layers.push(layer);
		self
	}

	pub fn official_mojang(self) -> LayeredMappingSpecBuilder {
		self.add_layer(LayerSpec::OfficialMojang)
	}

	pub fn parchment(self, path: impl Into<PathBuf>, remove_prefix: bool) -> LayeredMappingSpecBuilder {
		self.add_layer(LayerSpec::Parchment { path: path.into(), remove_prefix })
	}

	pub fn file(self, path: impl Into<PathBuf>) -> LayeredMappingSpecBuilder {
		self.add_layer(LayerSpec::FileBased {
			path: path.into(),
			mapping_path: None,
			fallback_source: MappingsNamespace::Intermediary.as_str().to_owned(),
			fallback_target: MappingsNamespace::Named.as_str().to_owned(),
			merge_namespace: MappingsNamespace::Intermediary,
			unpick: false,
		})
	}

	pub fn signature_fix(self, path: impl Into<PathBuf>) -> LayeredMappingSpecBuilder {
		self.add_layer(LayerSpec::SignatureFix { path: path.into() })
	}

	pub fn unpick(self, path: impl Into<PathBuf>) -> LayeredMappingSpecBuilder {
		self.add_layer(LayerSpec::Unpick { path: path.into() })
	}

	/// Prepends the intermediary base layer and seals the list.
	pub fn build(self) -> LayeredMappingSpec {
		let mut layers = vec![LayerSpec::Intermediary];
		layers.extend(self.layers.into_iter().filter(|x| *x != LayerSpec::Intermediary));
		LayeredMappingSpec { layers }
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::{LayerSpec, LayeredMappingSpec};

	#[test]
	fn intermediary_is_always_the_base() {
		let spec = LayeredMappingSpec::builder()
			.official_mojang()
			.build();
		assert_eq!(spec.layers()[0], LayerSpec::Intermediary);
		assert_eq!(spec.layers().len(), 2);

		// an explicitly added intermediary doesn't duplicate the base
		let spec = LayeredMappingSpec::builder()
			.add_layer(LayerSpec::Intermediary)
			.official_mojang()
			.build();
		assert_eq!(spec.layers().len(), 2);
	}

	#[test]
	fn version_hashes_the_layer_list() {
		let a = LayeredMappingSpec::builder().official_mojang().build();
		let b = LayeredMappingSpec::builder().official_mojang().build();
		let c = LayeredMappingSpec::builder()
			.official_mojang()
			.parchment("parchment.zip", true)
			.build();
		let d = LayeredMappingSpec::builder()
			.official_mojang()
			.parchment("parchment.zip", false)
			.build();

		assert_eq!(a.version(), b.version());
		assert_ne!(a.version(), c.version());
		assert_ne!(c.version(), d.version());
		assert!(a.version().starts_with("layered+hash."));
	}
}
