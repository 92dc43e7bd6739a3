use std::path::Path;
use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use shuttle::jar::MemJar;

pub(crate) const SIGNATURE_FIXES_PATH: &str = "extras/record_signatures.json";

/// Generic-signature corrections for records, a flat class name → signature map.
///
/// Doesn't contribute names; the map is pulled out after all layers visited and lands
/// in the bundle as `extras/record_signatures.json`.
#[derive(Debug, Clone)]
pub struct SignatureFixLayer {
	fixes: IndexMap<String, String>,
}

impl SignatureFixLayer {
	pub fn new(fixes: IndexMap<String, String>) -> SignatureFixLayer {
		SignatureFixLayer { fixes }
	}

	pub(crate) fn resolve(path: &Path) -> Result<SignatureFixLayer> {
		let jar = MemJar::from_path(path)?;

		let data = jar.entry(SIGNATURE_FIXES_PATH)
			.with_context(|| anyhow!("could not find {SIGNATURE_FIXES_PATH:?} inside {path:?}"))?;
		let fixes = serde_json::from_slice(data)
			.with_context(|| anyhow!("failed to parse signature fixes inside {path:?}"))?;

		Ok(SignatureFixLayer { fixes })
	}

	pub fn fixes(&self) -> &IndexMap<String, String> {
		&self.fixes
	}
}
