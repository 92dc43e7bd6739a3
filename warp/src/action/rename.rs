use anyhow::{anyhow, Context, Result};
use crate::tree::mappings::MappingTree;

impl MappingTree {
	/// Renames a namespace (source or destination) in place. The data is untouched.
	///
	/// Mapping files authored against placeholder namespace names (such as the generic
	/// `source`/`target` fallbacks of format-detected files) are renamed to real
	/// namespaces with this before they are merged anywhere.
	pub fn rename_namespace(&mut self, from: &str, to: &str) -> Result<()> {
		self.namespaces.rename(from, to)
			.with_context(|| anyhow!("cannot rename namespace {from:?} of tree"))
	}
}

#[cfg(test)]
mod testing {
	#[test]
	fn rename_source_and_dst() -> anyhow::Result<()> {
		let input = "\
tiny	2	0	source	target
c	a	pkg/Foo
";

		let mut tree = crate::tiny_v2::read(input.as_bytes())?;
		tree.rename_namespace("source", "intermediary")?;
		tree.rename_namespace("target", "named")?;

		assert_eq!(tree.src_namespace(), Some("intermediary"));
		assert!(tree.namespace("named").is_ok());
		assert!(tree.rename_namespace("named", "intermediary").is_err());
		Ok(())
	}
}
