//! Hard validation of widen rules against a mapping tree.

use anyhow::{anyhow, bail, Context, Result};
use warp::tree::mappings::MappingTree;
use crate::{AccessVerb, AccessWidenerVisitor};

/// Rejects every rule whose target doesn't exist.
///
/// This is the correctness gate counterpart of [`crate::comment::MappingCommentVisitor`]:
/// where annotation downgrades a miss to a log line, validation fails the build,
/// naming the missing symbol. The tree must be keyed by the namespace the visited
/// rules are in.
#[derive(Debug)]
pub struct AccessWidenerValidator<'a> {
	tree: &'a MappingTree,
}

impl<'a> AccessWidenerValidator<'a> {
	pub fn new(tree: &'a MappingTree) -> AccessWidenerValidator<'a> {
		AccessWidenerValidator { tree }
	}
}

impl AccessWidenerVisitor for AccessWidenerValidator<'_> {
	fn visit_header(&mut self, _namespace: &str) -> Result<()> {
		Ok(())
	}

	fn visit_class(&mut self, name: &str, _verb: AccessVerb, _transitive: bool) -> Result<()> {
		if self.tree.get_class(name).is_none() {
			bail!("access widener rule targets unknown class {name:?}");
		}
		Ok(())
	}

	fn visit_method(&mut self, owner: &str, name: &str, desc: &str, _verb: AccessVerb, _transitive: bool) -> Result<()> {
		let class = self.tree.get_class(owner)
			.with_context(|| anyhow!("access widener rule targets method {name:?} of unknown class {owner:?}"))?;
		if class.get_method(name, desc).is_none() {
			bail!("access widener rule targets unknown method {name:?} {desc:?} in class {owner:?}");
		}
		Ok(())
	}

	fn visit_field(&mut self, owner: &str, name: &str, desc: &str, _verb: AccessVerb, _transitive: bool) -> Result<()> {
		let class = self.tree.get_class(owner)
			.with_context(|| anyhow!("access widener rule targets field {name:?} of unknown class {owner:?}"))?;
		if class.get_field(name, desc).is_none() {
			bail!("access widener rule targets unknown field {name:?} {desc:?} in class {owner:?}");
		}
		Ok(())
	}
}

#[cfg(test)]
mod testing {
	use crate::AccessWidenerVisitor;

	#[test]
	fn missing_symbols_are_fatal() -> anyhow::Result<()> {
		let mappings = "\
tiny	2	0	intermediary	named
c	class_1	pkg/Foo
	f	I	field_1	count
";

		let tree = warp::tiny_v2::read(mappings.as_bytes())?;
		let mut validator = super::AccessWidenerValidator::new(&tree);

		validator.visit_class("class_1", crate::AccessVerb::Accessible, false)?;
		validator.visit_field("class_1", "field_1", "I", crate::AccessVerb::Mutable, false)?;

		assert!(validator.visit_class("class_2", crate::AccessVerb::Accessible, false).is_err());
		assert!(validator.visit_field("class_1", "field_2", "I", crate::AccessVerb::Mutable, false).is_err());
		assert!(validator.visit_method("class_1", "method_1", "()V", crate::AccessVerb::Accessible, false).is_err());
		Ok(())
	}
}
