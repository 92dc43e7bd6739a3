//! Replaying widen rules onto a mapping tree as comments.

use anyhow::Result;
use log::warn;
use warp::tree::mappings::MappingTree;
use crate::{AccessVerb, AccessWidenerVisitor};

/// Appends an `Access widened by <mod> to <verb>` comment to every mapping entry a
/// rule applies to.
///
/// The tree must be keyed by the namespace the visited rules are in. Since a member
/// rule also widens its owning class file, the owning class gets the comment as well.
///
/// Annotation is cosmetic: a rule whose target has no mapping entry is logged and
/// skipped, never an error. Appending is deduplicated per comment line, so replaying
/// the same rule file twice leaves the tree unchanged.
#[derive(Debug)]
pub struct MappingCommentVisitor<'a> {
	mod_id: String,
	tree: &'a mut MappingTree,
}

impl<'a> MappingCommentVisitor<'a> {
	pub fn new(mod_id: impl Into<String>, tree: &'a mut MappingTree) -> MappingCommentVisitor<'a> {
		MappingCommentVisitor { mod_id: mod_id.into(), tree }
	}

	fn comment(&self, verb: AccessVerb) -> String {
		format!("Access widened by {} to {}", self.mod_id, verb)
	}
}

impl AccessWidenerVisitor for MappingCommentVisitor<'_> {
	fn visit_header(&mut self, _namespace: &str) -> Result<()> {
		Ok(())
	}

	fn visit_class(&mut self, name: &str, verb: AccessVerb, _transitive: bool) -> Result<()> {
		let comment = self.comment(verb);

		let Some(class) = self.tree.get_class_mut(name) else {
			warn!("Failed to find class ({}) to mark access widened by mod ({})", name, self.mod_id);
			return Ok(());
		};
		class.append_comment_once(&comment);
		Ok(())
	}

	fn visit_method(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		// widening a member also widens the owning class file
		self.visit_class(owner, verb, transitive)?;
		let comment = self.comment(verb);

		let Some(class) = self.tree.get_class_mut(owner) else {
			return Ok(());
		};
		let Some(method) = class.get_method_mut(name, desc) else {
			warn!("Failed to find method ({}) in ({}) to mark access widened by mod ({})", name, owner, self.mod_id);
			return Ok(());
		};
		method.append_comment_once(&comment);
		Ok(())
	}

	fn visit_field(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		// widening a member also widens the owning class file
		self.visit_class(owner, verb, transitive)?;
		let comment = self.comment(verb);

		let Some(class) = self.tree.get_class_mut(owner) else {
			return Ok(());
		};
		let Some(field) = class.get_field_mut(name, desc) else {
			warn!("Failed to find field ({}) in ({}) to mark access widened by mod ({})", name, owner, self.mod_id);
			return Ok(());
		};
		field.append_comment_once(&comment);
		Ok(())
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::AccessWidenerVisitor;

	#[test]
	fn comments_land_on_member_and_class() -> anyhow::Result<()> {
		let mappings = "\
tiny	2	0	intermediary	named
c	class_1	pkg/Foo
	m	()V	method_1	doThing
";

		let mut tree = warp::tiny_v2::read(mappings.as_bytes())?;

		let mut visitor = super::MappingCommentVisitor::new("some-mod", &mut tree);
		visitor.visit_header("intermediary")?;
		visitor.visit_method("class_1", "method_1", "()V", crate::AccessVerb::Extendable, true)?;
		// replaying must not duplicate the comment
		visitor.visit_method("class_1", "method_1", "()V", crate::AccessVerb::Extendable, true)?;
		// an unknown target is skipped, not an error
		visitor.visit_class("class_2", crate::AccessVerb::Accessible, true)?;

		let class = tree.get_class("class_1").unwrap();
		assert_eq!(class.comment.as_deref(), Some("Access widened by some-mod to extendable"));
		assert_eq!(
			class.get_method("method_1", "()V").unwrap().comment.as_deref(),
			Some("Access widened by some-mod to extendable"),
		);
		Ok(())
	}
}
