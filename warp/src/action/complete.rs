use anyhow::{bail, Context, Result};
use crate::tree::mappings::MappingTree;
use crate::tree::names::Namespace;

/// Where completion reads its fallback names from: the tree key itself, or one of the
/// destination columns.
enum Source {
	Key,
	Ns(Namespace),
}

impl MappingTree {
	/// Fills in missing names of the `target` namespace by copying them from `source`.
	///
	/// The `target` namespace is declared if the tree doesn't have it yet. Entries that
	/// already carry a `target` name are left alone. Entries lacking a `source` name stay
	/// incomplete.
	///
	/// This is what synthesizes an intermediary namespace equal to the named one for
	/// game versions that never got published intermediary mappings, and what gives the
	/// base layer a named column before any naming layer ran.
	pub fn complete_namespace(&mut self, target: &str, source: &str) -> Result<()> {
		if target == source {
			bail!("cannot complete namespace {target:?} from itself");
		}

		let source = if self.src_namespace() == Some(source) {
			Source::Key
		} else {
			Source::Ns(self.namespace(source).context("completion source namespace")?)
		};
		let target = self.ensure_dst(target)?;

		for class in self.classes.values_mut() {
			if class.dst.get(target).is_none() {
				let name = match source {
					Source::Key => Some(class.src.clone()),
					Source::Ns(ns) => class.dst.get(ns).map(|x| x.to_owned()),
				};
				if let Some(name) = name {
					class.dst.set(target, name);
				}
			}

			for field in class.fields.values_mut() {
				if field.dst.get(target).is_none() {
					let name = match source {
						Source::Key => Some(field.src.name.clone()),
						Source::Ns(ns) => field.dst.get(ns).map(|x| x.to_owned()),
					};
					if let Some(name) = name {
						field.dst.set(target, name);
					}
				}
			}

			for method in class.methods.values_mut() {
				if method.dst.get(target).is_none() {
					let name = match source {
						Source::Key => Some(method.src.name.clone()),
						Source::Ns(ns) => method.dst.get(ns).map(|x| x.to_owned()),
					};
					if let Some(name) = name {
						method.dst.set(target, name);
					}
				}

				for parameter in method.parameters.values_mut() {
					if parameter.dst.get(target).is_none() {
						let name = match source {
							Source::Key => parameter.src.clone(),
							Source::Ns(ns) => parameter.dst.get(ns).map(|x| x.to_owned()),
						};
						if let Some(name) = name {
							parameter.dst.set(target, name);
						}
					}
				}
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;

	#[test]
	fn complete_from_key_and_from_column() -> anyhow::Result<()> {
		let input = "\
tiny	2	0	official	intermediary
c	a	class_1
	m	()V	a	method_1
c	b
";

		let mut tree = crate::tiny_v2::read(input.as_bytes())?;
		tree.complete_namespace("named", "intermediary")?;

		let named = tree.namespace("named")?;
		assert_eq!(tree.get_class("a").unwrap().dst.get(named), Some("class_1"));
		// class b has no intermediary name, so it stays incomplete
		assert_eq!(tree.get_class("b").unwrap().dst.get(named), None);

		tree.complete_namespace("extra", "official")?;
		let extra = tree.namespace("extra")?;
		assert_eq!(tree.get_class("b").unwrap().dst.get(extra), Some("b"));
		Ok(())
	}
}
