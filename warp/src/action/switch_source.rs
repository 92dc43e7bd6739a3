use anyhow::{anyhow, Context, Result};
use crate::remapper::Remapper;
use crate::tree::mappings::MappingTree;
use crate::tree::names::Namespace;

impl MappingTree {
	#[allow(clippy::tabs_in_doc_comments)]
	/// Rebuilds the tree so that the given namespace becomes the source namespace.
	///
	/// The old source namespace takes the destination slot the new source namespace
	/// vacates, so no names are lost for complete entries. Entries that have no name in
	/// the new source namespace cannot be keyed by it and are dropped; run
	/// [`MappingTree::complete_namespace`] first if that is not wanted.
	///
	/// Since descriptors are stored in source-namespace names, they are rewritten to the
	/// new source namespace as part of the rebuild.
	///
	/// # Example
	/// A tree read from
	/// ```txt,ignore
	/// tiny	2	0	official	intermediary	named
	/// c	a	class_1	pkg/Foo
	/// 	m	(La;)V	a	method_1	doThing
	/// ```
	/// switched to `"intermediary"` reads back as
	/// ```txt,ignore
	/// tiny	2	0	intermediary	official	named
	/// c	class_1	a	pkg/Foo
	/// 	m	(Lclass_1;)V	method_1	a	doThing
	/// ```
	pub fn switch_source(&self, new_src: &str) -> Result<MappingTree> {
		let old_src = self.src_namespace()
			.context("cannot switch the source namespace of a tree that has none")?
			.to_owned();
		if old_src == new_src {
			return Ok(self.clone());
		}

		let key_ns = self.namespace(new_src)
			.with_context(|| anyhow!("cannot switch source namespace to {new_src:?}"))?;
		let remapper = self.class_remapper(&old_src, new_src)?;

		let mut out = MappingTree::new();
		out.ensure_src(new_src)?;

		let mut dst: Vec<String> = self.namespaces.dst().to_vec();
		dst[key_ns.index()] = old_src;
		out.namespaces.set_dst(dst);

		for class in self.classes.values() {
			let Some(new_key) = class.dst.get(key_ns) else {
				continue;
			};

			let c = out.add_class(new_key);
			c.comment = class.comment.clone();
			for (i, name) in class.dst.iter() {
				if i != key_ns.index() {
					c.dst.set(Namespace(i), name);
				}
			}
			c.dst.set(key_ns, &*class.src);

			for field in class.fields.values() {
				let Some(new_name) = field.dst.get(key_ns) else {
					continue;
				};
				let desc = remapper.map_desc(&field.src.desc)
					.with_context(|| anyhow!("failed to remap descriptor of field {:?} in class {:?}", field.src, class.src))?;

				let f = c.add_field(new_name, &desc);
				f.comment = field.comment.clone();
				for (i, name) in field.dst.iter() {
					if i != key_ns.index() {
						f.dst.set(Namespace(i), name);
					}
				}
				f.dst.set(key_ns, &*field.src.name);
			}

			for method in class.methods.values() {
				let Some(new_name) = method.dst.get(key_ns) else {
					continue;
				};
				let desc = remapper.map_desc(&method.src.desc)
					.with_context(|| anyhow!("failed to remap descriptor of method {:?} in class {:?}", method.src, class.src))?;

				let m = c.add_method(new_name, &desc);
				m.comment = method.comment.clone();
				for (i, name) in method.dst.iter() {
					if i != key_ns.index() {
						m.dst.set(Namespace(i), name);
					}
				}
				m.dst.set(key_ns, &*method.src.name);

				for parameter in method.parameters.values() {
					let p = m.add_parameter(parameter.index);
					p.comment = parameter.comment.clone();
					p.src = parameter.dst.get(key_ns).map(|x| x.to_owned());
					for (i, name) in parameter.dst.iter() {
						if i != key_ns.index() {
							p.dst.set(Namespace(i), name);
						}
					}
					if let Some(old_src_name) = &parameter.src {
						p.dst.set(key_ns, old_src_name);
					} else {
						p.dst.clear(key_ns);
					}
				}
			}
		}

		Ok(out)
	}
}

#[cfg(test)]
mod testing {
	use crate::tree::mappings::MappingTree;

	#[test]
	fn switching_twice_is_a_round_trip() -> anyhow::Result<()> {
		let input = "\
tiny	2	0	official	intermediary	named
c	a	class_1	pkg/Foo
	f	I	a	field_1	count
	m	(La;)V	a	method_1	doThing
c	b	class_2	pkg/Bar
";

		let tree = crate::tiny_v2::read(input.as_bytes())?;
		let there = tree.switch_source("intermediary")?;
		let back = there.switch_source("official")?;

		assert_eq!(tree, back);
		Ok(())
	}
}
