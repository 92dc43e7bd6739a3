use anyhow::{Context, Result};
use crate::tree::mappings::MappingTree;
use crate::tree::names::{Names, Namespace};

fn reorder_names(names: &Names, table: &[Namespace]) -> Names {
	let mut out = Names::none();
	for (j, &old) in table.iter().enumerate() {
		if let Some(name) = names.get(old) {
			out.set(Namespace(j), name);
		}
	}
	out
}

impl MappingTree {
	/// Reorders (and possibly drops) the destination namespaces for serialization.
	///
	/// The source namespace, the entry keys and the descriptors are untouched; only the
	/// declared destination order changes. Namespaces not listed in `order` are dropped
	/// from the output.
	pub fn reorder_dst(&self, order: &[&str]) -> Result<MappingTree> {
		let table = order.iter()
			.map(|name| self.namespace(name))
			.collect::<Result<Vec<_>>>()
			.context("cannot reorder destination namespaces")?;

		let src = self.src_namespace()
			.context("cannot reorder a tree that has no source namespace")?;

		let mut out = MappingTree::new();
		out.ensure_src(src)?;
		out.namespaces.set_dst(order.iter().map(|x| (*x).to_owned()).collect());

		for class in self.classes.values() {
			let c = out.add_class(&class.src);
			c.comment = class.comment.clone();
			c.dst = reorder_names(&class.dst, &table);

			for field in class.fields.values() {
				let f = c.add_field(&field.src.name, &field.src.desc);
				f.comment = field.comment.clone();
				f.dst = reorder_names(&field.dst, &table);
			}

			for method in class.methods.values() {
				let m = c.add_method(&method.src.name, &method.src.desc);
				m.comment = method.comment.clone();
				m.dst = reorder_names(&method.dst, &table);

				for parameter in method.parameters.values() {
					let p = m.add_parameter(parameter.index);
					p.src = parameter.src.clone();
					p.comment = parameter.comment.clone();
					p.dst = reorder_names(&parameter.dst, &table);
				}
			}
		}

		Ok(out)
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;

	#[test]
	fn reorder_to_single_column() -> anyhow::Result<()> {
		let input = "\
tiny	2	0	intermediary	official	named
c	class_1	a	pkg/Foo
	m	(Lclass_1;)V	method_1	a	doThing
";
		let expected = "\
tiny	2	0	intermediary	named
c	class_1	pkg/Foo
	m	(Lclass_1;)V	method_1	doThing
";

		let tree = crate::tiny_v2::read(input.as_bytes())?;
		let actual = crate::tiny_v2::write_string(&tree.reorder_dst(&["named"])?)?;

		assert_eq!(actual, expected);
		Ok(())
	}
}
