//! Remappers for remapping class names, descriptors, fields and methods.
//!
//! A remapper answers the question "what is the name of X in namespace Y?". Remappers
//! are built from a [`MappingTree`] for a pair of namespaces via
//! [`MappingTree::class_remapper`] (classes and descriptors only) and
//! [`MappingTree::member_remapper`] (fields and methods as well).
//!
//! The built remappers own their lookup tables, so they stay usable after the tree they
//! were built from has been dropped or rebuilt. That is what lets the remap
//! orchestration layer cache them per namespace pair.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use crate::tree::mappings::{MappingTree, MemberKey};
use crate::tree::names::Namespace;

/// A remapper supporting class names, descriptors, and field/method names.
///
/// Implementors only need to define the `*_or_none` methods; the rest have default
/// implementations that fall back to the old name when no mapping exists.
pub trait Remapper {
	/// Maps a class name, if the mapping exists.
	fn map_class_or_none(&self, class: &str) -> Option<&str>;

	/// Maps a field name, if the mapping exists.
	fn map_field_or_none(&self, owner: &str, name: &str, desc: &str) -> Option<&str>;

	/// Maps a method name, if the mapping exists.
	fn map_method_or_none(&self, owner: &str, name: &str, desc: &str) -> Option<&str>;

	/// Maps a class name; if the mapping doesn't exist, returns the old name.
	fn map_class(&self, class: &str) -> String {
		self.map_class_or_none(class).unwrap_or(class).to_owned()
	}

	/// Maps a field name; if the mapping doesn't exist, returns the old name.
	fn map_field(&self, owner: &str, name: &str, desc: &str) -> String {
		self.map_field_or_none(owner, name, desc).unwrap_or(name).to_owned()
	}

	/// Maps a method name; if the mapping doesn't exist, returns the old name.
	fn map_method(&self, owner: &str, name: &str, desc: &str) -> String {
		self.map_method_or_none(owner, name, desc).unwrap_or(name).to_owned()
	}

	/// Maps a field or method descriptor.
	///
	/// Relies on the fact that class names without a mapping are copied over unchanged.
	fn map_desc(&self, desc: &str) -> Result<String> {
		map_desc(self, desc)
	}
}

/// Maps every `L<class>;` segment of a descriptor through the remapper.
fn map_desc(remapper: &(impl Remapper + ?Sized), desc: &str) -> Result<String> {
	let mut s = String::with_capacity(desc.len());

	let mut iter = desc.chars();
	while let Some(ch) = iter.next() {
		s.push(ch);

		if ch == 'L' {
			let mut class_name = String::new();
			let mut terminated = false;

			for ch in iter.by_ref() {
				if ch == ';' {
					terminated = true;
					break;
				}
				class_name.push(ch);
			}
			if !terminated {
				bail!("descriptor {desc:?} has a missing semicolon somewhere");
			}

			s.push_str(&remapper.map_class(&class_name));
			s.push(';');
		}
	}

	Ok(s)
}

/// A remapper over class names only; built by [`MappingTree::class_remapper`].
#[derive(Debug)]
pub struct ClassRemapper {
	classes: IndexMap<String, String>,
}

impl Remapper for ClassRemapper {
	fn map_class_or_none(&self, class: &str) -> Option<&str> {
		self.classes.get(class).map(|x| x.as_str())
	}

	fn map_field_or_none(&self, _owner: &str, _name: &str, _desc: &str) -> Option<&str> {
		None
	}

	fn map_method_or_none(&self, _owner: &str, _name: &str, _desc: &str) -> Option<&str> {
		None
	}
}

#[derive(Debug)]
struct RemapperClass {
	name: String,
	fields: IndexMap<MemberKey, String>,
	methods: IndexMap<MemberKey, String>,
}

/// A remapper over classes, fields and methods; built by [`MappingTree::member_remapper`].
#[derive(Debug)]
pub struct MemberRemapper {
	classes: IndexMap<String, RemapperClass>,
}

impl Remapper for MemberRemapper {
	fn map_class_or_none(&self, class: &str) -> Option<&str> {
		self.classes.get(class).map(|x| x.name.as_str())
	}

	fn map_field_or_none(&self, owner: &str, name: &str, desc: &str) -> Option<&str> {
		self.classes.get(owner)?
			.fields
			.get(&MemberKey::new(name, desc))
			.map(|x| x.as_str())
	}

	fn map_method_or_none(&self, owner: &str, name: &str, desc: &str) -> Option<&str> {
		self.classes.get(owner)?
			.methods
			.get(&MemberKey::new(name, desc))
			.map(|x| x.as_str())
	}
}

/// Which column of the tree a namespace name refers to.
enum Column {
	Key,
	Ns(Namespace),
}

impl MappingTree {
	fn column(&self, name: &str) -> Result<Column> {
		if self.src_namespace() == Some(name) {
			Ok(Column::Key)
		} else {
			Ok(Column::Ns(self.namespace(name)?))
		}
	}

	fn class_name_in<'a>(&'a self, class: &'a crate::tree::mappings::ClassEntry, column: &Column) -> Option<&'a str> {
		match column {
			Column::Key => Some(&class.src),
			Column::Ns(ns) => class.dst.get(*ns),
		}
	}

	/// Builds a [`ClassRemapper`] mapping names of namespace `from` to namespace `to`.
	pub fn class_remapper(&self, from: &str, to: &str) -> Result<ClassRemapper> {
		let from = self.column(from).context("remapper source namespace")?;
		let to = self.column(to).context("remapper target namespace")?;

		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			if let (Some(from), Some(to)) = (self.class_name_in(class, &from), self.class_name_in(class, &to)) {
				classes.insert(from.to_owned(), to.to_owned());
			}
		}
		Ok(ClassRemapper { classes })
	}

	/// Builds a [`MemberRemapper`] mapping names of namespace `from` to namespace `to`.
	///
	/// Member lookup keys carry descriptors in the `from` namespace, so descriptors
	/// stored in the source namespace are rewritten while building.
	pub fn member_remapper(&self, from: &str, to: &str) -> Result<MemberRemapper> {
		let src = self.src_namespace()
			.context("cannot build a member remapper from a tree without a source namespace")?
			.to_owned();
		let from_remapper = if from == src {
			None
		} else {
			Some(self.class_remapper(&src, from)?)
		};

		let from_column = self.column(from).context("remapper source namespace")?;
		let to_column = self.column(to).context("remapper target namespace")?;

		let mut classes = IndexMap::new();
		for class in self.classes.values() {
			let (Some(name_from), Some(name_to)) = (self.class_name_in(class, &from_column), self.class_name_in(class, &to_column)) else {
				continue;
			};

			let mut fields = IndexMap::new();
			for field in class.fields.values() {
				let name_in = |names: &crate::tree::names::Names, column: &Column| -> Option<String> {
					match column {
						Column::Key => Some(field.src.name.clone()),
						Column::Ns(ns) => names.get(*ns).map(|x| x.to_owned()),
					}
				};
				if let (Some(from_name), Some(to_name)) = (name_in(&field.dst, &from_column), name_in(&field.dst, &to_column)) {
					let from_desc = match &from_remapper {
						None => field.src.desc.clone(),
						Some(remapper) => remapper.map_desc(&field.src.desc)?,
					};
					fields.insert(MemberKey::new(from_name, from_desc), to_name);
				}
			}

			let mut methods = IndexMap::new();
			for method in class.methods.values() {
				let name_in = |names: &crate::tree::names::Names, column: &Column| -> Option<String> {
					match column {
						Column::Key => Some(method.src.name.clone()),
						Column::Ns(ns) => names.get(*ns).map(|x| x.to_owned()),
					}
				};
				if let (Some(from_name), Some(to_name)) = (name_in(&method.dst, &from_column), name_in(&method.dst, &to_column)) {
					let from_desc = match &from_remapper {
						None => method.src.desc.clone(),
						Some(remapper) => remapper.map_desc(&method.src.desc)?,
					};
					methods.insert(MemberKey::new(from_name, from_desc), to_name);
				}
			}

			classes.insert(name_from.to_owned(), RemapperClass {
				name: name_to.to_owned(),
				fields,
				methods,
			});
		}

		Ok(MemberRemapper { classes })
	}
}

#[cfg(test)]
mod testing {
	use super::*;

	#[test]
	fn descriptors_map_through_classes() -> Result<()> {
		let input = "\
tiny	2	0	intermediary	named
c	class_1	pkg/Foo
	m	(Lclass_1;I)Lclass_2;	method_1	doThing
c	class_2	pkg/Bar
";

		let tree = crate::tiny_v2::read(input.as_bytes())?;
		let remapper = tree.class_remapper("intermediary", "named")?;

		assert_eq!(remapper.map_desc("(Lclass_1;I)Lclass_2;")?, "(Lpkg/Foo;I)Lpkg/Bar;");
		assert_eq!(remapper.map_desc("[[Lclass_2;")?, "[[Lpkg/Bar;");
		assert_eq!(remapper.map_class("class_3"), "class_3");
		Ok(())
	}

	#[test]
	fn member_lookup_uses_from_namespace_descriptors() -> Result<()> {
		let input = "\
tiny	2	0	intermediary	named
c	class_1	pkg/Foo
	m	(Lclass_1;)V	method_1	doThing
	f	Lclass_1;	field_1	self
";

		let tree = crate::tiny_v2::read(input.as_bytes())?;
		let remapper = tree.member_remapper("named", "intermediary")?;

		// keys must be phrased in "named" descriptors
		assert_eq!(remapper.map_method_or_none("pkg/Foo", "doThing", "(Lpkg/Foo;)V"), Some("method_1"));
		assert_eq!(remapper.map_field_or_none("pkg/Foo", "self", "Lpkg/Foo;"), Some("field_1"));
		assert_eq!(remapper.map_method_or_none("pkg/Foo", "doThing", "(Lclass_1;)V"), None);
		Ok(())
	}
}
