use anyhow::{Context, Result};
use indexmap::IndexMap;
use crate::tree::names::{Names, Namespace, Namespaces};

/// A mutable multi-namespace mapping tree.
///
/// Classes are keyed by their name in the source namespace; fields and methods are keyed
/// by their name and descriptor in the source namespace. Every entry additionally stores
/// per-destination-namespace names (see [`Names`]) and an optional comment.
///
/// A fresh tree has no source namespace. The first visitation sets it (via
/// [`MappingTree::ensure_src`]); from then on all entries are keyed by that namespace
/// until the tree is rebuilt with [`MappingTree::switch_source`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingTree {
	pub namespaces: Namespaces,
	pub classes: IndexMap<String, ClassEntry>,
}

impl MappingTree {
	pub fn new() -> MappingTree {
		MappingTree::default()
	}

	pub fn src_namespace(&self) -> Option<&str> {
		self.namespaces.src()
	}

	/// See [`Namespaces::ensure_src`].
	pub fn ensure_src(&mut self, src: &str) -> Result<()> {
		self.namespaces.ensure_src(src)
	}

	/// See [`Namespaces::ensure_dst`].
	pub fn ensure_dst(&mut self, name: &str) -> Result<Namespace> {
		self.namespaces.ensure_dst(name)
	}

	/// See [`Namespaces::namespace`].
	pub fn namespace(&self, name: &str) -> Result<Namespace> {
		self.namespaces.namespace(name)
	}

	/// Returns the class entry for the given source-namespace name, creating it if absent.
	pub fn add_class(&mut self, src: &str) -> &mut ClassEntry {
		self.classes.entry(src.to_owned())
			.or_insert_with(|| ClassEntry::new(src))
	}

	pub fn get_class(&self, src: &str) -> Option<&ClassEntry> {
		self.classes.get(src)
	}

	pub fn get_class_mut(&mut self, src: &str) -> Option<&mut ClassEntry> {
		self.classes.get_mut(src)
	}

	/// Overlays another tree onto this one.
	///
	/// Both trees must be keyed by the same source namespace. Destination namespaces of
	/// `other` that this tree doesn't declare yet are appended. Names contributed by
	/// `other` win over names already stored for the same slot; comments of `other`
	/// replace existing comments of the same entry.
	pub fn merge_from(&mut self, other: &MappingTree) -> Result<()> {
		let other_src = other.src_namespace()
			.context("cannot merge from a tree without a source namespace")?;
		self.ensure_src(other_src)?;

		let mut ns_map = Vec::with_capacity(other.namespaces.dst().len());
		for name in other.namespaces.dst() {
			ns_map.push(self.ensure_dst(name)?);
		}

		for class in other.classes.values() {
			let c = self.add_class(&class.src);

			for (i, name) in class.dst.iter() {
				c.dst.set(ns_map[i], name);
			}
			if let Some(comment) = &class.comment {
				c.comment = Some(comment.clone());
			}

			for field in class.fields.values() {
				let f = c.add_field(&field.src.name, &field.src.desc);
				for (i, name) in field.dst.iter() {
					f.dst.set(ns_map[i], name);
				}
				if let Some(comment) = &field.comment {
					f.comment = Some(comment.clone());
				}
			}

			for method in class.methods.values() {
				let m = c.add_method(&method.src.name, &method.src.desc);
				for (i, name) in method.dst.iter() {
					m.dst.set(ns_map[i], name);
				}
				if let Some(comment) = &method.comment {
					m.comment = Some(comment.clone());
				}

				for parameter in method.parameters.values() {
					let p = m.add_parameter(parameter.index);
					if let Some(src) = &parameter.src {
						p.src = Some(src.clone());
					}
					for (i, name) in parameter.dst.iter() {
						p.dst.set(ns_map[i], name);
					}
					if let Some(comment) = &parameter.comment {
						p.comment = Some(comment.clone());
					}
				}
			}
		}

		Ok(())
	}
}

/// The key of a field or method: name and descriptor in the source namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
	pub name: String,
	pub desc: String,
}

impl MemberKey {
	pub fn new(name: impl Into<String>, desc: impl Into<String>) -> MemberKey {
		MemberKey { name: name.into(), desc: desc.into() }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
	pub src: String,
	pub dst: Names,
	pub comment: Option<String>,
	pub fields: IndexMap<MemberKey, FieldEntry>,
	pub methods: IndexMap<MemberKey, MethodEntry>,
}

impl ClassEntry {
	pub(crate) fn new(src: &str) -> ClassEntry {
		ClassEntry {
			src: src.to_owned(),
			dst: Names::none(),
			comment: None,
			fields: IndexMap::new(),
			methods: IndexMap::new(),
		}
	}

	pub fn set_dst_name(&mut self, namespace: Namespace, name: impl Into<String>) {
		self.dst.set(namespace, name);
	}

	pub fn add_field(&mut self, name: &str, desc: &str) -> &mut FieldEntry {
		self.fields.entry(MemberKey::new(name, desc))
			.or_insert_with(|| FieldEntry::new(name, desc))
	}

	pub fn add_method(&mut self, name: &str, desc: &str) -> &mut MethodEntry {
		self.methods.entry(MemberKey::new(name, desc))
			.or_insert_with(|| MethodEntry::new(name, desc))
	}

	pub fn get_field(&self, name: &str, desc: &str) -> Option<&FieldEntry> {
		self.fields.get(&MemberKey::new(name, desc))
	}

	pub fn get_field_mut(&mut self, name: &str, desc: &str) -> Option<&mut FieldEntry> {
		self.fields.get_mut(&MemberKey::new(name, desc))
	}

	pub fn get_method(&self, name: &str, desc: &str) -> Option<&MethodEntry> {
		self.methods.get(&MemberKey::new(name, desc))
	}

	pub fn get_method_mut(&mut self, name: &str, desc: &str) -> Option<&mut MethodEntry> {
		self.methods.get_mut(&MemberKey::new(name, desc))
	}

	pub fn append_comment_once(&mut self, line: &str) {
		append_comment_once(&mut self.comment, line);
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
	pub src: MemberKey,
	pub dst: Names,
	pub comment: Option<String>,
}

impl FieldEntry {
	pub(crate) fn new(name: &str, desc: &str) -> FieldEntry {
		FieldEntry {
			src: MemberKey::new(name, desc),
			dst: Names::none(),
			comment: None,
		}
	}

	pub fn set_dst_name(&mut self, namespace: Namespace, name: impl Into<String>) {
		self.dst.set(namespace, name);
	}

	pub fn append_comment_once(&mut self, line: &str) {
		append_comment_once(&mut self.comment, line);
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry {
	pub src: MemberKey,
	pub dst: Names,
	pub comment: Option<String>,
	pub parameters: IndexMap<usize, ParameterEntry>,
}

impl MethodEntry {
	pub(crate) fn new(name: &str, desc: &str) -> MethodEntry {
		MethodEntry {
			src: MemberKey::new(name, desc),
			dst: Names::none(),
			comment: None,
			parameters: IndexMap::new(),
		}
	}

	pub fn set_dst_name(&mut self, namespace: Namespace, name: impl Into<String>) {
		self.dst.set(namespace, name);
	}

	pub fn add_parameter(&mut self, index: usize) -> &mut ParameterEntry {
		self.parameters.entry(index)
			.or_insert_with(|| ParameterEntry::new(index))
	}

	pub fn append_comment_once(&mut self, line: &str) {
		append_comment_once(&mut self.comment, line);
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEntry {
	pub index: usize,
	pub src: Option<String>,
	pub dst: Names,
	pub comment: Option<String>,
}

impl ParameterEntry {
	pub(crate) fn new(index: usize) -> ParameterEntry {
		ParameterEntry {
			index,
			src: None,
			dst: Names::none(),
			comment: None,
		}
	}

	pub fn set_dst_name(&mut self, namespace: Namespace, name: impl Into<String>) {
		self.dst.set(namespace, name);
	}
}

/// Appends a line to a comment slot, unless an identical line is already contained.
///
/// Replaying the same annotation twice must not duplicate the comment line.
fn append_comment_once(comment: &mut Option<String>, line: &str) {
	match comment {
		None => *comment = Some(line.to_owned()),
		Some(existing) => {
			if !existing.lines().any(|x| x == line) {
				existing.push('\n');
				existing.push_str(line);
			}
		},
	}
}
