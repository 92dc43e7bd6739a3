pub mod mappings;

pub mod names {
	use std::fmt::{Debug, Formatter};
	use anyhow::{anyhow, bail, Context, Result};

	/// Describes a given destination namespace of a mapping tree.
	///
	/// This is an index into the destination namespace list of the tree the value was
	/// obtained from (via [`Namespaces::namespace`] or [`Namespaces::ensure_dst`]).
	/// It is only meaningful for that tree.
	#[derive(Debug, Copy, Clone, PartialEq, Eq)]
	pub struct Namespace(pub(crate) usize);

	impl Namespace {
		pub(crate) fn index(self) -> usize {
			self.0
		}
	}

	/// The namespaces of a mapping tree: one optional source namespace plus an ordered
	/// list of destination namespaces.
	///
	/// A freshly created tree has no source namespace; the first visitation sets it.
	/// Once set it can only be changed by rebuilding the tree
	/// (see `MappingTree::switch_source`).
	#[derive(Clone, PartialEq, Default)]
	pub struct Namespaces {
		src: Option<String>,
		dst: Vec<String>,
	}

	impl Namespaces {
		pub fn new() -> Namespaces {
			Namespaces::default()
		}

		pub fn src(&self) -> Option<&str> {
			self.src.as_deref()
		}

		pub fn dst(&self) -> &[String] {
			&self.dst
		}

		/// Sets the source namespace if it isn't set yet.
		///
		/// Setting it to a different name than the already stored one is an error,
		/// since that would silently mix entries keyed by different naming schemes.
		pub fn ensure_src(&mut self, src: &str) -> Result<()> {
			if src.is_empty() {
				bail!("namespace names must be non-empty");
			}
			match &self.src {
				None => {
					self.src = Some(src.to_owned());
					Ok(())
				},
				Some(old) if old == src => Ok(()),
				Some(old) => bail!("source namespace is already {old:?}, cannot visit with source namespace {src:?}; switch the source namespace first"),
			}
		}

		/// Looks up a destination namespace by name.
		pub fn namespace(&self, name: &str) -> Result<Namespace> {
			for (id, namespace) in self.dst.iter().enumerate() {
				if namespace == name {
					return Ok(Namespace(id));
				}
			}
			bail!("cannot find namespace with name {name:?}, only got {self:?}");
		}

		/// Looks up a destination namespace by name, appending it if it doesn't exist yet.
		pub fn ensure_dst(&mut self, name: &str) -> Result<Namespace> {
			if name.is_empty() {
				bail!("namespace names must be non-empty");
			}
			if self.src.as_deref() == Some(name) {
				bail!("namespace {name:?} is the source namespace, it cannot also be a destination namespace");
			}
			if let Ok(namespace) = self.namespace(name) {
				return Ok(namespace);
			}
			self.dst.push(name.to_owned());
			Ok(Namespace(self.dst.len() - 1))
		}

		pub(crate) fn set_dst(&mut self, dst: Vec<String>) {
			self.dst = dst;
		}

		pub(crate) fn rename(&mut self, from: &str, to: &str) -> Result<()> {
			if to.is_empty() {
				bail!("namespace names must be non-empty");
			}
			if self.src.as_deref() == Some(to) || self.dst.iter().any(|x| x == to) {
				bail!("cannot rename namespace {from:?} to {to:?}: {to:?} already exists in {self:?}");
			}
			if self.src.as_deref() == Some(from) {
				self.src = Some(to.to_owned());
				return Ok(());
			}
			let namespace = self.namespace(from)
				.with_context(|| anyhow!("cannot rename namespace {from:?} to {to:?}"))?;
			self.dst[namespace.0] = to.to_owned();
			Ok(())
		}
	}

	impl Debug for Namespaces {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_struct("Namespaces")
				.field("src", &self.src)
				.field("dst", &self.dst)
				.finish()
		}
	}

	/// Per-entry destination names, indexed by [`Namespace`].
	///
	/// A name can be absent for any namespace. The vector grows on demand, so names for a
	/// namespace that was declared after the entry was created simply read as absent.
	#[derive(Clone, Default)]
	pub struct Names {
		names: Vec<Option<String>>,
	}

	impl Names {
		pub fn none() -> Names {
			Names::default()
		}

		pub fn get(&self, namespace: Namespace) -> Option<&str> {
			self.names.get(namespace.0).and_then(|x| x.as_deref())
		}

		/// Stores a name for the given namespace. A later write for the same namespace
		/// replaces the earlier one.
		pub fn set(&mut self, namespace: Namespace, name: impl Into<String>) {
			if self.names.len() <= namespace.0 {
				self.names.resize(namespace.0 + 1, None);
			}
			self.names[namespace.0] = Some(name.into());
		}

		pub(crate) fn clear(&mut self, namespace: Namespace) {
			if let Some(slot) = self.names.get_mut(namespace.0) {
				*slot = None;
			}
		}

		/// Iterates over the present names as `(namespace index, name)` pairs.
		pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
			self.names.iter()
				.enumerate()
				.filter_map(|(i, name)| name.as_deref().map(|name| (i, name)))
		}
	}

	// Equality must not distinguish a missing slot from a trailing `None`, since both
	// read as "no name" through `get`.
	impl PartialEq for Names {
		fn eq(&self, other: &Names) -> bool {
			let len = self.names.len().max(other.names.len());
			(0..len).all(|i| {
				self.names.get(i).and_then(|x| x.as_deref())
					== other.names.get(i).and_then(|x| x.as_deref())
			})
		}
	}

	impl Debug for Names {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	impl<const N: usize> From<[&str; N]> for Names {
		fn from(value: [&str; N]) -> Names {
			Names {
				names: value.map(|x| if x.is_empty() { None } else { Some(x.to_owned()) }).into(),
			}
		}
	}
}
