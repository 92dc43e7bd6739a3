use anyhow::{bail, Result};
use warp::remapper::Remapper;
use crate::{AccessVerb, AccessWidenerVisitor};

/// A decorator rewriting every symbol reference of a rule stream into another
/// namespace.
///
/// The wrapped remapper must map from `from` to `to`. A visited file declaring a
/// header namespace other than `from` is a configuration error, not something to
/// silently pass through: the rewritten rules would reference symbols of the wrong
/// naming scheme.
pub struct AccessWidenerRemapper<'a, V, R: ?Sized> {
	inner: V,
	remapper: &'a R,
	from: String,
	to: String,
}

impl<'a, V: AccessWidenerVisitor, R: Remapper + ?Sized> AccessWidenerRemapper<'a, V, R> {
	pub fn new(inner: V, remapper: &'a R, from: impl Into<String>, to: impl Into<String>) -> AccessWidenerRemapper<'a, V, R> {
		AccessWidenerRemapper { inner, remapper, from: from.into(), to: to.into() }
	}

	pub fn into_inner(self) -> V {
		self.inner
	}
}

impl<V: AccessWidenerVisitor, R: Remapper + ?Sized> AccessWidenerVisitor for AccessWidenerRemapper<'_, V, R> {
	fn visit_header(&mut self, namespace: &str) -> Result<()> {
		if namespace != self.from {
			bail!("cannot remap access widener with namespace {namespace:?}, the remapper maps from {:?} to {:?}", self.from, self.to);
		}
		self.inner.visit_header(&self.to)
	}

	fn visit_class(&mut self, name: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		self.inner.visit_class(&self.remapper.map_class(name), verb, transitive)
	}

	fn visit_method(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		let new_name = self.remapper.map_method(owner, name, desc);
		let new_desc = self.remapper.map_desc(desc)?;
		self.inner.visit_method(&self.remapper.map_class(owner), &new_name, &new_desc, verb, transitive)
	}

	fn visit_field(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		let new_name = self.remapper.map_field(owner, name, desc);
		let new_desc = self.remapper.map_desc(desc)?;
		self.inner.visit_field(&self.remapper.map_class(owner), &new_name, &new_desc, verb, transitive)
	}
}
