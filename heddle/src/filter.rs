use anyhow::Result;
use crate::{AccessVerb, AccessWidenerVisitor};

/// A decorator dropping every rule that isn't marked `transitive-`.
///
/// A mod only exports the widen rules it explicitly marks transitive; everything else
/// stays private to that mod, so dependency rule files pass through this before they
/// are merged into a consumer.
#[derive(Debug)]
pub struct TransitiveOnlyFilter<V> {
	inner: V,
}

impl<V: AccessWidenerVisitor> TransitiveOnlyFilter<V> {
	pub fn new(inner: V) -> TransitiveOnlyFilter<V> {
		TransitiveOnlyFilter { inner }
	}

	pub fn into_inner(self) -> V {
		self.inner
	}
}

impl<V: AccessWidenerVisitor> AccessWidenerVisitor for TransitiveOnlyFilter<V> {
	fn visit_header(&mut self, namespace: &str) -> Result<()> {
		self.inner.visit_header(namespace)
	}

	fn visit_class(&mut self, name: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		if transitive {
			self.inner.visit_class(name, verb, transitive)?;
		}
		Ok(())
	}

	fn visit_method(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		if transitive {
			self.inner.visit_method(owner, name, desc, verb, transitive)?;
		}
		Ok(())
	}

	fn visit_field(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		if transitive {
			self.inner.visit_field(owner, name, desc, verb, transitive)?;
		}
		Ok(())
	}
}
