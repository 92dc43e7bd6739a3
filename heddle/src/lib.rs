//! Access widener rule files: reading, writing, filtering, remapping and collating.
//!
//! Everything here speaks the same visitor protocol ([`AccessWidenerVisitor`]); the
//! decorators ([`filter::TransitiveOnlyFilter`], [`remap::AccessWidenerRemapper`]) wrap
//! another visitor and forward a transformed rule stream, and the sinks
//! ([`collate::AccessWidener`], [`write::AccessWidenerWriter`],
//! [`comment::MappingCommentVisitor`], [`validate::AccessWidenerValidator`]) consume it.

use std::fmt::{Display, Formatter};
use anyhow::{bail, Result};

pub mod read;
pub mod write;
pub mod filter;
pub mod remap;
pub mod collate;
pub mod comment;
pub mod validate;

/// The access level a rule widens its target to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessVerb {
	/// Makes the target public. Valid on classes, methods and fields.
	Accessible,
	/// Removes `final` (and for methods, allows overriding). Valid on classes and methods.
	Extendable,
	/// Removes `final`. Valid on fields only.
	Mutable,
}

impl AccessVerb {
	pub fn as_str(self) -> &'static str {
		match self {
			AccessVerb::Accessible => "accessible",
			AccessVerb::Extendable => "extendable",
			AccessVerb::Mutable => "mutable",
		}
	}

	pub fn parse(s: &str) -> Result<AccessVerb> {
		Ok(match s {
			"accessible" => AccessVerb::Accessible,
			"extendable" => AccessVerb::Extendable,
			"mutable" => AccessVerb::Mutable,
			s => bail!("unknown access verb {s:?}"),
		})
	}
}

impl Display for AccessVerb {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A consumer of an access widener rule stream.
///
/// The header is visited exactly once, before any rule. Class, method and field names
/// are in the namespace the header declares; descriptors likewise.
pub trait AccessWidenerVisitor {
	fn visit_header(&mut self, namespace: &str) -> Result<()>;
	fn visit_class(&mut self, name: &str, verb: AccessVerb, transitive: bool) -> Result<()>;
	fn visit_method(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()>;
	fn visit_field(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()>;
}

impl<V: AccessWidenerVisitor + ?Sized> AccessWidenerVisitor for &mut V {
	fn visit_header(&mut self, namespace: &str) -> Result<()> {
		(**self).visit_header(namespace)
	}
	fn visit_class(&mut self, name: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		(**self).visit_class(name, verb, transitive)
	}
	fn visit_method(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		(**self).visit_method(owner, name, desc, verb, transitive)
	}
	fn visit_field(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		(**self).visit_field(owner, name, desc, verb, transitive)
	}
}
