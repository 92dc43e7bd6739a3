//! The access widener rule file writer.

use anyhow::{bail, Result};
use crate::{AccessVerb, AccessWidenerVisitor};

/// Re-serializes a rule stream into the v2 text format.
///
/// The output only depends on the visited rules and their order, so replaying a sorted
/// rule set (see `collate::AccessWidener::replay`) gives stable bytes for hashing.
///
/// Multiple visited files are merged into one output file; their headers must all
/// declare the same namespace.
#[derive(Debug, Default)]
pub struct AccessWidenerWriter {
	namespace: Option<String>,
	buf: String,
}

impl AccessWidenerWriter {
	pub fn new() -> AccessWidenerWriter {
		AccessWidenerWriter::default()
	}

	pub fn into_string(self) -> String {
		self.buf
	}

	pub fn as_bytes(&self) -> &[u8] {
		self.buf.as_bytes()
	}

	fn push_rule(&mut self, verb: AccessVerb, transitive: bool, kind: &str, fields: &[&str]) -> Result<()> {
		if self.namespace.is_none() {
			bail!("cannot write a rule before the header");
		}

		if transitive {
			self.buf.push_str("transitive-");
		}
		self.buf.push_str(verb.as_str());
		self.buf.push('\t');
		self.buf.push_str(kind);
		for field in fields {
			self.buf.push('\t');
			self.buf.push_str(field);
		}
		self.buf.push('\n');
		Ok(())
	}
}

impl AccessWidenerVisitor for AccessWidenerWriter {
	fn visit_header(&mut self, namespace: &str) -> Result<()> {
		match &self.namespace {
			None => {
				self.namespace = Some(namespace.to_owned());
				self.buf.push_str("accessWidener\tv2\t");
				self.buf.push_str(namespace);
				self.buf.push('\n');
				Ok(())
			},
			Some(old) if old == namespace => Ok(()),
			Some(old) => bail!("cannot merge an access widener in namespace {namespace:?} into output in namespace {old:?}"),
		}
	}

	fn visit_class(&mut self, name: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		self.push_rule(verb, transitive, "class", &[name])
	}

	fn visit_method(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		self.push_rule(verb, transitive, "method", &[owner, name, desc])
	}

	fn visit_field(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
		self.push_rule(verb, transitive, "field", &[owner, name, desc])
	}
}
