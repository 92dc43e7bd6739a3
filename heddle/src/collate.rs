//! The collated accumulator all filtered and remapped rule files merge into.

use anyhow::{bail, Result};
use indexmap::{IndexMap, IndexSet};
use crate::{AccessVerb, AccessWidenerVisitor};

/// A class, method or field a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
	Class(String),
	Method { owner: String, name: String, desc: String },
	Field { owner: String, name: String, desc: String },
}

impl Target {
	/// The class whose class file has to be rewritten for this target.
	pub fn class(&self) -> &str {
		match self {
			Target::Class(name) => name,
			Target::Method { owner, .. } => owner,
			Target::Field { owner, .. } => owner,
		}
	}
}

/// The union of all widen rules applying to one output jar.
///
/// Registering a rule is idempotent per `(target, verb)`: replaying the same rule file
/// twice leaves the accumulator unchanged. All merged files must declare the same
/// namespace, so remap dependency files before merging them.
#[derive(Debug, Default)]
pub struct AccessWidener {
	namespace: Option<String>,
	rules: IndexMap<Target, IndexSet<AccessVerb>>,
}

impl AccessWidener {
	pub fn new() -> AccessWidener {
		AccessWidener::default()
	}

	pub fn namespace(&self) -> Option<&str> {
		self.namespace.as_deref()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	pub fn rule_count(&self) -> usize {
		self.rules.values().map(|verbs| verbs.len()).sum()
	}

	/// The verbs registered for one target.
	pub fn verbs(&self, target: &Target) -> impl Iterator<Item = AccessVerb> + '_ {
		self.rules.get(target)
			.into_iter()
			.flatten()
			.copied()
	}

	/// The distinct classes whose class files this widener touches.
	///
	/// A member rule widens its owning class file, so owners count as targets too.
	pub fn target_classes(&self) -> IndexSet<&str> {
		self.rules.keys().map(|target| target.class()).collect()
	}

	/// Replays the collated rules into another visitor, in sorted order.
	///
	/// Sorting makes the replay independent of the order the rules were registered in,
	/// which is what makes the serialized form usable as a content hash input.
	pub fn replay(&self, visitor: &mut impl AccessWidenerVisitor) -> Result<()> {
		let Some(namespace) = &self.namespace else {
			// nothing was merged, so there is nothing to replay
			return Ok(());
		};
		visitor.visit_header(namespace)?;

		let mut rules: Vec<(&Target, AccessVerb)> = self.rules.iter()
			.flat_map(|(target, verbs)| verbs.iter().map(move |&verb| (target, verb)))
			.collect();
		rules.sort();

		for (target, verb) in rules {
			match target {
				Target::Class(name) => visitor.visit_class(name, verb, false)?,
				Target::Method { owner, name, desc } => visitor.visit_method(owner, name, desc, verb, false)?,
				Target::Field { owner, name, desc } => visitor.visit_field(owner, name, desc, verb, false)?,
			}
		}
		Ok(())
	}

	fn register(&mut self, target: Target, verb: AccessVerb) -> Result<()> {
		if self.namespace.is_none() {
			bail!("cannot register a rule before any header was visited");
		}
		self.rules.entry(target).or_default().insert(verb);
		Ok(())
	}
}

impl AccessWidenerVisitor for AccessWidener {
	fn visit_header(&mut self, namespace: &str) -> Result<()> {
		match &self.namespace {
			None => {
				self.namespace = Some(namespace.to_owned());
				Ok(())
			},
			Some(old) if old == namespace => Ok(()),
			Some(old) => bail!("cannot merge an access widener in namespace {namespace:?} into one in namespace {old:?}; remap it first"),
		}
	}

	fn visit_class(&mut self, name: &str, verb: AccessVerb, _transitive: bool) -> Result<()> {
		self.register(Target::Class(name.to_owned()), verb)
	}

	fn visit_method(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, _transitive: bool) -> Result<()> {
		self.register(Target::Method {
			owner: owner.to_owned(),
			name: name.to_owned(),
			desc: desc.to_owned(),
		}, verb)
	}

	fn visit_field(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, _transitive: bool) -> Result<()> {
		self.register(Target::Field {
			owner: owner.to_owned(),
			name: name.to_owned(),
			desc: desc.to_owned(),
		}, verb)
	}
}
