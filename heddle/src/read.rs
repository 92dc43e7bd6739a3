//! The access widener rule file parser.

use anyhow::{anyhow, bail, Context, Result};
use crate::{AccessVerb, AccessWidenerVisitor};

/// Reads an access widener rule file into the given visitor.
///
/// Both the v1 and the v2 format are accepted; `transitive-` rule prefixes are only
/// legal in v2 files. Comments (`#` until end of line) and blank lines are skipped.
pub fn read(content: &[u8], visitor: &mut impl AccessWidenerVisitor) -> Result<()> {
	let content = std::str::from_utf8(content)
		.context("access widener file isn't valid utf8")?;

	let mut lines = content.lines()
		.enumerate()
		.map(|(line_number, line)| {
			// a # starts a comment reaching until the end of the line
			let line = line.split('#').next().unwrap_or(line).trim();
			(line_number + 1, line)
		})
		.filter(|(_, line)| !line.is_empty());

	let (header_line_number, header) = lines.next()
		.context("no header line")?;
	let version = read_header(header, visitor)
		.with_context(|| anyhow!("in line {header_line_number}: {header:?}"))?;

	for (line_number, line) in lines {
		read_rule(line, version, visitor)
			.with_context(|| anyhow!("in line {line_number}: {line:?}"))?;
	}

	Ok(())
}

fn read_header(line: &str, visitor: &mut impl AccessWidenerVisitor) -> Result<u8> {
	let fields: Vec<&str> = line.split_whitespace().collect();
	let ["accessWidener", version, namespace] = fields.as_slice() else {
		bail!("expected a header of the shape \"accessWidener <version> <namespace>\"");
	};

	let version = match *version {
		"v1" => 1,
		"v2" => 2,
		version => bail!("unsupported access widener format version {version:?}"),
	};

	visitor.visit_header(namespace)?;
	Ok(version)
}

fn read_rule(line: &str, version: u8, visitor: &mut impl AccessWidenerVisitor) -> Result<()> {
	let fields: Vec<&str> = line.split_whitespace().collect();
	let (&verb, rest) = fields.split_first()
		.context("empty rule line")?;

	let (verb, transitive) = match verb.strip_prefix("transitive-") {
		Some(verb) if version < 2 => bail!("the transitive rule {verb:?} requires the v2 format"),
		Some(verb) => (verb, true),
		None => (verb, false),
	};
	let verb = AccessVerb::parse(verb)?;

	match rest {
		["class", name] => {
			if verb == AccessVerb::Mutable {
				bail!("classes cannot be made mutable");
			}
			visitor.visit_class(name, verb, transitive)
		},
		["method", owner, name, desc] => {
			if verb == AccessVerb::Mutable {
				bail!("methods cannot be made mutable");
			}
			visitor.visit_method(owner, name, desc, verb, transitive)
		},
		["field", owner, name, desc] => {
			if verb == AccessVerb::Extendable {
				bail!("fields cannot be made extendable");
			}
			visitor.visit_field(owner, name, desc, verb, transitive)
		},
		[kind, ..] if *kind == "class" || *kind == "method" || *kind == "field" => {
			bail!("wrong number of fields for a {kind} rule")
		},
		[kind, ..] => bail!("unknown rule kind {kind:?}"),
		[] => bail!("rule line with only an access verb"),
	}
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use crate::{AccessVerb, AccessWidenerVisitor};

	#[derive(Default)]
	struct Collector {
		header: Option<String>,
		rules: Vec<String>,
	}

	impl AccessWidenerVisitor for Collector {
		fn visit_header(&mut self, namespace: &str) -> Result<()> {
			self.header = Some(namespace.to_owned());
			Ok(())
		}
		fn visit_class(&mut self, name: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
			self.rules.push(format!("{verb} class {name} {transitive}"));
			Ok(())
		}
		fn visit_method(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
			self.rules.push(format!("{verb} method {owner} {name} {desc} {transitive}"));
			Ok(())
		}
		fn visit_field(&mut self, owner: &str, name: &str, desc: &str, verb: AccessVerb, transitive: bool) -> Result<()> {
			self.rules.push(format!("{verb} field {owner} {name} {desc} {transitive}"));
			Ok(())
		}
	}

	#[test]
	fn read_v2() -> Result<()> {
		let input = "\
accessWidener	v2	named
# a comment
accessible	class	pkg/Foo

transitive-extendable	method	pkg/Foo	doThing	()V
mutable	field	pkg/Foo	count	I	# trailing comment
";

		let mut collector = Collector::default();
		super::read(input.as_bytes(), &mut collector)?;

		assert_eq!(collector.header.as_deref(), Some("named"));
		assert_eq!(collector.rules, &[
			"accessible class pkg/Foo false",
			"extendable method pkg/Foo doThing ()V true",
			"mutable field pkg/Foo count I false",
		]);
		Ok(())
	}

	#[test]
	fn transitive_needs_v2() {
		let input = "\
accessWidener	v1	named
transitive-accessible	class	pkg/Foo
";

		let mut collector = Collector::default();
		assert!(super::read(input.as_bytes(), &mut collector).is_err());
	}

	#[test]
	fn wrong_verb_for_kind() {
		let input = "\
accessWidener	v1	named
mutable	class	pkg/Foo
";

		let mut collector = Collector::default();
		assert!(super::read(input.as_bytes(), &mut collector).is_err());
	}
}
