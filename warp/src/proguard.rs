//! A reader for the ProGuard mapping format, as published by Mojang for the client and
//! server jars.
//!
//! The format uses java source level names (dotted packages, `int[]` style types), so
//! reading converts everything to the internal jvm form (slashed names, descriptors).
//!
//! A file looks like
//! ```txt,ignore
//! # comment
//! pkg.Foo -> a:
//!     int count -> a
//!     1:5:void doThing(pkg.Foo,int) -> a
//! ```
//! where the left hand side is the first namespace and the right hand side the second.

use std::io::{BufRead, BufReader, Read};
use anyhow::{anyhow, bail, Context, Result};
use crate::tree::mappings::MappingTree;
use crate::tree::names::Namespace;

/// Converts a java source level type like `pkg.Foo[][]` or `int` to a descriptor.
fn type_to_desc(ty: &str) -> Result<String> {
	let mut dimensions = 0;
	let mut ty = ty;
	while let Some(stripped) = ty.strip_suffix("[]") {
		dimensions += 1;
		ty = stripped;
	}

	let mut desc = String::new();
	for _ in 0..dimensions {
		desc.push('[');
	}
	match ty {
		"void" => desc.push('V'),
		"boolean" => desc.push('Z'),
		"byte" => desc.push('B'),
		"char" => desc.push('C'),
		"short" => desc.push('S'),
		"int" => desc.push('I'),
		"long" => desc.push('J'),
		"float" => desc.push('F'),
		"double" => desc.push('D'),
		"" => bail!("empty type"),
		class => {
			desc.push('L');
			desc.push_str(&class.replace('.', "/"));
			desc.push(';');
		},
	}
	Ok(desc)
}

fn method_desc(args: &str, return_type: &str) -> Result<String> {
	let mut desc = String::from("(");
	if !args.is_empty() {
		for arg in args.split(',') {
			desc.push_str(&type_to_desc(arg)?);
		}
	}
	desc.push(')');
	desc.push_str(&type_to_desc(return_type)?);
	Ok(desc)
}

/// Reads a ProGuard mapping file.
///
/// The left hand side names become the source namespace `src` of the returned tree, the
/// right hand side names the single destination namespace `dst`. Descriptors are kept
/// in the source namespace, like everywhere else.
///
/// Note that for the Mojang published files the left hand side holds the human readable
/// names, so a caller that wants an obfuscation-keyed tree switches the source
/// namespace afterwards.
pub fn read(reader: impl Read, src: &str, dst: &str) -> Result<MappingTree> {
	let mut tree = MappingTree::new();
	tree.ensure_src(src)?;
	let dst = tree.ensure_dst(dst)?;

	let mut current_class: Option<String> = None;

	for (line_number, line) in BufReader::new(reader).lines().enumerate() {
		let line_number = line_number + 1;
		let line = line?;

		read_line(&mut tree, dst, &mut current_class, &line)
			.with_context(|| anyhow!("in line {line_number}: {line:?}"))?;
	}

	Ok(tree)
}

fn read_line(tree: &mut MappingTree, dst: Namespace, current_class: &mut Option<String>, line: &str) -> Result<()> {
	if line.is_empty() || line.starts_with('#') {
		return Ok(());
	}

	if let Some(line) = line.strip_prefix("    ") {
		let class = current_class.as_deref()
			.context("member line before any class line")?;

		let (left, right) = line.split_once(" -> ")
			.context("member line without \" -> \"")?;

		// line number prefixes like "1:5:" only occur on method lines
		let left = left.rsplit(':').next().unwrap_or(left);

		let (ty, rest) = left.split_once(' ')
			.context("member line without a type")?;

		if let Some((name, args)) = rest.split_once('(') {
			let args = args.strip_suffix(')')
				.context("method arguments without a closing parenthesis")?;
			let desc = method_desc(args, ty)?;

			tree.get_class_mut(class)
				.context("class entry vanished")?
				.add_method(name, &desc)
				.set_dst_name(dst, right);
		} else {
			let desc = type_to_desc(ty)?;

			tree.get_class_mut(class)
				.context("class entry vanished")?
				.add_field(rest, &desc)
				.set_dst_name(dst, right);
		}
	} else {
		let line = line.strip_suffix(':')
			.context("class line without a trailing colon")?;
		let (left, right) = line.split_once(" -> ")
			.context("class line without \" -> \"")?;

		let src_name = left.replace('.', "/");
		tree.add_class(&src_name)
			.set_dst_name(dst, right.replace('.', "/"));
		*current_class = Some(src_name);
	}

	Ok(())
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;

	#[test]
	fn types_to_descriptors() -> anyhow::Result<()> {
		assert_eq!(super::type_to_desc("void")?, "V");
		assert_eq!(super::type_to_desc("int[][]")?, "[[I");
		assert_eq!(super::type_to_desc("pkg.Foo")?, "Lpkg/Foo;");
		assert_eq!(super::method_desc("pkg.Foo,int", "pkg.Bar[]")?, "(Lpkg/Foo;I)[Lpkg/Bar;");
		assert_eq!(super::method_desc("", "void")?, "()V");
		Ok(())
	}

	#[test]
	fn read_a_small_file() -> anyhow::Result<()> {
		let input = "\
# some copyright banner
pkg.Foo -> a:
    int count -> a
    1:5:void doThing(pkg.Foo) -> a
    pkg.Foo self() -> b
pkg.other.Bar -> b:
";

		let tree = super::read(input.as_bytes(), "named", "official")?;
		let official = tree.namespace("official")?;

		assert_eq!(tree.src_namespace(), Some("named"));
		let foo = tree.get_class("pkg/Foo").unwrap();
		assert_eq!(foo.dst.get(official), Some("a"));
		assert_eq!(foo.get_field("count", "I").unwrap().dst.get(official), Some("a"));
		assert_eq!(foo.get_method("doThing", "(Lpkg/Foo;)V").unwrap().dst.get(official), Some("a"));
		assert_eq!(foo.get_method("self", "()Lpkg/Foo;").unwrap().dst.get(official), Some("b"));
		assert!(tree.get_class("pkg/other/Bar").is_some());
		Ok(())
	}
}
