//! Functions to read and write mappings in the "Tiny v2" format.
//!
//! # Reading
//! You can read a `.tiny` file using the [`read_file`] method, by passing a path.
//! If you already have a [`Read`]er, you can use the [`read`] method.
//!
//! The first namespace of the header becomes the source namespace of the tree, all
//! further ones become destination namespaces.
//!
//! # Writing
//! For writing `.tiny` files, there are the [`write`][fn@write] as well as the
//! [`write_vec`] and [`write_string`] methods.
//!
//! Note that all writing sorts the tiny files, so two trees holding the same data
//! always serialize to the same bytes.

use std::fs::File;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use crate::lines::{TinyLine, WithMoreIdentIter};
use crate::tree::mappings::MappingTree;
use crate::tree::names::{Names, Namespace};

/// Escapes a comment for storage in a tiny v2 file.
///
/// Comments are the only place where a tab, newline or backslash can show up in the
/// data itself, so they get the `\\`, `\n`, `\r`, `\0` and `\t` escapes.
fn escape(comment: &str) -> String {
	let mut s = String::with_capacity(comment.len());
	for ch in comment.chars() {
		match ch {
			'\\' => s.push_str("\\\\"),
			'\n' => s.push_str("\\n"),
			'\r' => s.push_str("\\r"),
			'\0' => s.push_str("\\0"),
			'\t' => s.push_str("\\t"),
			ch => s.push(ch),
		}
	}
	s
}

fn unescape(comment: &str) -> Result<String> {
	let mut s = String::with_capacity(comment.len());
	let mut iter = comment.chars();
	while let Some(ch) = iter.next() {
		if ch == '\\' {
			match iter.next() {
				Some('\\') => s.push('\\'),
				Some('n') => s.push('\n'),
				Some('r') => s.push('\r'),
				Some('0') => s.push('\0'),
				Some('t') => s.push('\t'),
				Some(ch) => bail!("unknown escape sequence \\{ch} in comment {comment:?}"),
				None => bail!("comment {comment:?} ends in an unfinished escape sequence"),
			}
		} else {
			s.push(ch);
		}
	}
	Ok(s)
}

/// Reads a `.tiny` file (tiny v2), by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<MappingTree> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tiny v2 file", path.as_ref()))
}

/// Splits the name list of a line into the source name and the destination names.
///
/// Empty destination fields mean "no name in this namespace". An empty source field is
/// rejected, since the source name is the key of the entry.
fn split_names(line: TinyLine, dst_count: usize) -> Result<(String, Names)> {
	let line_number = line.line_number();
	let fields = line.rest();

	if fields.len() > dst_count + 1 {
		bail!("line {line_number} contains more names ({}) than namespaces ({})", fields.len(), dst_count + 1);
	}

	let mut iter = fields.into_iter();
	let src = iter.next()
		.with_context(|| anyhow!("line {line_number} is missing the source namespace name"))?;
	if src.is_empty() {
		bail!("line {line_number} has an empty source namespace name");
	}

	let mut names = Names::none();
	for (i, name) in iter.enumerate() {
		if !name.is_empty() {
			names.set(Namespace(i), name);
		}
	}
	Ok((src, names))
}

fn add_comment(comment: &mut Option<String>, line: TinyLine) -> Result<()> {
	let text = unescape(&line.end()?)?;
	if let Some(comment) = comment {
		bail!("only one comment is allowed, got {comment:?} and {text:?}")
	} else {
		*comment = Some(text);
		Ok(())
	}
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads the tiny v2 format, from the given reader.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let string = "\
/// tiny	2	0	namespaceA	namespaceB	namespaceC
/// c	A	B	C
/// 	f	LA;	a	b	c
/// 	m	(LA;)V	a	b	c
/// ";
///
/// let mappings = warp::tiny_v2::read(string.as_bytes()).unwrap();
///
/// assert_eq!(mappings.src_namespace(), Some("namespaceA"));
/// assert_eq!(mappings.classes.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<MappingTree> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.map(|(line_number, line)| -> Result<TinyLine> {
			TinyLine::new(line_number + 1, &line?)
		})
		.peekable();

	let mut header = lines.next().context("no header line")??;
	let header_line_number = header.line_number();

	if header.first_field != "tiny" || header.next()? != "2" || header.next()? != "0" {
		bail!("header version isn't tiny v2.0, in line {header:?}");
	}

	let namespaces = header.rest();
	let [src, dst @ ..] = namespaces.as_slice() else {
		bail!("no namespaces given on line {header_line_number}");
	};
	if dst.is_empty() {
		bail!("must read at least two namespaces, got only {src:?} on line {header_line_number}");
	}

	let mut mappings = MappingTree::new();
	mappings.ensure_src(src)?;
	for name in dst {
		mappings.ensure_dst(name)
			.with_context(|| anyhow!("on line {header_line_number}"))?;
	}
	let dst_count = dst.len();

	// property lines of the header block, such as "escaped-names", carry no mapping data
	while lines.peek().is_some_and(|line| line.as_ref().is_ok_and(|x| x.idents() == 1)) {
		lines.next();
	}

	WithMoreIdentIter::new(&mut lines).on_every_line(|iter, line| {
		if line.first_field == "c" {
			let (src, dst) = split_names(line, dst_count)?;
			let class = mappings.add_class(&src);
			class.dst = dst;

			iter.next_level().on_every_line(|iter, mut line| {
				if line.first_field == "f" {
					let desc = line.next()?;
					let (src, dst) = split_names(line, dst_count)?;
					let field = class.add_field(&src, &desc);
					field.dst = dst;

					iter.next_level().on_every_line(|_, line| {
						if line.first_field == "c" {
							add_comment(&mut field.comment, line)
						} else {
							Ok(())
						}
					}).context("reading field sub-sections")
				} else if line.first_field == "m" {
					let desc = line.next()?;
					let (src, dst) = split_names(line, dst_count)?;
					let method = class.add_method(&src, &desc);
					method.dst = dst;

					iter.next_level().on_every_line(|iter, mut line| {
						if line.first_field == "p" {
							let index = line.next()?.parse()?;
							let line_number = line.line_number();
							let fields = line.rest();
							if fields.len() > dst_count + 1 {
								bail!("line {line_number} contains more names ({}) than namespaces ({})", fields.len(), dst_count + 1);
							}

							let parameter = method.add_parameter(index);
							let mut iter_names = fields.into_iter();
							// unlike classes and members, parameters may lack a source name
							parameter.src = iter_names.next().filter(|x| !x.is_empty());
							for (i, name) in iter_names.enumerate() {
								if !name.is_empty() {
									parameter.dst.set(Namespace(i), name);
								}
							}

							iter.next_level().on_every_line(|_, line| {
								if line.first_field == "c" {
									add_comment(&mut parameter.comment, line)
								} else {
									Ok(())
								}
							}).context("reading parameter sub-sections")
						} else if line.first_field == "c" {
							add_comment(&mut method.comment, line)
						} else {
							Ok(())
						}
					}).context("reading method sub-sections")
				} else if line.first_field == "c" {
					add_comment(&mut class.comment, line)
				} else {
					Ok(())
				}
			}).context("reading class sub-sections")
		} else {
			Ok(())
		}
	}).context("reading lines")?;

	if let Some(line) = lines.next() {
		bail!("expected end of input, got: {line:?}");
	}

	Ok(mappings)
}

/// Writes the given mappings into a `String`, in the tiny v2 format.
///
/// This is equivalent to first calling [`write_vec`] and then [`String::from_utf8`].
///
/// This method is of most use in test cases, where you also use the `pretty_assertions`
/// crate for viewing string diffs.
pub fn write_string(mappings: &MappingTree) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the tiny v2 format.
pub fn write_vec(mappings: &MappingTree) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

fn write_names(w: &mut impl Write, src: &str, names: &Names, dst_count: usize) -> Result<()> {
	write!(w, "\t{src}")?;
	for i in 0..dst_count {
		write!(w, "\t{}", names.get(Namespace(i)).unwrap_or(""))?;
	}
	writeln!(w)?;
	Ok(())
}

/// Writes the given mappings to the given writer, in the tiny v2 format.
///
/// The classes, fields, methods and parameters are sorted, so the output only depends
/// on the data held by the tree, never on insertion order.
pub fn write(mappings: &MappingTree, w: &mut impl Write) -> Result<()> {
	// the buffering makes it much faster
	let mut w = BufWriter::new(w);
	let w = &mut w;

	let src = mappings.src_namespace()
		.context("cannot write a tree that has no source namespace")?;
	let dst = mappings.namespaces.dst();
	let dst_count = dst.len();
	if dst_count == 0 {
		bail!("cannot write a tree with no destination namespaces");
	}

	write!(w, "tiny\t2\t0\t{src}")?;
	for namespace in dst {
		write!(w, "\t{namespace}")?;
	}
	writeln!(w)?;

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.src);
	for class in classes {
		write!(w, "c")?;
		write_names(w, &class.src, &class.dst, dst_count)?;

		if let Some(ref comment) = class.comment {
			writeln!(w, "\tc\t{}", escape(comment))?;
		}

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by_key(|x| &x.src);
		for field in fields {
			write!(w, "\tf\t{}", field.src.desc)?;
			write_names(w, &field.src.name, &field.dst, dst_count)?;

			if let Some(ref comment) = field.comment {
				writeln!(w, "\t\tc\t{}", escape(comment))?;
			}
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by_key(|x| &x.src);
		for method in methods {
			write!(w, "\tm\t{}", method.src.desc)?;
			write_names(w, &method.src.name, &method.dst, dst_count)?;

			if let Some(ref comment) = method.comment {
				writeln!(w, "\t\tc\t{}", escape(comment))?;
			}

			let mut parameters: Vec<_> = method.parameters.values().collect();
			parameters.sort_by_key(|x| x.index);
			for parameter in parameters {
				write!(w, "\t\tp\t{}", parameter.index)?;
				write_names(w, parameter.src.as_deref().unwrap_or(""), &parameter.dst, dst_count)?;

				if let Some(ref comment) = parameter.comment {
					writeln!(w, "\t\t\tc\t{}", escape(comment))?;
				}
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;

	#[test]
	fn comments_escape_and_unescape() -> anyhow::Result<()> {
		assert_eq!(super::escape("a\nb\\c"), "a\\nb\\\\c");
		assert_eq!(super::unescape("a\\nb\\\\c")?, "a\nb\\c");
		assert!(super::unescape("oh no \\q").is_err());
		Ok(())
	}

	#[test]
	fn sorting_fields_needs_the_key() {
		use crate::tree::mappings::MemberKey;
		// fields of the same name are told apart by their descriptor
		assert!(MemberKey::new("a", "I") < MemberKey::new("a", "J"));
	}
}
