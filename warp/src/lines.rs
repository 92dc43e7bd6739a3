use std::cmp::Ordering;
use std::iter::Peekable;
use anyhow::{anyhow, bail, Context, Result};

/// A single tab separated line of a tiny file, with the indentation stripped off and
/// counted.
#[derive(Debug)]
pub(crate) struct TinyLine {
	line_number: usize,
	idents: usize,
	pub(crate) first_field: String,
	fields: std::vec::IntoIter<String>,
}

impl TinyLine {
	pub(crate) fn new(line_number: usize, line: &str) -> Result<TinyLine> {
		let idents = line.bytes().take_while(|x| *x == b'\t').count();
		// tabs are ascii, so the byte count is a valid char boundary
		let line = &line[idents..];

		let mut fields = line.split('\t').map(|x| x.to_owned());

		let first_field = fields.next()
			.with_context(|| anyhow!("no first field in line {line_number}"))?;

		let vec: Vec<String> = fields.collect();

		Ok(TinyLine {
			line_number,
			idents,
			first_field,
			fields: vec.into_iter(),
		})
	}

	pub(crate) fn line_number(&self) -> usize {
		self.line_number
	}

	pub(crate) fn idents(&self) -> usize {
		self.idents
	}

	pub(crate) fn next(&mut self) -> Result<String> {
		self.fields.next()
			.with_context(|| anyhow!("expected another field in line {}: {self:?}", self.line_number))
	}

	/// Takes the next field and requires it to be the last one.
	pub(crate) fn end(mut self) -> Result<String> {
		let next = self.next()?;

		if !self.fields.as_slice().is_empty() {
			bail!("line {} contained more fields than expected: {self:?}", self.line_number);
		}

		Ok(next)
	}

	/// Takes all remaining fields.
	pub(crate) fn rest(self) -> Vec<String> {
		self.fields.collect()
	}
}

/// Iterates over the lines that have at least the indentation given by the depth,
/// handing deeper blocks to nested iterators created with [`Self::next_level`].
pub(crate) struct WithMoreIdentIter<'a, I: Iterator> {
	depth: usize,
	iter: &'a mut Peekable<I>,
}

impl<'a, I> WithMoreIdentIter<'a, I>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	pub(crate) fn new(iter: &'a mut Peekable<I>) -> WithMoreIdentIter<'a, I> {
		WithMoreIdentIter { depth: 0, iter }
	}

	pub(crate) fn next_level(&mut self) -> WithMoreIdentIter<'_, I> {
		WithMoreIdentIter {
			depth: self.depth + 1,
			iter: self.iter,
		}
	}

	pub(crate) fn on_every_line(mut self, mut f: impl FnMut(&mut Self, TinyLine) -> Result<()>) -> Result<()> {
		while let Some(line) = self.next() {
			let line = line?;
			let line_number = line.line_number();

			f(&mut self, line)
				.with_context(|| anyhow!("in line {line_number}"))?;
		}
		Ok(())
	}
}

impl<I> Iterator for WithMoreIdentIter<'_, I>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	type Item = Result<TinyLine>;

	fn next(&mut self) -> Option<Self::Item> {
		match self.iter.peek()? {
			Ok(line) => {
				match line.idents().cmp(&self.depth) {
					Ordering::Less => None, // cancel an inner loop
					Ordering::Equal => self.iter.next(), // actually give back the value
					Ordering::Greater => Some(Err(anyhow!("expected an indentation of {} for line {}: {:#?}", self.depth, line.line_number(), line))),
				}
			},
			Err(_) => self.iter.next(),
		}
	}
}
