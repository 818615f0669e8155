use std::collections::HashSet;
use std::fmt::Write;

use super::table::BigramTable;
use super::token::MARKER_COUNT;
use crate::error::CorruptData;

/// Supported save format version. Loading rejects any other version; no
/// forward or backward compatibility is attempted.
pub(crate) const FORMAT_MAJOR: u16 = 2;
pub(crate) const FORMAT_MINOR: u16 = 1;

/// Line reader that tracks position for error reporting.
struct LineReader<'a> {
	inner: std::str::Lines<'a>,
	line: usize,
}

impl<'a> LineReader<'a> {
	fn new(text: &'a str) -> Self {
		Self { inner: text.lines(), line: 0 }
	}

	fn next(&mut self, expected: &'static str) -> Result<&'a str, CorruptData> {
		match self.inner.next() {
			Some(l) => {
				self.line += 1;
				Ok(l)
			}
			None => Err(CorruptData::Truncated { expected }),
		}
	}

	fn next_number<T: std::str::FromStr>(&mut self, field: &'static str) -> Result<T, CorruptData> {
		let raw = self.next(field)?;
		raw.trim().parse().map_err(|_| CorruptData::Malformed {
			field,
			line: self.line,
			value: raw.to_owned(),
		})
	}
}

/// Serializes a table into the versioned text format.
///
/// Layout: version line (`major minor`), word count, one word per line
/// (the four reserved entries are empty lines), then the count matrix in
/// row-major order, one value per line. Row sums are never stored.
pub(crate) fn encode(table: &BigramTable) -> String {
	let len = table.len();
	let mut out = String::with_capacity(len * len * 2 + len * 8);
	// Writing to a String cannot fail.
	let _ = writeln!(out, "{} {}", FORMAT_MAJOR, FORMAT_MINOR);
	let _ = writeln!(out, "{}", len);
	for word in table.words() {
		let _ = writeln!(out, "{}", word);
	}
	for row in table.rows() {
		for n in row {
			let _ = writeln!(out, "{}", n);
		}
	}
	out
}

/// Parses the versioned text format into a fresh table.
///
/// All-or-nothing: any validation failure rejects the whole input and the
/// caller's live table is never touched. Content past the final matrix
/// value is ignored.
pub(crate) fn decode(text: &str) -> Result<BigramTable, CorruptData> {
	let mut reader = LineReader::new(text);

	let version_line = reader.next("version header")?;
	let mut fields = version_line.split_whitespace();
	let (major, minor) = match (fields.next(), fields.next(), fields.next()) {
		(Some(maj), Some(min), None) => {
			let parse = |raw: &str| {
				raw.parse::<u16>().map_err(|_| CorruptData::Malformed {
					field: "version header",
					line: 1,
					value: version_line.to_owned(),
				})
			};
			(parse(maj)?, parse(min)?)
		}
		_ => {
			return Err(CorruptData::Malformed {
				field: "version header",
				line: 1,
				value: version_line.to_owned(),
			});
		}
	};
	if (major, minor) != (FORMAT_MAJOR, FORMAT_MINOR) {
		return Err(CorruptData::VersionMismatch {
			found_major: major,
			found_minor: minor,
			expected_major: FORMAT_MAJOR,
			expected_minor: FORMAT_MINOR,
		});
	}

	let word_count: usize = reader.next_number("word count")?;
	if word_count < MARKER_COUNT {
		return Err(CorruptData::Structural(format!(
			"word count {} is below the {} reserved marker entries",
			word_count, MARKER_COUNT
		)));
	}

	// The declared count is untrusted; never reserve from it. A short
	// input runs into `Truncated` on its own.
	let mut words = Vec::new();
	let mut seen = HashSet::new();
	for i in 0..word_count {
		let word = reader.next("word entry")?;
		if i < MARKER_COUNT {
			if !word.is_empty() {
				return Err(CorruptData::Structural(format!(
					"reserved marker entry {} is not empty: {:?}",
					i, word
				)));
			}
		} else {
			if word.is_empty() {
				return Err(CorruptData::Structural(format!("word entry {} is empty", i)));
			}
			if !seen.insert(word) {
				return Err(CorruptData::Structural(format!("duplicate word entry {:?}", word)));
			}
		}
		words.push(word.to_owned());
	}

	let mut counts = Vec::new();
	for from in 0..word_count {
		let mut row = Vec::new();
		for _ in 0..word_count {
			row.push(reader.next_number::<u32>("transition count")?);
		}
		// The start marker is never a destination and terminal markers
		// are never sources; counts claiming otherwise are inconsistent.
		if row[0] > 0 {
			return Err(CorruptData::Structural(format!(
				"row {} records the start marker as a transition destination",
				from
			)));
		}
		if (1..MARKER_COUNT).contains(&from) && row.iter().any(|&n| n > 0) {
			return Err(CorruptData::Structural(format!(
				"terminal marker row {} has outgoing transitions",
				from
			)));
		}
		// A sentence always holds at least one word, so the start row
		// never transitions straight into a terminal marker.
		if from == 0 && row[1..MARKER_COUNT].iter().any(|&n| n > 0) {
			return Err(CorruptData::Structural(
				"start row records a transition directly into a terminal marker".to_owned(),
			));
		}
		counts.push(row);
	}

	Ok(BigramTable::from_parts(words, counts))
}
