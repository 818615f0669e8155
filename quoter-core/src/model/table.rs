use std::collections::HashMap;

use super::token::{MARKER_COUNT, Token};

/// Vocabulary and transition-count matrix of a bigram model.
///
/// The word list, the square count matrix and the row-sum cache always have
/// the same length. The first four entries are the reserved sentence
/// markers, stored as empty strings; every later entry is a user word in
/// first-seen order. An index, once assigned, never changes.
///
/// # Invariants
/// - `words.len() == counts.len() == row_sums.len()`
/// - every row of `counts` has `words.len()` columns
/// - `row_sums[i]` equals the sum of row `i` after every mutation
/// - no word text repeats outside the four reserved entries
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BigramTable {
	words: Vec<String>,
	/// Lookup side of `words`; markers are not in here.
	index: HashMap<String, usize>,
	counts: Vec<Vec<u32>>,
	row_sums: Vec<u32>,
}

impl BigramTable {
	/// Creates a table holding only the four reserved markers, all counts
	/// zero.
	pub(crate) fn new() -> Self {
		Self {
			words: vec![String::new(); MARKER_COUNT],
			index: HashMap::new(),
			counts: vec![vec![0; MARKER_COUNT]; MARKER_COUNT],
			row_sums: vec![0; MARKER_COUNT],
		}
	}

	/// Rebuilds a table from raw parts, recomputing the row sums.
	///
	/// The caller (the codec) has already validated the shape: `words` is
	/// non-empty with the four reserved entries first, and `counts` is a
	/// `words.len()` square.
	pub(crate) fn from_parts(words: Vec<String>, counts: Vec<Vec<u32>>) -> Self {
		let index = words
			.iter()
			.enumerate()
			.skip(MARKER_COUNT)
			.map(|(i, w)| (w.clone(), i))
			.collect();
		let row_sums = counts.iter().map(|row| row.iter().sum()).collect();
		Self { words, index, counts, row_sums }
	}

	/// Number of vocabulary entries, reserved markers included.
	pub(crate) fn len(&self) -> usize {
		self.words.len()
	}

	pub(crate) fn words(&self) -> &[String] {
		&self.words
	}

	/// Word text at `index`. Reserved marker entries are empty strings.
	pub(crate) fn word(&self, index: usize) -> &str {
		&self.words[index]
	}

	pub(crate) fn count(&self, from: usize, to: usize) -> u32 {
		self.counts[from][to]
	}

	pub(crate) fn row(&self, from: usize) -> &[u32] {
		&self.counts[from]
	}

	pub(crate) fn row_sum(&self, from: usize) -> u32 {
		self.row_sums[from]
	}

	pub(crate) fn rows(&self) -> &[Vec<u32>] {
		&self.counts
	}

	/// Resolves a token to its vocabulary index, growing the table for a
	/// previously unseen word.
	///
	/// Markers resolve to their fixed reserved index. A new word appends
	/// one entry, one zero column on every existing row, and one all-zero
	/// row; this O(V) growth preserves row/column correspondence.
	pub(crate) fn index_of(&mut self, token: &Token) -> usize {
		match token {
			Token::Marker(kind) => kind.index(),
			Token::Word(text) => {
				if let Some(&i) = self.index.get(text) {
					return i;
				}
				let i = self.words.len();
				self.words.push(text.clone());
				self.index.insert(text.clone(), i);
				for row in &mut self.counts {
					row.push(0);
				}
				self.counts.push(vec![0; i + 1]);
				self.row_sums.push(0);
				i
			}
		}
	}

	/// Looks up a word without growing the table.
	pub(crate) fn index_of_existing(&self, word: &str) -> Option<usize> {
		self.index.get(word).copied()
	}

	/// Records one observed transition.
	pub(crate) fn record(&mut self, from: usize, to: usize) {
		self.counts[from][to] += 1;
		self.row_sums[from] += 1;
	}

	/// Adds every count of `other` into this table.
	///
	/// Words unknown to this table are appended in the order they appear
	/// in `other`; marker indices line up by construction.
	pub(crate) fn merge(&mut self, other: &BigramTable) {
		let mapping: Vec<usize> = other
			.words
			.iter()
			.enumerate()
			.map(|(i, w)| {
				if i < MARKER_COUNT {
					i
				} else {
					self.index_of(&Token::Word(w.clone()))
				}
			})
			.collect();

		for (from, row) in other.counts.iter().enumerate() {
			for (to, &n) in row.iter().enumerate() {
				if n > 0 {
					self.counts[mapping[from]][mapping[to]] += n;
					self.row_sums[mapping[from]] += n;
				}
			}
		}
	}
}

impl Default for BigramTable {
	fn default() -> Self {
		Self::new()
	}
}
