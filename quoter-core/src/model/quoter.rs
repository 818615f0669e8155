use std::io::Read;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::codec;
use super::table::BigramTable;
use super::token::{self, MarkerKind, Token};
use crate::error::QuoterError;
use crate::io;

/// A first-order Markov sentence mimic.
///
/// A `Quoter` owns one vocabulary/transition-count table and one seeded
/// PRNG. Text fed into it accumulates word-to-word transition counts;
/// sampling walks those counts to build novel sentences in the style of
/// the fed text.
///
/// # Responsibilities
/// - Ingest text from strings, readers or files (cumulative; never resets)
/// - Build one sentence per call via a weighted random walk
/// - Persist and restore the full table under a versioned text format
/// - Merge with another quoter by summing counts
///
/// # Invariants
/// - Vocabulary and matrix sizes are monotonically non-decreasing
/// - Counts are monotonically non-decreasing; nothing is ever decremented
/// - A failed load leaves the in-memory state untouched
///
/// A quoter is single-threaded state: callers that share one instance
/// must serialize access externally.
#[derive(Debug)]
pub struct Quoter {
	table: BigramTable,
	rng: SmallRng,
}

/// Diagnostic snapshot of a quoter's table.
///
/// Row `i` of `counts` holds the outgoing transition counts of vocabulary
/// entry `i`; `row_sums[i]` is its cached total. The first four words are
/// the empty-text markers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuoterDump {
	pub words: Vec<String>,
	pub row_sums: Vec<u32>,
	pub counts: Vec<Vec<u32>>,
}

impl std::fmt::Display for QuoterDump {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (i, row) in self.counts.iter().enumerate() {
			let label = match MarkerKind::from_index(i) {
				Some(MarkerKind::Start) => "<start>",
				Some(MarkerKind::Period) => ".",
				Some(MarkerKind::Exclaim) => "!",
				Some(MarkerKind::Question) => "?",
				None => self.words[i].as_str(),
			};
			write!(f, "{:>12} |", label)?;
			for n in row {
				write!(f, " {:>3}", n)?;
			}
			writeln!(f, " | {}", self.row_sums[i])?;
		}
		Ok(())
	}
}

impl Quoter {
	/// Creates an empty quoter seeded from OS entropy.
	///
	/// Only the four reserved markers are present; all counts are zero.
	pub fn new() -> Self {
		Self {
			table: BigramTable::new(),
			rng: SmallRng::from_os_rng(),
		}
	}

	/// Creates an empty quoter with a fixed PRNG seed.
	///
	/// Two quoters with the same seed and the same feed history produce
	/// the same sentences.
	pub fn with_seed(seed: u64) -> Self {
		Self {
			table: BigramTable::new(),
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	/// Feeds a string of coherent text into the quoter for it to mimic.
	///
	/// Feeding is cumulative: feeding the same text twice doubles its
	/// counts. Empty input is a no-op.
	pub fn feed_str(&mut self, text: &str) {
		let tokens = token::tokenize(text);
		let Some(first) = tokens.first() else {
			return;
		};

		let mut from = self.table.index_of(first);
		for tok in &tokens[1..] {
			let to = self.table.index_of(tok);
			// A start marker is never a destination: the pair that
			// crosses a sentence boundary is not recorded.
			if !matches!(tok, Token::Marker(MarkerKind::Start)) {
				self.table.record(from, to);
			}
			from = to;
		}
	}

	/// Feeds a whole stream of coherent text into the quoter.
	///
	/// The stream is consumed to its end before any counting happens;
	/// invalid UTF-8 is replaced rather than rejected.
	pub fn feed_stream<R: Read>(&mut self, mut reader: R) -> std::io::Result<()> {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes)?;
		self.feed_str(&String::from_utf8_lossy(&bytes));
		Ok(())
	}

	/// Feeds a file of coherent text into the quoter.
	///
	/// # Errors
	/// Returns `QuoterError::Io` tagged with `path` if the file cannot be
	/// opened or read.
	pub fn feed_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), QuoterError> {
		let text = io::read_file(path)?;
		self.feed_str(&text);
		Ok(())
	}

	/// Builds one sentence from the fed text.
	///
	/// Performs a weighted random walk from the start state: each step
	/// draws a goal in `[1, row_sum]` and scans the row's columns in
	/// ascending index order, accumulating counts until the goal is
	/// reached. The scan order is fixed so a seeded quoter is fully
	/// reproducible. Reaching a terminal marker ends the sentence with
	/// its punctuation in place of the trailing separator.
	///
	/// # Errors
	/// Returns `QuoterError::NoOutgoingTransition` when the walk reaches
	/// a state with no recorded outgoing transitions, which includes the
	/// start state of a never-fed quoter.
	pub fn build_sentence(&mut self) -> Result<String, QuoterError> {
		let mut row = MarkerKind::Start.index();
		let mut sentence = String::new();

		loop {
			let total = self.table.row_sum(row);
			if total == 0 {
				return Err(QuoterError::NoOutgoingTransition {
					index: row,
					word: self.table.word(row).to_owned(),
				});
			}

			let goal = self.rng.random_range(1..=total);
			let mut accumulated = 0u32;
			let mut col = 0;
			for (i, &n) in self.table.row(row).iter().enumerate() {
				accumulated += n;
				if accumulated >= goal {
					col = i;
					break;
				}
			}

			match MarkerKind::from_index(col).and_then(MarkerKind::punctuation) {
				Some(punctuation) => {
					sentence.pop();
					sentence.push(punctuation);
					return Ok(sentence);
				}
				None => {
					sentence.push_str(self.table.word(col));
					sentence.push(' ');
					row = col;
				}
			}
		}
	}

	/// Writes the quoter's full state to a file.
	///
	/// # Errors
	/// Returns `QuoterError::Io` tagged with `path` on write failure.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), QuoterError> {
		io::write_file(path, &codec::encode(&self.table))
	}

	/// Replaces the quoter's state from a file.
	///
	/// The replacement is atomic: the current table is swapped out only
	/// after the whole file has parsed and validated, so a failed load
	/// leaves the quoter exactly as it was. The PRNG is not touched.
	///
	/// # Errors
	/// `QuoterError::Io` if the file cannot be read, `QuoterError::Corrupt`
	/// if its content fails validation (version mismatch included).
	pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), QuoterError> {
		let text = io::read_file(path)?;
		self.table = codec::decode(&text)?;
		Ok(())
	}

	/// Adds every transition count of `other` into this quoter.
	///
	/// Words unknown to this quoter are appended in `other`'s order.
	pub fn merge(&mut self, other: &Quoter) {
		self.table.merge(&other.table);
	}

	/// Number of vocabulary entries, the four reserved markers included.
	pub fn word_count(&self) -> usize {
		self.table.len()
	}

	/// True once any transition has been recorded.
	pub fn is_fed(&self) -> bool {
		(0..self.table.len()).any(|i| self.table.row_sum(i) > 0)
	}

	/// Snapshot of the table for diagnostics.
	pub fn dump(&self) -> QuoterDump {
		QuoterDump {
			words: self.table.words().to_vec(),
			row_sums: (0..self.table.len()).map(|i| self.table.row_sum(i)).collect(),
			counts: self.table.rows().to_vec(),
		}
	}
}

impl Default for Quoter {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::token::MARKER_COUNT;

	const START: usize = 0;
	const PERIOD: usize = 1;
	const EXCLAIM: usize = 2;

	fn index_of(q: &Quoter, word: &str) -> usize {
		q.table.index_of_existing(word).expect("word should be known")
	}

	#[test]
	fn feed_scenario_counts() {
		let mut q = Quoter::with_seed(1);
		q.feed_str("Dogs run. Cats jump!");

		assert_eq!(q.word_count(), 8);
		let dogs = index_of(&q, "Dogs");
		let run = index_of(&q, "run");
		let cats = index_of(&q, "Cats");
		let jump = index_of(&q, "jump");

		let expected = [
			(START, dogs),
			(dogs, run),
			(run, PERIOD),
			(START, cats),
			(cats, jump),
			(jump, EXCLAIM),
		];
		for from in 0..q.word_count() {
			for to in 0..q.word_count() {
				let want = u32::from(expected.contains(&(from, to)));
				assert_eq!(q.table.count(from, to), want, "matrix[{}][{}]", from, to);
			}
		}
	}

	#[test]
	fn feeding_twice_doubles_counts() {
		let text = "one two. three four? one two.";
		let mut once = Quoter::with_seed(0);
		once.feed_str(text);
		let mut twice = Quoter::with_seed(0);
		twice.feed_str(text);
		twice.feed_str(text);

		let single = once.dump();
		let double = twice.dump();
		assert_eq!(single.words, double.words);
		for (a, b) in single.counts.iter().flatten().zip(double.counts.iter().flatten()) {
			assert_eq!(a * 2, *b);
		}
		for (a, b) in single.row_sums.iter().zip(double.row_sums.iter()) {
			assert_eq!(a * 2, *b);
		}
	}

	#[test]
	fn row_sums_match_rows_after_feeds() {
		let mut q = Quoter::with_seed(7);
		q.feed_str("the quick brown fox jumps over the lazy dog.");
		q.feed_str("the dog sleeps! does the fox care?");
		let dump = q.dump();
		for (row, sum) in dump.counts.iter().zip(dump.row_sums.iter()) {
			assert_eq!(row.iter().sum::<u32>(), *sum);
		}
	}

	#[test]
	fn vocabulary_has_no_duplicates() {
		let mut q = Quoter::with_seed(7);
		q.feed_str("a b a b c a. b c? a!");
		let dump = q.dump();
		let user_words = &dump.words[MARKER_COUNT..];
		let mut sorted = user_words.to_vec();
		sorted.sort();
		sorted.dedup();
		assert_eq!(sorted.len(), user_words.len());
	}

	#[test]
	fn empty_feed_is_a_no_op() {
		let mut q = Quoter::with_seed(3);
		q.feed_str("something here.");
		let before = q.dump();
		q.feed_str("");
		q.feed_str("   \t\n");
		assert_eq!(q.dump(), before);
		assert!(q.is_fed());
	}

	#[test]
	fn unfed_quoter_reports_dead_end() {
		let mut q = Quoter::with_seed(0);
		assert!(!q.is_fed());
		match q.build_sentence() {
			Err(QuoterError::NoOutgoingTransition { index, .. }) => assert_eq!(index, START),
			other => panic!("unexpected: {:?}", other),
		}
	}

	#[test]
	fn sentences_terminate_with_punctuation() {
		let mut q = Quoter::with_seed(42);
		q.feed_str("dogs run fast. cats jump high! do birds sing?");
		for _ in 0..50 {
			let sentence = q.build_sentence().expect("model is fed");
			let last = sentence.chars().last().expect("non-empty");
			assert!(['.', '!', '?'].contains(&last), "sentence {:?}", sentence);
			assert!(sentence.chars().filter(|c| ['.', '!', '?'].contains(c)).count() == 1);
			assert!(sentence.len() > 1, "at least one word before the terminal");
		}
	}

	#[test]
	fn single_transition_chain_is_deterministic() {
		let mut q = Quoter::with_seed(5);
		q.feed_str("hello world.");
		assert_eq!(q.build_sentence().unwrap(), "hello world.");
		assert_eq!(q.build_sentence().unwrap(), "hello world.");
	}

	#[test]
	fn same_seed_same_history_same_sentences() {
		let corpus = "dogs run fast. cats jump high! do birds sing? fish swim.";
		let mut a = Quoter::with_seed(99);
		let mut b = Quoter::with_seed(99);
		a.feed_str(corpus);
		b.feed_str(corpus);
		for _ in 0..20 {
			assert_eq!(a.build_sentence().unwrap(), b.build_sentence().unwrap());
		}
	}

	#[test]
	fn feed_stream_matches_feed_str() {
		let text = "streams work too! honest.";
		let mut from_str = Quoter::with_seed(1);
		from_str.feed_str(text);
		let mut from_stream = Quoter::with_seed(1);
		from_stream.feed_stream(text.as_bytes()).unwrap();
		assert_eq!(from_str.dump(), from_stream.dump());
	}

	#[test]
	fn merge_accumulates_both_sides() {
		let mut a = Quoter::with_seed(0);
		a.feed_str("dogs run.");
		let mut b = Quoter::with_seed(0);
		b.feed_str("dogs sleep. cats run.");

		a.merge(&b);
		let dump = a.dump();
		for (row, sum) in dump.counts.iter().zip(dump.row_sums.iter()) {
			assert_eq!(row.iter().sum::<u32>(), *sum);
		}
		let dogs = index_of(&a, "dogs");
		assert_eq!(dump.counts[START][dogs], 2);
		assert!(dump.words.contains(&"cats".to_owned()));
		assert!(dump.words.contains(&"sleep".to_owned()));
	}

	#[test]
	fn missing_feed_file_reports_path() {
		let mut q = Quoter::with_seed(0);
		match q.feed_file("/no/such/file.txt") {
			Err(QuoterError::Io { path, .. }) => {
				assert_eq!(path, std::path::PathBuf::from("/no/such/file.txt"));
			}
			other => panic!("unexpected: {:?}", other),
		}
	}
}
