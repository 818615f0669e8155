/// Sentence boundary markers.
///
/// The four kinds permanently occupy the first four vocabulary indices, in
/// this order. `Start` opens a sentence and is never a transition
/// destination; the other three are terminal punctuation and are never
/// transition sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
	Start,
	Period,
	Exclaim,
	Question,
}

/// Number of reserved marker entries at the front of every vocabulary.
pub const MARKER_COUNT: usize = 4;

impl MarkerKind {
	/// Reserved vocabulary index of this marker (0..=3).
	pub fn index(self) -> usize {
		match self {
			MarkerKind::Start => 0,
			MarkerKind::Period => 1,
			MarkerKind::Exclaim => 2,
			MarkerKind::Question => 3,
		}
	}

	/// Marker kind occupying a reserved index, `None` past the range.
	pub fn from_index(index: usize) -> Option<Self> {
		match index {
			0 => Some(MarkerKind::Start),
			1 => Some(MarkerKind::Period),
			2 => Some(MarkerKind::Exclaim),
			3 => Some(MarkerKind::Question),
			_ => None,
		}
	}

	/// Punctuation character for terminal markers, `None` for `Start`.
	pub fn punctuation(self) -> Option<char> {
		match self {
			MarkerKind::Start => None,
			MarkerKind::Period => Some('.'),
			MarkerKind::Exclaim => Some('!'),
			MarkerKind::Question => Some('?'),
		}
	}
}

/// A single item of the token stream: a sentence boundary or a word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
	Marker(MarkerKind),
	Word(String),
}

/// Detects whether a whitespace-delimited fragment ends its sentence.
///
/// First match wins, in the fixed priority order `.` then `!` then `?`.
fn detect_terminal(fragment: &str) -> Option<MarkerKind> {
	if fragment.contains('.') {
		Some(MarkerKind::Period)
	} else if fragment.contains('!') {
		Some(MarkerKind::Exclaim)
	} else if fragment.contains('?') {
		Some(MarkerKind::Question)
	} else {
		None
	}
}

/// Strips a fragment down to the allowed character set.
///
/// Keeps alphanumerics plus a small set of punctuation that is meaningful
/// inside a word: the ASCII `#`..=`'` range, comma, hyphen and `@`.
/// Everything else is dropped, not replaced.
fn filter_fragment(fragment: &str) -> String {
	fragment
		.chars()
		.filter(|c| c.is_alphanumeric() || ('#'..='\'').contains(c) || *c == ',' || *c == '-' || *c == '@')
		.collect()
}

/// Converts raw text into an ordered token sequence.
///
/// Two passes over the input:
/// 1. Whitespace segmentation. Every sentence opens with a `Start` marker;
///    a fragment containing terminal punctuation closes the sentence with
///    the matching marker, unless the sentence has collected no tokens yet
///    (a terminal right after a bare `Start` would make an empty sentence,
///    so the sentence stays open).
/// 2. Boundary mend. A trailing bare `Start` is dropped; a trailing word
///    gets a `Period` so every emitted sentence is closed.
///
/// Empty input yields an empty sequence.
pub fn tokenize(text: &str) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut need_start = true;

	for fragment in text.split_whitespace() {
		let terminal = detect_terminal(fragment);
		let word = filter_fragment(fragment);

		if need_start {
			tokens.push(Token::Marker(MarkerKind::Start));
			need_start = false;
		}
		if !word.is_empty() {
			tokens.push(Token::Word(word));
		}
		if let Some(kind) = terminal {
			if !matches!(tokens.last(), Some(Token::Marker(MarkerKind::Start))) {
				tokens.push(Token::Marker(kind));
				need_start = true;
			}
		}
	}

	match tokens.last() {
		Some(Token::Marker(MarkerKind::Start)) => {
			tokens.pop();
		}
		Some(Token::Word(_)) => tokens.push(Token::Marker(MarkerKind::Period)),
		_ => (),
	}

	tokens
}

#[cfg(test)]
mod tests {
	use super::*;

	fn word(w: &str) -> Token {
		Token::Word(w.to_owned())
	}

	fn marker(kind: MarkerKind) -> Token {
		Token::Marker(kind)
	}

	#[test]
	fn two_sentences() {
		assert_eq!(
			tokenize("Dogs run. Cats jump!"),
			vec![
				marker(MarkerKind::Start),
				word("Dogs"),
				word("run"),
				marker(MarkerKind::Period),
				marker(MarkerKind::Start),
				word("Cats"),
				word("jump"),
				marker(MarkerKind::Exclaim),
			]
		);
	}

	#[test]
	fn empty_input_yields_nothing() {
		assert_eq!(tokenize(""), vec![]);
		assert_eq!(tokenize("   \n\t "), vec![]);
	}

	#[test]
	fn unterminated_sentence_gets_a_period() {
		assert_eq!(
			tokenize("hello world"),
			vec![marker(MarkerKind::Start), word("hello"), word("world"), marker(MarkerKind::Period)]
		);
	}

	#[test]
	fn terminal_priority_is_period_exclaim_question() {
		assert_eq!(detect_terminal("what?!."), Some(MarkerKind::Period));
		assert_eq!(detect_terminal("what?!"), Some(MarkerKind::Exclaim));
		assert_eq!(detect_terminal("what?"), Some(MarkerKind::Question));
		assert_eq!(detect_terminal("what"), None);
	}

	#[test]
	fn disallowed_bytes_are_dropped() {
		assert_eq!(filter_fragment("(can't)"), "can't");
		assert_eq!(filter_fragment("semi;colon"), "semicolon");
		assert_eq!(filter_fragment("e-mail@host"), "e-mail@host");
		assert_eq!(filter_fragment("..."), "");
	}

	#[test]
	fn empty_fragment_still_closes_sentence() {
		// The bare "." carries no word but terminates the sentence.
		assert_eq!(
			tokenize("dogs run ."),
			vec![marker(MarkerKind::Start), word("dogs"), word("run"), marker(MarkerKind::Period)]
		);
	}

	#[test]
	fn terminal_after_bare_start_does_not_close() {
		// "..." produces no word; the sentence stays open and "ok" lands
		// in the same sentence.
		assert_eq!(
			tokenize("... ok."),
			vec![marker(MarkerKind::Start), word("ok"), marker(MarkerKind::Period)]
		);
	}

	#[test]
	fn trailing_bare_start_is_dropped() {
		// The final "..." opens nothing: punctuation-only input after a
		// closed sentence leaves a bare start that the mend pass removes.
		assert_eq!(
			tokenize("done. ;"),
			vec![marker(MarkerKind::Start), word("done"), marker(MarkerKind::Period)]
		);
	}

	#[test]
	fn punctuation_only_input_is_empty() {
		assert_eq!(tokenize("; : ;;"), vec![]);
	}
}
