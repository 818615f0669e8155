use std::path::PathBuf;

/// Errors produced by the bigram quoter.
///
/// The core never logs and never terminates the process; every failure is
/// returned to the immediate caller through this type.
///
/// # Variants
/// - `Io`: a file could not be opened, read, or written; carries the path.
/// - `Corrupt`: save data failed validation during a load. The live model
///   is never partially overwritten when this is returned.
/// - `NoOutgoingTransition`: sampling reached a state with no recorded
///   outgoing transitions (notably the start state of a never-fed model).
#[derive(Debug, thiserror::Error)]
pub enum QuoterError {
	#[error("{}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("corrupt save data: {0}")]
	Corrupt(#[from] CorruptData),

	#[error("no outgoing transition from {word:?} (state {index})")]
	NoOutgoingTransition { index: usize, word: String },
}

/// Validation failures raised while decoding a save file.
///
/// Each variant keeps enough detail to point at the offending line or
/// field. Decoding is all-or-nothing, so any of these means the file was
/// rejected in full.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CorruptData {
	/// Declared format version differs from the supported one.
	/// No forward or backward compatibility is attempted.
	#[error("unsupported format version {found_major}.{found_minor}, expected {expected_major}.{expected_minor}")]
	VersionMismatch {
		found_major: u16,
		found_minor: u16,
		expected_major: u16,
		expected_minor: u16,
	},

	/// Input ended before the declared words or counts were all read.
	#[error("unexpected end of data while reading {expected}")]
	Truncated { expected: &'static str },

	/// A field that should be numeric failed to parse.
	#[error("malformed {field} on line {line}: {value:?}")]
	Malformed {
		field: &'static str,
		line: usize,
		value: String,
	},

	/// The decoded data violates a structural invariant
	/// (reserved entries, duplicate words, word count below minimum).
	#[error("{0}")]
	Structural(String),
}

impl QuoterError {
	/// Wraps an I/O error with the path it occurred on.
	pub(crate) fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}
