use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::QuoterError;

/// Reads a whole file into a `String`, tagging any I/O error with the path.
///
/// - Reads the entire file into memory
/// - Invalid UTF-8 sequences are replaced, not rejected; the tokenizer
///   drops anything outside its allowed character set anyway
pub(crate) fn read_file<P: AsRef<Path>>(path: P) -> Result<String, QuoterError> {
	let path = path.as_ref();
	let mut bytes = Vec::new();
	File::open(path)
		.and_then(|mut f| f.read_to_end(&mut bytes))
		.map_err(|e| QuoterError::io(path, e))?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes a string to a file, tagging any I/O error with the path.
pub(crate) fn write_file<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), QuoterError> {
	let path = path.as_ref();
	std::fs::write(path, contents).map_err(|e| QuoterError::io(path, e))
}
