use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use quoter_core::Quoter;

/// Maintain a stash of bigram sentence models and their save files.
///
/// Models are stashed against the path they will be saved to; no two
/// stashed models may share a path. Operations run in a fixed order:
/// stash construction (--new, --overwrite, --load, then --merge), then
/// feeding, then building. At normal exit every stashed model is written
/// back to its save file.
#[derive(Debug, Parser)]
#[command(name = "quoter", version)]
struct Cli {
	/// Abort the whole run on the first failed operation
	/// (default is tolerant: log the failure and continue)
	#[arg(short, long)]
	strict: bool,

	/// PRNG seed for models created or loaded by this run
	#[arg(long, value_name = "N")]
	seed: Option<u64>,

	/// Create a fresh model to be saved at PATH; PATH must not exist yet
	#[arg(short, long, value_name = "PATH")]
	new: Vec<PathBuf>,

	/// Create a fresh model replacing the existing save file at PATH
	#[arg(short, long, value_name = "PATH")]
	overwrite: Vec<PathBuf>,

	/// Load a model from its save file at PATH
	#[arg(short, long, value_name = "PATH")]
	load: Vec<PathBuf>,

	/// Stash the merge of every stashed model, to be saved at PATH
	#[arg(short, long, value_name = "PATH")]
	merge: Vec<PathBuf>,

	/// Feed a text file to every stashed model
	#[arg(short, long, value_name = "FILE")]
	feed: Vec<PathBuf>,

	/// Print one freshly built sentence per stashed model
	#[arg(short, long)]
	build: bool,

	/// Print each stashed model's transition matrix
	#[arg(short, long)]
	dump: bool,
}

/// A stashed model and the path it will be saved to.
struct Entry {
	quoter: Quoter,
	path: PathBuf,
}

/// In strict mode the first failure aborts the run; otherwise failures
/// are logged and the run continues.
struct FailurePolicy {
	strict: bool,
}

impl FailurePolicy {
	fn handle(&self, result: Result<(), String>) -> Result<(), String> {
		match result {
			Ok(()) => Ok(()),
			Err(message) if self.strict => Err(message),
			Err(message) => {
				log::warn!("{}", message);
				Ok(())
			}
		}
	}
}

fn stashed(stash: &[Entry], path: &Path) -> bool {
	stash.iter().any(|entry| entry.path == path)
}

fn fresh_quoter(seed: Option<u64>) -> Quoter {
	match seed {
		Some(seed) => Quoter::with_seed(seed),
		None => Quoter::new(),
	}
}

fn option_new(stash: &mut Vec<Entry>, path: PathBuf, seed: Option<u64>) -> Result<(), String> {
	if path.exists() || stashed(stash, &path) {
		return Err(format!("cannot create '{}'; it already exists", path.display()));
	}
	stash.push(Entry { quoter: fresh_quoter(seed), path });
	Ok(())
}

fn option_overwrite(stash: &mut Vec<Entry>, path: PathBuf, seed: Option<u64>) -> Result<(), String> {
	if !path.exists() {
		return Err(format!("cannot overwrite '{}'; it doesn't exist", path.display()));
	}
	if stashed(stash, &path) {
		return Err(format!("cannot overwrite '{}'; it has already been stashed", path.display()));
	}
	stash.push(Entry { quoter: fresh_quoter(seed), path });
	Ok(())
}

fn option_load(stash: &mut Vec<Entry>, path: PathBuf, seed: Option<u64>) -> Result<(), String> {
	if stashed(stash, &path) {
		return Err(format!("cannot load '{}'; it has already been stashed", path.display()));
	}
	let mut quoter = fresh_quoter(seed);
	quoter
		.load(&path)
		.map_err(|e| format!("cannot load quoter data: {}", e))?;
	stash.push(Entry { quoter, path });
	Ok(())
}

fn option_merge(stash: &mut Vec<Entry>, path: PathBuf, seed: Option<u64>) -> Result<(), String> {
	if path.exists() || stashed(stash, &path) {
		return Err(format!("cannot create '{}'; it already exists", path.display()));
	}
	if stash.is_empty() {
		return Err("cannot merge; stash is empty".to_owned());
	}
	let mut merged = fresh_quoter(seed);
	for entry in stash.iter() {
		merged.merge(&entry.quoter);
	}
	stash.push(Entry { quoter: merged, path });
	Ok(())
}

fn option_feed(stash: &mut [Entry], file: &Path) -> Result<(), String> {
	if stash.is_empty() {
		return Err(format!("cannot feed '{}'; stash is empty", file.display()));
	}
	if !file.exists() {
		return Err(format!(
			"cannot feed '{}' to stashed models; it doesn't exist",
			file.display()
		));
	}
	// A single model's failure must not starve the rest of the stash,
	// and never escalates to a strict-mode exit.
	for entry in stash.iter_mut() {
		if let Err(e) = entry.quoter.feed_file(file) {
			log::warn!("cannot feed to '{}': {}", entry.path.display(), e);
		}
	}
	Ok(())
}

fn option_build(stash: &mut [Entry]) -> Result<(), String> {
	if stash.is_empty() {
		return Err("cannot build sentences; stash is empty".to_owned());
	}
	for entry in stash.iter_mut() {
		let sentence = entry
			.quoter
			.build_sentence()
			.map_err(|e| format!("cannot build sentence for '{}': {}", entry.path.display(), e))?;
		println!("{}", sentence);
	}
	Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
	let policy = FailurePolicy { strict: cli.strict };
	let mut stash: Vec<Entry> = Vec::new();

	for path in cli.new {
		policy.handle(option_new(&mut stash, path, cli.seed))?;
	}
	for path in cli.overwrite {
		policy.handle(option_overwrite(&mut stash, path, cli.seed))?;
	}
	for path in cli.load {
		policy.handle(option_load(&mut stash, path, cli.seed))?;
	}
	for path in cli.merge {
		policy.handle(option_merge(&mut stash, path, cli.seed))?;
	}
	for file in cli.feed {
		policy.handle(option_feed(&mut stash, &file))?;
	}
	if cli.build {
		policy.handle(option_build(&mut stash))?;
	}
	if cli.dump {
		for entry in &stash {
			println!("{}:", entry.path.display());
			print!("{}", entry.quoter.dump());
		}
	}

	// Write every stashed model back to its save file.
	for entry in &stash {
		policy.handle(
			entry
				.quoter
				.save(&entry.path)
				.map_err(|e| format!("cannot save '{}': {}", entry.path.display(), e)),
		)?;
	}

	Ok(())
}

fn main() -> ExitCode {
	env_logger::init();
	let cli = Cli::parse();
	let strict = cli.strict;

	match run(cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(message) => {
			log::error!("{}", message);
			if strict {
				log::error!("exiting as per strict mode");
			}
			ExitCode::FAILURE
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(path: &str) -> Entry {
		Entry { quoter: Quoter::with_seed(0), path: PathBuf::from(path) }
	}

	#[test]
	fn new_rejects_duplicate_stash_paths() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("a.bq");
		let mut stash = Vec::new();
		assert!(option_new(&mut stash, path.clone(), None).is_ok());
		assert!(option_new(&mut stash, path, None).is_err());
		assert_eq!(stash.len(), 1);
	}

	#[test]
	fn new_rejects_existing_files() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("a.bq");
		std::fs::write(&path, "x").unwrap();
		let mut stash = Vec::new();
		assert!(option_new(&mut stash, path, None).is_err());
	}

	#[test]
	fn overwrite_requires_existing_file() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("missing.bq");
		let mut stash = Vec::new();
		assert!(option_overwrite(&mut stash, missing, None).is_err());

		let present = dir.path().join("present.bq");
		std::fs::write(&present, "x").unwrap();
		assert!(option_overwrite(&mut stash, present, None).is_ok());
	}

	#[test]
	fn load_round_trips_through_stash() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.bq");
		let mut original = Quoter::with_seed(1);
		original.feed_str("dogs run.");
		original.save(&path).unwrap();

		let mut stash = Vec::new();
		assert!(option_load(&mut stash, path.clone(), None).is_ok());
		assert_eq!(stash[0].quoter.dump(), original.dump());
		// A second load of the same path is a duplicate.
		assert!(option_load(&mut stash, path, None).is_err());
	}

	#[test]
	fn merge_needs_a_non_empty_stash() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("merged.bq");
		let mut stash = Vec::new();
		assert!(option_merge(&mut stash, path.clone(), None).is_err());

		stash.push(entry("kept-in-memory"));
		stash[0].quoter.feed_str("dogs run.");
		assert!(option_merge(&mut stash, path, None).is_ok());
		assert_eq!(stash.len(), 2);
		assert!(stash[1].quoter.is_fed());
	}

	#[test]
	fn feed_and_build_require_stash_entries() {
		let mut stash: Vec<Entry> = Vec::new();
		assert!(option_feed(&mut stash, Path::new("whatever.txt")).is_err());
		assert!(option_build(&mut stash).is_err());
	}

	#[test]
	fn feed_requires_an_existing_file() {
		let dir = tempfile::tempdir().unwrap();
		let mut stash = vec![entry("a.bq")];
		assert!(option_feed(&mut stash, &dir.path().join("missing.txt")).is_err());
		assert!(!stash[0].quoter.is_fed());
	}

	#[test]
	fn feed_reaches_every_stash_entry() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("corpus.txt");
		std::fs::write(&file, "dogs run. cats jump!").unwrap();

		let mut stash = vec![entry("a.bq"), entry("b.bq")];
		assert!(option_feed(&mut stash, &file).is_ok());
		assert!(stash.iter().all(|e| e.quoter.is_fed()));
	}

	#[test]
	fn tolerant_policy_swallows_failures() {
		let tolerant = FailurePolicy { strict: false };
		assert!(tolerant.handle(Err("boom".to_owned())).is_ok());
		let strict = FailurePolicy { strict: true };
		assert!(strict.handle(Err("boom".to_owned())).is_err());
	}
}
