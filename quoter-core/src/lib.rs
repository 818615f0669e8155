//! Bigram sentence-mimicking library.
//!
//! This crate provides a first-order Markov (bigram) text model including:
//! - A sentence-aware tokenizer and normalizer
//! - An incrementally growing word/transition-count store
//! - Weighted random sentence sampling
//! - A versioned text save format with strict validation
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core bigram model and sampling logic.
///
/// This module exposes the high-level `Quoter` interface while keeping
/// internal table and codec representations private.
pub mod model;

/// Error types surfaced by all fallible operations.
pub mod error;

/// I/O utilities (file loading, path-tagged errors).
///
/// Not exposed
pub(crate) mod io;

pub use error::{CorruptData, QuoterError};
pub use model::quoter::{Quoter, QuoterDump};
