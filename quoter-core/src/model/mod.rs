//! Top-level module for the bigram quote generation system.
//!
//! This crate provides a first-order Markov sentence mimic, including:
//! - Sentence-aware tokenization (`token`)
//! - The word/transition-count store (`BigramTable`)
//! - The versioned save codec (`codec`)
//! - The high-level model interface (`Quoter`)

/// High-level interface owning one vocabulary/count table and one PRNG.
///
/// Exposes feeding, sentence building, persistence and diagnostics.
pub mod quoter;

/// Token stream production: markers, words, and the two-pass tokenizer.
///
/// Exposed for callers that want to inspect tokenization directly.
pub mod token;

/// Internal vocabulary and transition-count matrix.
///
/// Tracks word indices, per-pair counts and cached row sums.
/// This module is not exposed publicly.
mod table;

/// Internal versioned text codec for save files.
///
/// Handles strict validation on decode. Not exposed publicly.
mod codec;
