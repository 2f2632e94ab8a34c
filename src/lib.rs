//! Character-level evaluation of OCR output against gold transcriptions.
//!
//! Texts are aligned with a longest-matching-block diff, the edit script is
//! refined around long exact runs, and every edit is classified as
//! homoglyphic, non-homoglyphic, major or catastrophic. Corpus helpers run
//! the same scoring over whole newspaper scans, optionally after a visual
//! spellcheck pass.

pub mod align;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod dictionary;
pub mod error;
pub mod evaluate;
pub mod homoglyph;
pub mod opcodes;
pub mod report;
pub mod sanitize;
pub mod spellcheck;

#[cfg(feature = "python")]
mod python;

pub use align::{Aligner, Alignment, ErrorClass, ErrorCounts, Substitution, is_catastrophic};
pub use config::{AlignConfig, EvalConfig};
pub use error::{EvalError, Result};
pub use homoglyph::{ConfusionOracle, HomoglyphTable};
