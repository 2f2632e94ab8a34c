use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{EvalError, Result};

/// Tunable constants of the alignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// An `equal` step longer than this splits the edit script into groups.
    pub long_equal_run: usize,
    /// Edits touching more than this many characters on either side are `major`.
    pub major_error_span: usize,
    /// Recursion limit; a slice reached at this depth is classified as-is.
    pub max_depth: usize,
}

impl AlignConfig {
    pub const DEFAULT_LONG_EQUAL_RUN: usize = 10;
    pub const DEFAULT_MAJOR_ERROR_SPAN: usize = 5;
    pub const DEFAULT_MAX_DEPTH: usize = 32;
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            long_equal_run: Self::DEFAULT_LONG_EQUAL_RUN,
            major_error_span: Self::DEFAULT_MAJOR_ERROR_SPAN,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Settings for a corpus evaluation run, usually read from a JSON file and
/// then overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub align: AlignConfig,
    /// Homoglyph pairs must score strictly above this to count as confusable.
    pub sensitivity: f64,
    pub homoglyph_path: Option<PathBuf>,
    /// Replace steps of exactly this length on both sides are recorded as
    /// substitutions. Zero records nothing.
    pub list_error_len: usize,
}

impl EvalConfig {
    pub const DEFAULT_SENSITIVITY: f64 = 0.2;

    pub fn from_file(path: &Path) -> Result<Self> {
        let context = format!("reading config {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| EvalError::io(context.clone(), e))?;
        serde_json::from_str(&content).map_err(|e| EvalError::json(context, e))
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            align: AlignConfig::default(),
            sensitivity: Self::DEFAULT_SENSITIVITY,
            homoglyph_path: None,
            list_error_len: 0,
        }
    }
}
