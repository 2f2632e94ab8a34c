//! Python bindings, so corpus tooling written in Python can call the aligner.

use std::collections::HashMap;
use std::path::PathBuf;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::align::{Aligner, ErrorClass, is_catastrophic};
use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::evaluate::build_aligner;
use crate::sanitize::{clean_ocr_text, sanitize_before_aligning};

impl From<EvalError> for PyErr {
    fn from(err: EvalError) -> PyErr {
        match err {
            EvalError::Io { .. } => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Aligner holding one homoglyph table for any number of `align` calls
#[pyclass(name = "Aligner", frozen)]
struct PyAligner {
    inner: Aligner,
}

#[pymethods]
impl PyAligner {
    #[new]
    #[pyo3(signature = (homoglyph_path=None, sensitivity=EvalConfig::DEFAULT_SENSITIVITY))]
    fn new(homoglyph_path: Option<PathBuf>, sensitivity: f64) -> PyResult<Self> {
        let config = EvalConfig {
            homoglyph_path,
            sensitivity,
            ..EvalConfig::default()
        };
        Ok(Self {
            inner: build_aligner(&config)?,
        })
    }

    /// Returns: (annotated_diff, {error_class: count}, [(gold, ocr), ...])
    #[pyo3(signature = (ocr, gold, list_error_len=0))]
    fn align(
        &self,
        ocr: String,
        gold: String,
        list_error_len: usize,
    ) -> (String, HashMap<String, u64>, Vec<(String, String)>) {
        let alignment = self.inner.align(&ocr, &gold, list_error_len);
        let counts = ErrorClass::ALL
            .iter()
            .map(|&class| (class.as_str().to_string(), alignment.counts.get(class)))
            .collect();
        let subs = alignment
            .substitutions
            .into_iter()
            .map(|s| (s.gold, s.ocr))
            .collect();
        (alignment.annotated, counts, subs)
    }
}

/// True when the texts are too mismatched in length to align
#[pyfunction]
fn check_for_catastrophic_error(ocr: String, gold: String) -> bool {
    is_catastrophic(&ocr, &gold)
}

#[pyfunction]
#[pyo3(name = "sanitize_before_aligning")]
fn py_sanitize_before_aligning(text: String) -> String {
    sanitize_before_aligning(&text)
}

#[pyfunction]
#[pyo3(name = "clean_ocr_text")]
fn py_clean_ocr_text(text: String) -> String {
    clean_ocr_text(&text)
}

#[pymodule]
fn rust_ocr_eval(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyAligner>()?;
    m.add_function(wrap_pyfunction!(check_for_catastrophic_error, m)?)?;
    m.add_function(wrap_pyfunction!(py_sanitize_before_aligning, m)?)?;
    m.add_function(wrap_pyfunction!(py_clean_ocr_text, m)?)?;
    Ok(())
}
