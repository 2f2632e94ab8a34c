//! The `ocr-eval` command line interface.

pub mod args;
pub mod commands;
