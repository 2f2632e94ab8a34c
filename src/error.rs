//! Error types for corpus evaluation.
//!
//! The alignment core itself never fails; everything here comes from the
//! layers around it (reading corpora and tables, loading dictionaries, and
//! checking orchestrator preconditions).

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("JSON error while {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A homoglyph score list that could not be turned into a table.
    #[error("invalid homoglyph table: {0}")]
    HomoglyphTable(String),

    /// OCR or gold corpus content that does not follow the expected layout.
    #[error("invalid corpus: {0}")]
    Corpus(String),

    /// Orchestrator precondition violations (conflicting output options etc).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("dictionary error: {0}")]
    Dictionary(String),
}

impl EvalError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn corpus(message: impl Into<String>) -> Self {
        Self::Corpus(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
