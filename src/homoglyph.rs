//! Visual confusability of short OCR fragments.
//!
//! A [`HomoglyphTable`] is built once from `(a, b, similarity)` triples and is
//! read-only afterwards, so a single table can be shared by every alignment
//! running in parallel.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::align::ErrorClass;
use crate::error::{EvalError, Result};

/// Fragments longer than this (spaces removed) are never homoglyphic.
pub const MAX_HOMOGLYPH_CHARS: usize = 3;

/// Answers whether a short replacement is a visual confusion.
///
/// Implementations only ever return [`ErrorClass::Homoglyph`] or
/// [`ErrorClass::Nonhomoglyph`].
pub trait ConfusionOracle {
    fn classify(&self, ocr: &str, gold: &str) -> ErrorClass;
}

/// One entry of a homoglyph score list file.
#[derive(Debug, Clone, Deserialize)]
struct ScoreEntry {
    a: char,
    b: char,
    sim_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct HomoglyphTable {
    pairs: HashMap<char, HashMap<char, f64>>,
}

impl HomoglyphTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a symmetric table from similarity triples, keeping only pairs
    /// scoring strictly above `sensitivity`. Self-pairs are ignored.
    pub fn from_scores<I>(scores: I, sensitivity: f64) -> Self
    where
        I: IntoIterator<Item = (char, char, f64)>,
    {
        let mut table = Self::new();
        for (a, b, score) in scores {
            if score > sensitivity {
                table.insert(a, b, score);
            }
        }
        table
    }

    /// Loads a JSON list of `{"a": .., "b": .., "sim_score": ..}` entries.
    pub fn from_json_file(path: &Path, sensitivity: f64) -> Result<Self> {
        let context = format!("reading homoglyph list {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| EvalError::io(context.clone(), e))?;
        let table = Self::from_json_str(&content, sensitivity)?;
        info!(
            "Loaded homoglyph table from {}: {} characters above sensitivity {}",
            path.display(),
            table.len(),
            sensitivity
        );
        Ok(table)
    }

    pub fn from_json_str(json: &str, sensitivity: f64) -> Result<Self> {
        let entries: Vec<ScoreEntry> = serde_json::from_str(json)
            .map_err(|e| EvalError::HomoglyphTable(e.to_string()))?;
        Ok(Self::from_scores(
            entries.into_iter().map(|e| (e.a, e.b, e.sim_score)),
            sensitivity,
        ))
    }

    /// Registers `a` and `b` as confusable in both directions. A pair seen
    /// twice keeps its highest score.
    pub fn insert(&mut self, a: char, b: char, score: f64) {
        if a == b {
            return;
        }
        for (x, y) in [(a, b), (b, a)] {
            let entry = self.pairs.entry(x).or_default().entry(y).or_insert(score);
            if score > *entry {
                *entry = score;
            }
        }
    }

    pub fn is_pair(&self, a: char, b: char) -> bool {
        self.pairs.get(&a).is_some_and(|row| row.contains_key(&b))
    }

    /// Characters `c` may be mistaken for, most similar first.
    pub fn confusables(&self, c: char) -> Vec<char> {
        let Some(row) = self.pairs.get(&c) else {
            return Vec::new();
        };
        let mut ranked: Vec<(char, f64)> = row.iter().map(|(&ch, &score)| (ch, score)).collect();
        ranked.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
        ranked.into_iter().map(|(ch, _)| ch).collect()
    }

    /// Number of characters with at least one confusable partner.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl ConfusionOracle for HomoglyphTable {
    fn classify(&self, ocr: &str, gold: &str) -> ErrorClass {
        let ocr: Vec<char> = ocr.chars().filter(|&c| c != ' ').collect();
        let gold: Vec<char> = gold.chars().filter(|&c| c != ' ').collect();

        if ocr.len() > MAX_HOMOGLYPH_CHARS || gold.len() > MAX_HOMOGLYPH_CHARS {
            return ErrorClass::Nonhomoglyph;
        }
        let confusable = ocr
            .iter()
            .any(|&o| gold.iter().any(|&g| self.is_pair(o, g)));
        if confusable {
            ErrorClass::Homoglyph
        } else {
            ErrorClass::Nonhomoglyph
        }
    }
}
