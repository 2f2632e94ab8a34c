//! Visual spellchecking: fixes unknown words by undoing one likely homoglyph
//! confusion. Produces alternative OCR corpora that are evaluated against the
//! gold transcriptions like the raw OCR.

use std::path::Path;

use log::info;
use rayon::prelude::*;

use crate::corpus::{Texts, load_ocr_corpus, method_path, write_ocr_corpus};
use crate::dictionary::WordSource;
use crate::error::Result;
use crate::homoglyph::HomoglyphTable;

/// Name under which corrected corpora are stored and evaluated.
pub const VISUAL_METHOD: &str = "visual";

const MIN_WORD_CHARS: usize = 2;
const MAX_WORD_CHARS: usize = 20;

pub struct VisualSpellChecker {
    words: WordSource,
    table: HomoglyphTable,
}

impl VisualSpellChecker {
    pub fn new(words: WordSource, table: HomoglyphTable) -> Self {
        Self { words, table }
    }

    /// Corrects a single whitespace-free token, keeping any punctuation
    /// around it.
    pub fn correct_word(&self, token: &str) -> String {
        let Some((start, end)) = word_bounds(token) else {
            return token.to_string();
        };
        let (prefix, word, suffix) = (&token[..start], &token[start..end], &token[end..]);

        let len = word.chars().count();
        if !(MIN_WORD_CHARS..=MAX_WORD_CHARS).contains(&len)
            || word.chars().all(char::is_numeric)
            || self.words.check(word)
        {
            return token.to_string();
        }

        let chars: Vec<char> = word.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            for alt in self.table.confusables(c) {
                let mut candidate = chars.clone();
                candidate[i] = alt;
                let candidate: String = candidate.into_iter().collect();
                if self.words.check(&candidate) {
                    return format!("{prefix}{candidate}{suffix}");
                }
            }
        }
        token.to_string()
    }

    pub fn correct_text(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.correct_word(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn correct_corpus(&self, texts: &Texts) -> Texts {
        texts
            .par_iter()
            .map(|(&id, text)| (id, self.correct_text(text)))
            .collect()
    }

    /// Corrects the OCR corpus at `ocr_path` and writes the result next to it
    /// as the `visual` method variant. Returns the number of articles written.
    pub fn correct_corpus_file(&self, ocr_path: &Path) -> Result<usize> {
        let texts = load_ocr_corpus(ocr_path)?;
        let corrected = self.correct_corpus(&texts);
        let changed = texts
            .iter()
            .filter(|&(id, text)| corrected.get(id) != Some(text))
            .count();

        let out = method_path(ocr_path, VISUAL_METHOD);
        write_ocr_corpus(&out, "corrected", &corrected)?;
        info!(
            "Visual spellcheck changed {} of {} articles, wrote {}",
            changed,
            texts.len(),
            out.display()
        );
        Ok(corrected.len())
    }
}

/// Byte range of the alphanumeric core of `token`.
fn word_bounds(token: &str) -> Option<(usize, usize)> {
    let start = token.find(char::is_alphanumeric)?;
    let (last, c) = token.char_indices().rev().find(|(_, c)| c.is_alphanumeric())?;
    Some((start, last + c.len_utf8()))
}
