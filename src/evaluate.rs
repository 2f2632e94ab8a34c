//! Corpus-level evaluation: align every OCR article against its gold
//! transcription and add up the errors.

use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::align::{Aligner, Alignment, ErrorCounts, Substitution, is_catastrophic};
use crate::config::EvalConfig;
use crate::corpus::{Texts, load_ocr_corpus, method_path};
use crate::error::{EvalError, Result};
use crate::homoglyph::{ConfusionOracle, HomoglyphTable};
use crate::sanitize::sanitize_before_aligning;

/// Builds the aligner described by `config`, loading its homoglyph list.
/// Without a list every short replacement is non-homoglyphic.
pub fn build_aligner(config: &EvalConfig) -> Result<Aligner> {
    let table = match &config.homoglyph_path {
        Some(path) => HomoglyphTable::from_json_file(path, config.sensitivity)?,
        None => {
            warn!("No homoglyph list configured; replacements count as non-homoglyphic");
            HomoglyphTable::new()
        }
    };
    Ok(Aligner::new(table).with_config(config.align))
}

/// Scores one sanitized text pair. Pairs too mismatched to align count as a
/// single catastrophic error with no annotation.
pub fn evaluate_pair<O: ConfusionOracle>(
    aligner: &Aligner<O>,
    ocr: &str,
    gold: &str,
    list_error_len: usize,
) -> Alignment {
    if is_catastrophic(ocr, gold) {
        return Alignment::catastrophic();
    }
    aligner.align(ocr, gold, list_error_len)
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResult {
    pub id: u64,
    /// OCR text as it was aligned (after sanitization).
    pub ocr: String,
    pub annotated: String,
    pub counts: ErrorCounts,
    pub substitutions: Vec<Substitution>,
}

/// Totals for one spellcheck method (the empty method is uncorrected OCR).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MethodReport {
    pub method: String,
    pub counts: ErrorCounts,
    pub substitutions: Vec<Substitution>,
    /// Sanitized OCR characters evaluated.
    pub total_chars: usize,
    /// Requested ids with no OCR or no gold text.
    pub skipped: Vec<u64>,
    #[serde(skip)]
    pub articles: Vec<ArticleResult>,
}

impl MethodReport {
    pub fn label(&self) -> &str {
        if self.method.is_empty() {
            "no correction"
        } else {
            &self.method
        }
    }
}

/// Aligns the requested articles (all OCR articles when `ids` is `None`) in
/// parallel. Results are merged in id order regardless of completion order.
pub fn evaluate_corpus<O: ConfusionOracle + Sync>(
    aligner: &Aligner<O>,
    method: &str,
    ocr: &Texts,
    gold: &Texts,
    ids: Option<&[u64]>,
    list_error_len: usize,
) -> MethodReport {
    let ids: Vec<u64> = match ids {
        Some(ids) => ids.to_vec(),
        None => ocr.keys().copied().collect(),
    };

    let mut report = MethodReport {
        method: method.to_string(),
        ..MethodReport::default()
    };
    let mut pairs = Vec::with_capacity(ids.len());
    for id in ids {
        match (ocr.get(&id), gold.get(&id)) {
            (Some(o), Some(g)) => pairs.push((id, o.as_str(), g.as_str())),
            (None, _) => {
                warn!("Skipping article {id}: no OCR text");
                report.skipped.push(id);
            }
            (_, None) => {
                warn!("Skipping article {id}: no gold transcription");
                report.skipped.push(id);
            }
        }
    }

    let articles: Vec<ArticleResult> = pairs
        .par_iter()
        .map(|&(id, ocr_text, gold_text)| {
            let ocr_clean = sanitize_before_aligning(ocr_text);
            let gold_clean = sanitize_before_aligning(gold_text);
            let alignment = evaluate_pair(aligner, &ocr_clean, &gold_clean, list_error_len);
            ArticleResult {
                id,
                ocr: ocr_clean,
                annotated: alignment.annotated,
                counts: alignment.counts,
                substitutions: alignment.substitutions,
            }
        })
        .collect();

    for article in &articles {
        report.total_chars += article.ocr.chars().count();
        report.counts.merge(&article.counts);
        report.substitutions.extend(article.substitutions.iter().cloned());
    }
    report.articles = articles;

    info!(
        "{}: {} articles, {} errors ({} catastrophic), {} substitutions",
        report.label(),
        report.articles.len(),
        report.counts.errors(),
        report.counts.catastrophic,
        report.substitutions.len()
    );
    report
}

/// Evaluates each spellcheck variant of the OCR corpus and then the
/// uncorrected corpus, which always comes last.
///
/// With `visualize` set, exactly one id and at most one method are allowed,
/// since the visualization shows a single article.
pub fn evaluate_methods<O: ConfusionOracle + Sync>(
    aligner: &Aligner<O>,
    ocr_path: &Path,
    gold: &Texts,
    ids: Option<&[u64]>,
    methods: &[String],
    list_error_len: usize,
    visualize: bool,
) -> Result<Vec<MethodReport>> {
    if visualize {
        if ids.map(<[u64]>::len) != Some(1) {
            return Err(EvalError::invalid_argument(
                "visualization needs exactly one text id",
            ));
        }
        if methods.len() > 1 {
            return Err(EvalError::invalid_argument(
                "visualization allows at most one spellcheck method",
            ));
        }
    }
    if methods.iter().any(String::is_empty) {
        return Err(EvalError::invalid_argument(
            "spellcheck method names must not be empty",
        ));
    }

    let mut reports = Vec::with_capacity(methods.len() + 1);
    for method in methods.iter().map(String::as_str).chain(std::iter::once("")) {
        let ocr = load_ocr_corpus(&method_path(ocr_path, method))?;
        reports.push(evaluate_corpus(aligner, method, &ocr, gold, ids, list_error_len));
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::ErrorClass;

    fn aligner() -> Aligner {
        Aligner::new(HomoglyphTable::from_scores([('l', '1', 0.9)], 0.2))
    }

    fn texts(entries: &[(u64, &str)]) -> Texts {
        entries.iter().map(|&(id, t)| (id, t.to_string())).collect()
    }

    #[test]
    fn builds_aligner_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homoglyphs.json");
        std::fs::write(&path, r#"[{"a": "h", "b": "b", "sim_score": 0.5}]"#).unwrap();

        let config = EvalConfig {
            homoglyph_path: Some(path),
            ..EvalConfig::default()
        };
        let aligner = build_aligner(&config).unwrap();
        assert!(aligner.oracle().is_pair('b', 'h'));
        assert_eq!(aligner.align("tbe", "the", 1).counts.homoglyph, 1);

        let plain = build_aligner(&EvalConfig::default()).unwrap();
        assert!(plain.oracle().is_empty());
    }

    #[test]
    fn catastrophic_pairs_short_circuit() {
        let result = evaluate_pair(&aligner(), "", "some gold text", 1);
        assert_eq!(result.counts, ErrorCounts::single(ErrorClass::Catastrophic));
        assert!(result.annotated.is_empty());
        assert!(result.substitutions.is_empty());
    }

    #[test]
    fn corpus_counts_add_up() {
        let ocr = texts(&[(1, "he11o  world"), (2, ""), (3, "exact match")]);
        let gold = texts(&[(1, "hello world"), (2, "lost article"), (3, "exact match")]);

        let report = evaluate_corpus(&aligner(), "", &ocr, &gold, None, 1);
        assert_eq!(report.articles.len(), 3);
        assert_eq!(report.counts.catastrophic, 1);
        assert_eq!(report.counts.homoglyph, 1);
        assert_eq!(
            report.articles.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        // sanitization collapsed the double space before aligning
        assert_eq!(report.articles[0].ocr, "he11o world");
        assert_eq!(report.total_chars, "he11o world".len() + "exact match".len());
    }

    #[test]
    fn missing_texts_are_skipped() {
        let ocr = texts(&[(1, "text"), (2, "other")]);
        let gold = texts(&[(1, "text")]);
        let report = evaluate_corpus(&aligner(), "", &ocr, &gold, Some(&[1, 2, 9][..]), 0);
        assert_eq!(report.skipped, vec![2, 9]);
        assert_eq!(report.articles.len(), 1);
    }

    #[test]
    fn visualization_preconditions() {
        let gold = Texts::new();
        let path = Path::new("/nonexistent/ocr.json");
        let methods = vec!["visual".to_string(), "other".to_string()];

        let err = evaluate_methods(&aligner(), path, &gold, None, &[], 0, true).unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument(_)));

        let err =
            evaluate_methods(&aligner(), path, &gold, Some(&[1, 2][..]), &[], 0, true).unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument(_)));

        let err =
            evaluate_methods(&aligner(), path, &gold, Some(&[1][..]), &methods, 0, true).unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument(_)));
    }
}
