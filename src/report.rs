//! Files written after an evaluation: a markdown visualization of a single
//! article and per-method character confusion tables.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::align::Substitution;
use crate::corpus::method_path;
use crate::error::{EvalError, Result};
use crate::evaluate::MethodReport;
use crate::sanitize::clean_for_markdown;

fn write_file(path: &Path, contents: &str, what: &str) -> Result<()> {
    let context = format!("writing {} {}", what, path.display());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EvalError::io(context.clone(), e))?;
    }
    fs::write(path, contents).map_err(|e| EvalError::io(context, e))
}

fn substitution_list(subs: &[Substitution]) -> String {
    let items: Vec<String> = subs
        .iter()
        .map(|s| format!("({:?}, {:?})", s.gold, s.ocr))
        .collect();
    format!("[{}]", items.join(", "))
}

/// Renders the markdown comparison for one article: each method's OCR text,
/// annotated edits and substitutions (uncorrected OCR first), then the gold
/// text and the error counts.
pub fn render_visualization(gold: &str, reports: &[MethodReport]) -> Result<String> {
    let Some((baseline, methods)) = reports.split_last() else {
        return Err(EvalError::invalid_argument("nothing to visualize"));
    };
    let mut sections = Vec::with_capacity(reports.len());
    for report in reports {
        match report.articles.as_slice() {
            [article] => sections.push((report, article)),
            _ => {
                return Err(EvalError::invalid_argument(format!(
                    "visualization needs exactly one article per method, {} has {}",
                    report.label(),
                    report.articles.len()
                )));
            }
        }
    }
    // baseline section first, then the spellcheck methods in order
    sections.rotate_right(1);

    let mut out = String::new();
    for (i, (report, article)) in sections.iter().enumerate() {
        let label = if report.method.is_empty() {
            "no corrections".to_string()
        } else {
            format!("with {}", report.method)
        };
        let sep = if i == 0 { "" } else { "<br/>\n" };
        let _ = write!(
            out,
            "{sep}***OCR Transcription -- {label}***\n <br/>{}\n  <br/>",
            clean_for_markdown(&article.ocr)
        );
        let _ = write!(
            out,
            "***Edits -- {label}*** \n <br/>{}",
            clean_for_markdown(&article.annotated)
        );
        let _ = write!(
            out,
            "<br/>\n***List of Subs -- {label}*** \n <br/>{}",
            substitution_list(&article.substitutions)
        );
    }

    let _ = write!(
        out,
        "<br/> \n***Gold Transcription***\n   <br/>{}<br/><br/>***Errors:***<br/>",
        clean_for_markdown(gold)
    );
    for report in std::iter::once(baseline).chain(methods.iter()) {
        let _ = write!(
            out,
            "***{}***: Homoglyphic: {}  Non-Homoglyphic: {}  Major: {}<br/>\n",
            report.label(),
            report.counts.homoglyph,
            report.counts.nonhomoglyph,
            report.counts.major
        );
    }
    Ok(out)
}

pub fn write_visualization(path: &Path, gold: &str, reports: &[MethodReport]) -> Result<()> {
    let markdown = render_visualization(gold, reports)?;
    write_file(path, &markdown, "visualization")?;
    info!("Wrote visualization to {}", path.display());
    Ok(())
}

/// How often each gold character was transcribed as each OCR character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfusionTable {
    counts: BTreeMap<String, BTreeMap<String, u64>>,
}

impl ConfusionTable {
    /// Builds the table from single-character substitutions; longer records
    /// are left out.
    pub fn from_substitutions(subs: &[Substitution]) -> Self {
        let mut table = Self::default();
        for sub in subs {
            let mut gold = sub.gold.chars();
            let mut ocr = sub.ocr.chars();
            if let (Some(g), None, Some(o), None) = (gold.next(), gold.next(), ocr.next(), ocr.next())
            {
                *table
                    .counts
                    .entry(g.to_string())
                    .or_default()
                    .entry(o.to_string())
                    .or_insert(0) += 1;
            }
        }
        table
    }

    pub fn get(&self, gold: char, ocr: char) -> u64 {
        self.counts
            .get(gold.to_string().as_str())
            .and_then(|row| row.get(ocr.to_string().as_str()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().flat_map(|row| row.values()).sum()
    }

    /// Pairs ordered by descending count.
    pub fn most_common(&self, n: usize) -> Vec<(String, String, u64)> {
        let mut pairs: Vec<(String, String, u64)> = self
            .counts
            .iter()
            .flat_map(|(g, row)| row.iter().map(move |(o, &c)| (g.clone(), o.clone(), c)))
            .collect();
        pairs.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| (&a.0, &a.1).cmp(&(&b.0, &b.1))));
        pairs.truncate(n);
        pairs
    }
}

/// Writes one confusion table per method. The uncorrected baseline goes to
/// `path` itself, every other method to `<stem>_<method>.<ext>`.
pub fn write_confusion_tables(path: &Path, reports: &[MethodReport]) -> Result<()> {
    for report in reports {
        let table = ConfusionTable::from_substitutions(&report.substitutions);
        let out = method_path(path, &report.method);
        let json = serde_json::to_string_pretty(&table)
            .map_err(|e| EvalError::json(format!("writing confusion table {}", out.display()), e))?;
        write_file(&out, &json, "confusion table")?;
        info!(
            "Wrote {} substitutions for {} to {}",
            table.total(),
            report.label(),
            out.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{ErrorClass, ErrorCounts};
    use crate::evaluate::ArticleResult;

    fn report(method: &str, annotated: &str, counts: ErrorCounts) -> MethodReport {
        MethodReport {
            method: method.to_string(),
            counts,
            articles: vec![ArticleResult {
                id: 1,
                ocr: "tbe cat_".to_string(),
                annotated: annotated.to_string(),
                counts,
                substitutions: vec![Substitution::new("h", "b")],
            }],
            ..MethodReport::default()
        }
    }

    #[test]
    fn confusion_table_counts_single_characters() {
        let subs = vec![
            Substitution::new("h", "b"),
            Substitution::new("h", "b"),
            Substitution::new("l", "1"),
            Substitution::new("m", "rn"),
        ];
        let table = ConfusionTable::from_substitutions(&subs);
        assert_eq!(table.get('h', 'b'), 2);
        assert_eq!(table.get('l', '1'), 1);
        assert_eq!(table.get('b', 'h'), 0);
        assert_eq!(table.total(), 3);
        let expected: Vec<(String, String, u64)> = vec![("h".to_string(), "b".to_string(), 2)];
        assert_eq!(table.most_common(1), expected);
    }

    #[test]
    fn visualization_lists_baseline_first() {
        let mut spell_counts = ErrorCounts::single(ErrorClass::Homoglyph);
        spell_counts.record(ErrorClass::Major);
        let reports = vec![
            report("visual", "the cat", spell_counts),
            report("", "t<b>e cat", ErrorCounts::single(ErrorClass::Nonhomoglyph)),
        ];
        let md = render_visualization("the *cat*", &reports).unwrap();

        let baseline = md.find("OCR Transcription -- no corrections").unwrap();
        let visual = md.find("OCR Transcription -- with visual").unwrap();
        assert!(baseline < visual);
        assert!(md.contains("tbe cat\\_"));
        assert!(md.contains("***Gold Transcription***\n   <br/>the cat<br/>"));
        assert!(md.contains("[(\"h\", \"b\")]"));
        assert!(md.contains("***no correction***: Homoglyphic: 0  Non-Homoglyphic: 1  Major: 0"));
        assert!(md.contains("***visual***: Homoglyphic: 1  Non-Homoglyphic: 0  Major: 1"));
    }

    #[test]
    fn visualization_needs_single_article() {
        let mut multi = report("", "x", ErrorCounts::default());
        multi.articles.push(multi.articles[0].clone());
        assert!(render_visualization("x", &[multi]).is_err());
        assert!(render_visualization("x", &[]).is_err());
    }
}
