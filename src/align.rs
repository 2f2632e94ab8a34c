//! Recursive alignment of OCR text against a gold transcription.
//!
//! Generic diffing loses granularity on long inputs. The edit script is
//! therefore cut at every long `equal` run; the remaining short regions are
//! re-aligned on their own, recursively, until no long `equal` run is left.
//! Each surviving step is classified and rendered into an annotated diff.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::AlignConfig;
use crate::homoglyph::{ConfusionOracle, HomoglyphTable};
use crate::opcodes::{EditKind, EditStep, opcodes};

/// Texts shorter than this are never checked for a length mismatch.
pub const MIN_CATASTROPHIC_CHECK_LEN: usize = 10;

/// Insert/delete content with fewer spaces than this gets them drawn as `_`.
const MAX_VISIBLE_SPACES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    None,
    Homoglyph,
    Nonhomoglyph,
    Major,
    Catastrophic,
}

impl ErrorClass {
    pub const ALL: [ErrorClass; 5] = [
        ErrorClass::None,
        ErrorClass::Homoglyph,
        ErrorClass::Nonhomoglyph,
        ErrorClass::Major,
        ErrorClass::Catastrophic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::None => "none",
            ErrorClass::Homoglyph => "homoglyph",
            ErrorClass::Nonhomoglyph => "nonhomoglyph",
            ErrorClass::Major => "major",
            ErrorClass::Catastrophic => "catastrophic",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of steps (or whole text pairs) seen per error class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCounts {
    pub none: u64,
    pub homoglyph: u64,
    pub nonhomoglyph: u64,
    pub major: u64,
    pub catastrophic: u64,
}

impl ErrorCounts {
    pub fn single(class: ErrorClass) -> Self {
        let mut counts = Self::default();
        counts.record(class);
        counts
    }

    pub fn record(&mut self, class: ErrorClass) {
        *self.slot(class) += 1;
    }

    pub fn get(&self, class: ErrorClass) -> u64 {
        match class {
            ErrorClass::None => self.none,
            ErrorClass::Homoglyph => self.homoglyph,
            ErrorClass::Nonhomoglyph => self.nonhomoglyph,
            ErrorClass::Major => self.major,
            ErrorClass::Catastrophic => self.catastrophic,
        }
    }

    pub fn merge(&mut self, other: &ErrorCounts) {
        for class in ErrorClass::ALL {
            *self.slot(class) += other.get(class);
        }
    }

    pub fn total(&self) -> u64 {
        ErrorClass::ALL.iter().map(|&c| self.get(c)).sum()
    }

    /// Everything except `none`.
    pub fn errors(&self) -> u64 {
        self.total() - self.none
    }

    fn slot(&mut self, class: ErrorClass) -> &mut u64 {
        match class {
            ErrorClass::None => &mut self.none,
            ErrorClass::Homoglyph => &mut self.homoglyph,
            ErrorClass::Nonhomoglyph => &mut self.nonhomoglyph,
            ErrorClass::Major => &mut self.major,
            ErrorClass::Catastrophic => &mut self.catastrophic,
        }
    }
}

/// A gold fragment that the OCR transcribed as something else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Substitution {
    pub gold: String,
    pub ocr: String,
}

impl Substitution {
    pub fn new(gold: impl Into<String>, ocr: impl Into<String>) -> Self {
        Self {
            gold: gold.into(),
            ocr: ocr.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedStep {
    pub step: EditStep,
    pub class: ErrorClass,
}

/// Result of aligning one text pair. `steps` holds the final, refined edit
/// script in absolute character positions of the inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    pub annotated: String,
    pub counts: ErrorCounts,
    pub substitutions: Vec<Substitution>,
    pub steps: Vec<ClassifiedStep>,
}

impl Alignment {
    /// The score for a pair too mismatched to align.
    pub fn catastrophic() -> Self {
        Self {
            counts: ErrorCounts::single(ErrorClass::Catastrophic),
            ..Self::default()
        }
    }

    /// Appends `other` after everything already in `self`.
    pub fn merge(&mut self, other: Alignment) {
        self.annotated.push_str(&other.annotated);
        self.counts.merge(&other.counts);
        self.substitutions.extend(other.substitutions);
        self.steps.extend(other.steps);
    }

    fn shift(&mut self, ocr_offset: usize, gold_offset: usize) {
        for classified in &mut self.steps {
            classified.step = classified.step.shifted(ocr_offset, gold_offset);
        }
    }
}

/// Open/close markers wrapped around removed and added text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    pub delete_open: String,
    pub delete_close: String,
    pub insert_open: String,
    pub insert_close: String,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            delete_open: r#"<span style="color:red">"#.to_string(),
            delete_close: "</span>".to_string(),
            insert_open: r#"<span style="color:green">"#.to_string(),
            insert_close: "</span>".to_string(),
        }
    }
}

/// Flags text pairs whose lengths are too far apart for alignment to mean
/// anything. Two empty texts are not catastrophic.
pub fn is_catastrophic(ocr: &str, gold: &str) -> bool {
    let ocr_len = ocr.chars().count();
    let gold_len = gold.chars().count();

    match (ocr_len, gold_len) {
        (0, 0) => false,
        (0, _) | (_, 0) => true,
        _ if ocr_len > MIN_CATASTROPHIC_CHECK_LEN && gold_len > MIN_CATASTROPHIC_CHECK_LEN => {
            ocr_len > 2 * gold_len || gold_len > 2 * ocr_len
        }
        _ => false,
    }
}

/// Splits an edit script around `equal` steps longer than `long_equal_run`.
/// Each such step becomes a group of its own; empty groups are dropped.
/// The flag reports whether any split happened.
pub fn group_steps(steps: &[EditStep], long_equal_run: usize) -> (Vec<Vec<EditStep>>, bool) {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut split = false;

    for step in steps {
        match step.kind {
            EditKind::Equal if step.ocr_len() > long_equal_run => {
                if !current.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
                groups.push(vec![step.clone()]);
                split = true;
            }
            EditKind::Equal | EditKind::Insert | EditKind::Delete | EditKind::Replace => {
                current.push(step.clone());
            }
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    (groups, split)
}

/// The alignment engine. Holds the confusability oracle, the tunable
/// constants and the markers used for rendering.
#[derive(Debug, Clone)]
pub struct Aligner<O = HomoglyphTable> {
    oracle: O,
    config: AlignConfig,
    markup: Markup,
}

impl<O: ConfusionOracle> Aligner<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            config: AlignConfig::default(),
            markup: Markup::default(),
        }
    }

    pub fn with_config(mut self, config: AlignConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Aligns `ocr` against `gold`. Replace steps that are exactly
    /// `replace_span_len` characters long on both sides are reported as
    /// substitutions; zero reports none.
    pub fn align(&self, ocr: &str, gold: &str, replace_span_len: usize) -> Alignment {
        let ocr: Vec<char> = ocr.chars().collect();
        let gold: Vec<char> = gold.chars().collect();
        self.align_slice(&ocr, &gold, replace_span_len, 0)
    }

    fn align_slice(
        &self,
        ocr: &[char],
        gold: &[char],
        replace_span_len: usize,
        depth: usize,
    ) -> Alignment {
        let steps = opcodes(ocr, gold);
        let (groups, refine) = group_steps(&steps, self.config.long_equal_run);
        let mut result = Alignment::default();

        if !refine || depth >= self.config.max_depth {
            if refine {
                debug!(
                    "alignment: depth limit {} reached on {} OCR chars, classifying as-is",
                    self.config.max_depth,
                    ocr.len()
                );
            }
            for step in &steps {
                result.merge(self.process_step(step, ocr, gold, replace_span_len));
            }
            return result;
        }

        for group in &groups {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            if group.len() == 1 && first.kind != EditKind::Replace {
                result.merge(self.process_step(first, ocr, gold, replace_span_len));
                continue;
            }
            let ocr_range = first.ocr.start..last.ocr.end;
            let gold_range = first.gold.start..last.gold.end;
            debug!(
                "alignment: re-aligning {} steps (ocr {:?}, gold {:?}) at depth {}",
                group.len(),
                ocr_range,
                gold_range,
                depth + 1
            );
            let mut sub = self.align_slice(
                &ocr[ocr_range.clone()],
                &gold[gold_range.clone()],
                replace_span_len,
                depth + 1,
            );
            sub.shift(ocr_range.start, gold_range.start);
            result.merge(sub);
        }
        result
    }

    fn process_step(
        &self,
        step: &EditStep,
        ocr: &[char],
        gold: &[char],
        replace_span_len: usize,
    ) -> Alignment {
        let ocr_text: String = ocr[step.ocr.clone()].iter().collect();
        let gold_text: String = gold[step.gold.clone()].iter().collect();
        let class = self.classify(step, &ocr_text, &gold_text);

        let substitutions = match step.kind {
            EditKind::Replace
                if step.ocr_len() == replace_span_len && step.gold_len() == replace_span_len =>
            {
                vec![Substitution::new(gold_text.as_str(), ocr_text.as_str())]
            }
            EditKind::Equal | EditKind::Insert | EditKind::Delete | EditKind::Replace => Vec::new(),
        };

        Alignment {
            annotated: self.render(step.kind, &ocr_text, &gold_text),
            counts: ErrorCounts::single(class),
            substitutions,
            steps: vec![ClassifiedStep {
                step: step.clone(),
                class,
            }],
        }
    }

    fn classify(&self, step: &EditStep, ocr_text: &str, gold_text: &str) -> ErrorClass {
        match step.kind {
            EditKind::Equal => ErrorClass::None,
            _ if step.span() > self.config.major_error_span => ErrorClass::Major,
            EditKind::Insert | EditKind::Delete => ErrorClass::Nonhomoglyph,
            EditKind::Replace => self.oracle.classify(ocr_text, gold_text),
        }
    }

    fn render(&self, kind: EditKind, ocr_text: &str, gold_text: &str) -> String {
        let m = &self.markup;
        match kind {
            EditKind::Equal => gold_text.to_string(),
            EditKind::Insert => {
                format!("{}{}{}", m.insert_open, visible_spaces(gold_text), m.insert_close)
            }
            EditKind::Delete => {
                format!("{}{}{}", m.delete_open, visible_spaces(ocr_text), m.delete_close)
            }
            EditKind::Replace => format!(
                "{}{}{}{}{}{}",
                m.delete_open, ocr_text, m.delete_close, m.insert_open, gold_text, m.insert_close
            ),
        }
    }
}

fn visible_spaces(text: &str) -> String {
    if text.matches(' ').count() < MAX_VISIBLE_SPACES {
        text.replace(' ', "_")
    } else {
        text.to_string()
    }
}
