//! Edit scripts between two character sequences.
//!
//! Matching blocks are found by repeatedly taking the longest common run
//! inside the still-unmatched regions (no junk elements, no popularity
//! pruning), then the gaps between blocks become insert, delete or replace
//! steps. Ties go to the earliest run in the OCR sequence, then the earliest
//! in the gold sequence.

use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl EditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EditKind::Equal => "equal",
            EditKind::Insert => "insert",
            EditKind::Delete => "delete",
            EditKind::Replace => "replace",
        }
    }
}

/// One step of the script turning the OCR sequence into the gold sequence.
/// Ranges are half-open character indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditStep {
    pub kind: EditKind,
    pub ocr: Range<usize>,
    pub gold: Range<usize>,
}

impl EditStep {
    pub fn new(kind: EditKind, ocr: Range<usize>, gold: Range<usize>) -> Self {
        Self { kind, ocr, gold }
    }

    pub fn ocr_len(&self) -> usize {
        self.ocr.len()
    }

    pub fn gold_len(&self) -> usize {
        self.gold.len()
    }

    /// Longest side of the step.
    pub fn span(&self) -> usize {
        self.ocr_len().max(self.gold_len())
    }

    pub(crate) fn shifted(&self, ocr_offset: usize, gold_offset: usize) -> Self {
        Self {
            kind: self.kind,
            ocr: self.ocr.start + ocr_offset..self.ocr.end + ocr_offset,
            gold: self.gold.start + gold_offset..self.gold.end + gold_offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Block {
    ocr: usize,
    gold: usize,
    len: usize,
}

struct Matcher<'a> {
    ocr: &'a [char],
    gold: &'a [char],
    gold_index: HashMap<char, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(ocr: &'a [char], gold: &'a [char]) -> Self {
        let mut gold_index: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in gold.iter().enumerate() {
            gold_index.entry(c).or_default().push(j);
        }
        Self {
            ocr,
            gold,
            gold_index,
        }
    }

    fn longest_match(&self, ocr: Range<usize>, gold: Range<usize>) -> Block {
        let mut best = Block {
            ocr: ocr.start,
            gold: gold.start,
            len: 0,
        };
        // run length of the match ending at gold index j, for the previous OCR index
        let mut run_ending: HashMap<usize, usize> = HashMap::new();

        for i in ocr.clone() {
            let mut next_run_ending = HashMap::new();
            if let Some(positions) = self.gold_index.get(&self.ocr[i]) {
                for &j in positions {
                    if j < gold.start {
                        continue;
                    }
                    if j >= gold.end {
                        break;
                    }
                    let prev = if j > 0 {
                        run_ending.get(&(j - 1)).copied().unwrap_or(0)
                    } else {
                        0
                    };
                    let len = prev + 1;
                    next_run_ending.insert(j, len);
                    if len > best.len {
                        best = Block {
                            ocr: i + 1 - len,
                            gold: j + 1 - len,
                            len,
                        };
                    }
                }
            }
            run_ending = next_run_ending;
        }
        best
    }

    fn matching_blocks(&self) -> Vec<Block> {
        let mut pending = vec![(0..self.ocr.len(), 0..self.gold.len())];
        let mut blocks = Vec::new();

        while let Some((ocr, gold)) = pending.pop() {
            let block = self.longest_match(ocr.clone(), gold.clone());
            if block.len == 0 {
                continue;
            }
            blocks.push(block);
            if ocr.start < block.ocr && gold.start < block.gold {
                pending.push((ocr.start..block.ocr, gold.start..block.gold));
            }
            let ocr_after = block.ocr + block.len;
            let gold_after = block.gold + block.len;
            if ocr_after < ocr.end && gold_after < gold.end {
                pending.push((ocr_after..ocr.end, gold_after..gold.end));
            }
        }
        blocks.sort_unstable();

        // Merge blocks that touch on both sides into one.
        let mut merged: Vec<Block> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last)
                    if last.ocr + last.len == block.ocr && last.gold + last.len == block.gold =>
                {
                    last.len += block.len;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Block {
            ocr: self.ocr.len(),
            gold: self.gold.len(),
            len: 0,
        });
        merged
    }
}

/// Computes the edit script turning `ocr` into `gold`.
///
/// The returned steps cover both sequences completely and in order.
pub fn opcodes(ocr: &[char], gold: &[char]) -> Vec<EditStep> {
    let matcher = Matcher::new(ocr, gold);
    let mut steps = Vec::new();
    let (mut i, mut j) = (0, 0);

    for block in matcher.matching_blocks() {
        let kind = match (i < block.ocr, j < block.gold) {
            (true, true) => Some(EditKind::Replace),
            (true, false) => Some(EditKind::Delete),
            (false, true) => Some(EditKind::Insert),
            (false, false) => None,
        };
        if let Some(kind) = kind {
            steps.push(EditStep::new(kind, i..block.ocr, j..block.gold));
        }
        i = block.ocr + block.len;
        j = block.gold + block.len;
        if block.len > 0 {
            steps.push(EditStep::new(EditKind::Equal, block.ocr..i, block.gold..j));
        }
    }
    steps
}
