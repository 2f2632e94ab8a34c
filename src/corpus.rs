//! Loading OCR and gold transcriptions from their on-disk JSON layouts.
//!
//! OCR output is grouped by scan: `{scan_id: {article_id: text}}`. Gold
//! transcriptions come as a COCO-style file whose `annotations` entries carry
//! an `id` and a `text`. Both are flattened to `article id -> text`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error::{EvalError, Result};
use crate::sanitize::clean_ocr_text;

pub type Texts = BTreeMap<u64, String>;

#[derive(Debug, Deserialize)]
struct GoldFile {
    annotations: Vec<GoldAnnotation>,
}

#[derive(Debug, Deserialize)]
struct GoldAnnotation {
    id: u64,
    text: String,
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| EvalError::io(format!("reading {} {}", what, path.display()), e))
}

/// Flattens an OCR corpus and runs [`clean_ocr_text`] on every article.
pub fn parse_ocr_corpus(json: &str) -> Result<Texts> {
    let scans: BTreeMap<String, BTreeMap<String, String>> =
        serde_json::from_str(json).map_err(|e| EvalError::json("parsing OCR corpus", e))?;

    let mut texts = Texts::new();
    for (scan, articles) in scans {
        for (article, text) in articles {
            let id: u64 = article.parse().map_err(|_| {
                EvalError::corpus(format!("article id {article:?} in scan {scan:?} is not numeric"))
            })?;
            if texts.insert(id, clean_ocr_text(&text)).is_some() {
                return Err(EvalError::corpus(format!(
                    "article id {id} appears in more than one scan"
                )));
            }
        }
    }
    Ok(texts)
}

pub fn load_ocr_corpus(path: &Path) -> Result<Texts> {
    let texts = parse_ocr_corpus(&read(path, "OCR corpus")?)?;
    info!("Loaded {} OCR articles from {}", texts.len(), path.display());
    Ok(texts)
}

pub fn parse_gold_corpus(json: &str) -> Result<Texts> {
    let gold: GoldFile =
        serde_json::from_str(json).map_err(|e| EvalError::json("parsing gold corpus", e))?;
    Ok(gold
        .annotations
        .into_iter()
        .map(|anno| (anno.id, anno.text))
        .collect())
}

pub fn load_gold_corpus(path: &Path) -> Result<Texts> {
    let texts = parse_gold_corpus(&read(path, "gold corpus")?)?;
    info!("Loaded {} gold transcriptions from {}", texts.len(), path.display());
    Ok(texts)
}

/// Writes an OCR corpus back in its scan-grouped layout. Every article ends
/// up under `scan`.
pub fn write_ocr_corpus(path: &Path, scan: &str, texts: &Texts) -> Result<()> {
    let articles: BTreeMap<String, &String> =
        texts.iter().map(|(id, text)| (id.to_string(), text)).collect();
    let mut scans = BTreeMap::new();
    scans.insert(scan, articles);

    let context = format!("writing OCR corpus {}", path.display());
    let json = serde_json::to_string(&scans).map_err(|e| EvalError::json(context.clone(), e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EvalError::io(context.clone(), e))?;
    }
    fs::write(path, json).map_err(|e| EvalError::io(context, e))
}

/// Where the spellchecked variant of an OCR corpus lives: `<stem>_<method>.json`
/// next to the original. The empty method is the original file.
pub fn method_path(ocr_path: &Path, method: &str) -> PathBuf {
    if method.is_empty() {
        return ocr_path.to_path_buf();
    }
    let stem = ocr_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match ocr_path.extension() {
        Some(ext) => format!("{stem}_{method}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{method}"),
    };
    ocr_path.with_file_name(name)
}
