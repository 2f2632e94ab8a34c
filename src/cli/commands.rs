//! Command implementations for the `ocr-eval` binary.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::align::{ErrorCounts, Substitution, is_catastrophic};
use crate::cli::args::{
    AlignArgs, ClassifierArgs, Command, EvaluateArgs, OcrEvalArgs, OutputFormat, SpellcheckArgs,
};
use crate::config::EvalConfig;
use crate::corpus::{load_gold_corpus, method_path};
use crate::dictionary::WordSource;
use crate::error::{EvalError, Result};
use crate::evaluate::{build_aligner, evaluate_methods, evaluate_pair};
use crate::homoglyph::HomoglyphTable;
use crate::report::{write_confusion_tables, write_visualization};
use crate::sanitize::sanitize_before_aligning;
use crate::spellcheck::{VISUAL_METHOD, VisualSpellChecker};

pub fn execute_command(args: OcrEvalArgs) -> Result<()> {
    let format = args.output_format;
    match args.command {
        Command::Align(args) => align_files(args, format),
        Command::Evaluate(args) => evaluate(args, format),
        Command::Spellcheck(args) => spellcheck(args),
    }
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &ClassifierArgs) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::from_file(path)?,
        None => EvalConfig::default(),
    };
    if let Some(path) = &args.homoglyphs {
        config.homoglyph_path = Some(path.clone());
    }
    if let Some(sensitivity) = args.sensitivity {
        config.sensitivity = sensitivity;
    }
    if let Some(len) = args.list_error_len {
        config.list_error_len = len;
    }
    Ok(config)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| EvalError::io(format!("reading {}", path.display()), e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| EvalError::json("formatting output", e))
}

fn format_counts(counts: &ErrorCounts) -> String {
    format!(
        "homoglyph={} nonhomoglyph={} major={} catastrophic={} none={}",
        counts.homoglyph, counts.nonhomoglyph, counts.major, counts.catastrophic, counts.none
    )
}

#[derive(Serialize)]
struct AlignOutput {
    catastrophic: bool,
    annotated: String,
    counts: ErrorCounts,
    substitutions: Vec<Substitution>,
}

fn align_files(args: AlignArgs, format: OutputFormat) -> Result<()> {
    let config = resolve_config(&args.classifier)?;
    let aligner = build_aligner(&config)?;

    let ocr = sanitize_before_aligning(&read_text(&args.ocr)?);
    let gold = sanitize_before_aligning(&read_text(&args.gold)?);
    let alignment = evaluate_pair(&aligner, &ocr, &gold, config.list_error_len);

    let output = AlignOutput {
        catastrophic: is_catastrophic(&ocr, &gold),
        annotated: alignment.annotated,
        counts: alignment.counts,
        substitutions: alignment.substitutions,
    };
    match format {
        OutputFormat::Json => println!("{}", to_json(&output)?),
        OutputFormat::Human => {
            if output.catastrophic {
                println!("Texts are too mismatched to align (catastrophic)");
            } else {
                println!("{}", output.annotated);
            }
            println!("{}", format_counts(&output.counts));
            if !output.substitutions.is_empty() {
                let subs: Vec<String> = output
                    .substitutions
                    .iter()
                    .map(|s| format!("{:?}->{:?}", s.gold, s.ocr))
                    .collect();
                println!("substitutions: {}", subs.join(" "));
            }
        }
    }
    Ok(())
}

fn evaluate(args: EvaluateArgs, format: OutputFormat) -> Result<()> {
    let config = resolve_config(&args.classifier)?;
    let aligner = build_aligner(&config)?;
    let gold = load_gold_corpus(&args.gold)?;

    let reports = evaluate_methods(
        &aligner,
        &args.ocr,
        &gold,
        args.ids.as_deref(),
        &args.spellchecks,
        config.list_error_len,
        args.viz_out.is_some(),
    )?;

    if let Some(viz_out) = &args.viz_out {
        // evaluate_methods already checked there is exactly one id
        let id = args.ids.as_deref().and_then(|ids| ids.first()).copied();
        let gold_text = id
            .and_then(|id| gold.get(&id))
            .ok_or_else(|| EvalError::corpus(format!("no gold transcription for id {id:?}")))?;
        write_visualization(viz_out, &sanitize_before_aligning(gold_text), &reports)?;
    }
    if let Some(confusion_out) = &args.confusion_out {
        write_confusion_tables(confusion_out, &reports)?;
    }

    match format {
        OutputFormat::Json => println!("{}", to_json(&reports)?),
        OutputFormat::Human => {
            for report in &reports {
                println!(
                    "{} ({}): {} | substitutions={} chars={} skipped={}",
                    report.label(),
                    method_path(&args.ocr, &report.method).display(),
                    format_counts(&report.counts),
                    report.substitutions.len(),
                    report.total_chars,
                    report.skipped.len()
                );
            }
        }
    }
    Ok(())
}

fn spellcheck(args: SpellcheckArgs) -> Result<()> {
    let table = HomoglyphTable::from_json_file(&args.homoglyphs, args.sensitivity)?;
    let mut words = match &args.dict_dir {
        Some(dir) => WordSource::load(dir, &args.dicts)?,
        None => WordSource::new(),
    };
    for path in &args.wordlists {
        words.add_word_list(path)?;
    }
    if words.is_empty() {
        return Err(EvalError::Dictionary(
            "no dictionary or word list could be loaded".to_string(),
        ));
    }

    let checker = VisualSpellChecker::new(words, table);
    let n = checker.correct_corpus_file(&args.ocr)?;
    println!(
        "Corrected {} articles into {}",
        n,
        method_path(&args.ocr, VISUAL_METHOD).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.json");
        fs::write(
            &path,
            r#"{"sensitivity": 0.5, "list_error_len": 2, "homoglyph_path": "a.json"}"#,
        )
        .unwrap();

        let args = ClassifierArgs {
            config: Some(path),
            homoglyphs: Some(PathBuf::from("b.json")),
            sensitivity: None,
            list_error_len: Some(1),
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.sensitivity, 0.5);
        assert_eq!(config.list_error_len, 1);
        assert_eq!(config.homoglyph_path, Some(PathBuf::from("b.json")));
    }
}
