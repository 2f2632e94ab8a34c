//! Command line arguments for `ocr-eval`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Compare OCR output with gold transcriptions and classify the errors
#[derive(Parser, Debug, Clone)]
#[command(name = "ocr-eval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct OcrEvalArgs {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl OcrEvalArgs {
    /// 0 = quiet, 1 = normal, 2 = verbose, 3+ = debug
    pub fn verbosity(&self) -> u8 {
        if self.quiet { 0 } else { self.verbose + 1 }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Align two plain text files and show the annotated diff
    Align(AlignArgs),

    /// Count errors over a corpus of OCR / gold transcription pairs
    Evaluate(EvaluateArgs),

    /// Write a visually spellchecked variant of an OCR corpus
    Spellcheck(SpellcheckArgs),
}

/// Options shared by commands that classify errors.
#[derive(Args, Debug, Clone, Default)]
pub struct ClassifierArgs {
    /// JSON config file (alignment constants, sensitivity, homoglyph list)
    #[arg(long, env = "OCR_EVAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Homoglyph similarity list (JSON array of {a, b, sim_score})
    #[arg(long)]
    pub homoglyphs: Option<PathBuf>,

    /// Minimum similarity score for a homoglyph pair to count
    #[arg(long)]
    pub sensitivity: Option<f64>,

    /// Record replacements of exactly this many characters as substitutions
    #[arg(long)]
    pub list_error_len: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    /// File with the OCR text
    pub ocr: PathBuf,

    /// File with the gold transcription
    pub gold: PathBuf,

    #[command(flatten)]
    pub classifier: ClassifierArgs,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// OCR corpus JSON ({scan: {article_id: text}})
    #[arg(long)]
    pub ocr: PathBuf,

    /// Gold COCO JSON with an `annotations` list
    #[arg(long)]
    pub gold: PathBuf,

    /// Only evaluate these article ids
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<u64>>,

    /// Spellcheck methods whose `<ocr>_<method>.json` variants to evaluate too
    #[arg(long = "spellcheck")]
    pub spellchecks: Vec<String>,

    /// Write a markdown visualization (needs exactly one id)
    #[arg(long)]
    pub viz_out: Option<PathBuf>,

    /// Write per-method confusion tables of recorded substitutions
    #[arg(long)]
    pub confusion_out: Option<PathBuf>,

    #[command(flatten)]
    pub classifier: ClassifierArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SpellcheckArgs {
    /// OCR corpus JSON to correct
    #[arg(long)]
    pub ocr: PathBuf,

    /// Homoglyph similarity list
    #[arg(long)]
    pub homoglyphs: PathBuf,

    /// Minimum similarity score for a homoglyph pair to be tried
    #[arg(long, default_value_t = 0.35)]
    pub sensitivity: f64,

    /// Directory with Hunspell `.aff`/`.dic` files
    #[arg(long)]
    pub dict_dir: Option<PathBuf>,

    /// Hunspell dictionary names to load from the directory
    #[arg(long = "dict", default_value = "en_US")]
    pub dicts: Vec<String>,

    /// Plain word lists, one word per line
    #[arg(long = "wordlist")]
    pub wordlists: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_evaluate() {
        let args = OcrEvalArgs::parse_from([
            "ocr-eval",
            "-vv",
            "evaluate",
            "--ocr",
            "ocr.json",
            "--gold",
            "gold.json",
            "--ids",
            "3,4",
            "--spellcheck",
            "visual",
            "--list-error-len",
            "1",
        ]);
        assert_eq!(args.verbosity(), 3);
        let Command::Evaluate(eval) = args.command else {
            panic!("expected evaluate");
        };
        assert_eq!(eval.ids, Some(vec![3, 4]));
        assert_eq!(eval.spellchecks, vec!["visual".to_string()]);
        assert_eq!(eval.classifier.list_error_len, Some(1));
        assert!(eval.viz_out.is_none());
    }

    #[test]
    fn quiet_wins() {
        let args = OcrEvalArgs::parse_from(["ocr-eval", "-q", "-v", "align", "a.txt", "b.txt"]);
        assert_eq!(args.verbosity(), 0);
        assert_eq!(args.output_format, OutputFormat::Human);
    }
}
