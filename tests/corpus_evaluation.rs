use std::fs;
use std::path::Path;

use rust_ocr_eval::align::{Aligner, ErrorClass, is_catastrophic};
use rust_ocr_eval::config::EvalConfig;
use rust_ocr_eval::corpus::load_gold_corpus;
use rust_ocr_eval::dictionary::WordSource;
use rust_ocr_eval::evaluate::{build_aligner, evaluate_methods};
use rust_ocr_eval::homoglyph::HomoglyphTable;
use rust_ocr_eval::opcodes::EditKind;
use rust_ocr_eval::report::{ConfusionTable, write_confusion_tables, write_visualization};
use rust_ocr_eval::spellcheck::{VISUAL_METHOD, VisualSpellChecker};

const HOMOGLYPHS: &str = r#"[
    {"a": "h", "b": "b", "sim_score": 0.6},
    {"a": "l", "b": "1", "sim_score": 0.9},
    {"a": "e", "b": "c", "sim_score": 0.4},
    {"a": "u", "b": "n", "sim_score": 0.1}
]"#;

const OCR: &str = r#"{
    "scan_1": {
        "1": "Tbe qnick brown fox jumps ovcr the lazy dog.",
        "2": "",
        "3": "A   1ong day at tbe office"
    }
}"#;

const GOLD: &str = r#"{
    "images": [{"id": 1, "file_name": "scan_1.jpg"}],
    "annotations": [
        {"id": 1, "image_id": 1, "text": "The quick brown fox jumps over the lazy dog."},
        {"id": 2, "image_id": 1, "text": "A headline that the OCR missed"},
        {"id": 3, "image_id": 1, "text": "A long day at the office"}
    ]
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn config(dir: &Path) -> EvalConfig {
    EvalConfig {
        homoglyph_path: Some(write(dir, "homoglyphs.json", HOMOGLYPHS)),
        list_error_len: 1,
        ..EvalConfig::default()
    }
}

#[test]
fn evaluates_raw_and_spellchecked_corpora() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let ocr_path = write(dir.path(), "ocr.json", OCR);
    let gold_path = write(dir.path(), "gold.json", GOLD);

    let mut words = WordSource::new();
    words.add_words(["the", "quick", "over", "long", "day", "office", "brown", "lazy"]);
    let table = HomoglyphTable::from_json_file(config.homoglyph_path.as_ref().unwrap(), 0.35)
        .unwrap();
    VisualSpellChecker::new(words, table)
        .correct_corpus_file(&ocr_path)
        .unwrap();
    assert!(dir.path().join("ocr_visual.json").exists());

    let aligner = build_aligner(&config).unwrap();
    let gold = load_gold_corpus(&gold_path).unwrap();
    let methods = vec![VISUAL_METHOD.to_string()];
    let reports =
        evaluate_methods(&aligner, &ocr_path, &gold, None, &methods, 1, false).unwrap();

    assert_eq!(reports.len(), 2);
    let (visual, raw) = (&reports[0], &reports[1]);
    assert_eq!(visual.method, "visual");
    assert_eq!(raw.method, "");

    // The empty OCR article is catastrophic for both.
    assert_eq!(raw.counts.catastrophic, 1);
    assert_eq!(visual.counts.catastrophic, 1);
    // Spellchecking removes the homoglyph errors it knows how to fix.
    assert!(raw.counts.homoglyph > visual.counts.homoglyph);
    assert!(raw.substitutions.len() > visual.substitutions.len());

    let table = ConfusionTable::from_substitutions(&raw.substitutions);
    assert_eq!(table.get('h', 'b'), 2);
    assert_eq!(table.get('l', '1'), 1);
    assert_eq!(table.total(), raw.substitutions.len() as u64);

    let confusion = dir.path().join("confusion.json");
    write_confusion_tables(&confusion, &reports).unwrap();
    let baseline: ConfusionTable =
        serde_json::from_str(&fs::read_to_string(&confusion).unwrap()).unwrap();
    assert_eq!(baseline, table);
    assert!(dir.path().join("confusion_visual.json").exists());
}

#[test]
fn visualizes_a_single_article() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let ocr_path = write(dir.path(), "ocr.json", OCR);
    let gold = load_gold_corpus(&write(dir.path(), "gold.json", GOLD)).unwrap();
    let aligner = build_aligner(&config).unwrap();

    let reports = evaluate_methods(&aligner, &ocr_path, &gold, Some(&[1][..]), &[], 1, true).unwrap();
    assert_eq!(reports.len(), 1);

    let viz = dir.path().join("viz").join("article_1.md");
    write_visualization(&viz, &gold[&1], &reports).unwrap();
    let md = fs::read_to_string(&viz).unwrap();
    assert!(md.contains("***Edits -- no corrections***"));
    assert!(md.contains(r#"<span style="color:red">b</span><span style="color:green">h</span>"#));
    assert!(md.contains("Homoglyphic: 2  Non-Homoglyphic: 1  Major: 0"));
}

#[test]
fn alignment_properties_hold_on_varied_pairs() {
    let aligner = Aligner::new(HomoglyphTable::from_json_str(HOMOGLYPHS, 0.2).unwrap());
    let pairs = [
        ("", ""),
        ("abc", ""),
        ("", "abc"),
        ("helloworld", "hello world"),
        ("rnodern", "modern"),
        (
            "Tbe qnick brown fox jumps ovcr the lazy dog. It was a 1ong day.",
            "The quick brown fox jumps over the lazy dog. It was a long day!",
        ),
        (
            "Thc Evening Star, Wash1ngton, D. C., MONDAY, JUNE 4, 1917.",
            "The Evening Star, Washington, D.C., MONDAY, JUNE 4, 1917",
        ),
        ("completely different", "nothing alike here at all"),
    ];

    for (ocr, gold) in pairs {
        let result = aligner.align(ocr, gold, 1);

        let ocr_chars: Vec<char> = ocr.chars().collect();
        let gold_chars: Vec<char> = gold.chars().collect();
        let mut rebuilt_ocr = String::new();
        let mut rebuilt_gold = String::new();
        for c in &result.steps {
            rebuilt_ocr.extend(&ocr_chars[c.step.ocr.clone()]);
            rebuilt_gold.extend(&gold_chars[c.step.gold.clone()]);

            if c.step.kind == EditKind::Equal {
                assert_eq!(c.class, ErrorClass::None);
            } else if c.step.span() > 5 {
                assert_eq!(c.class, ErrorClass::Major);
            } else {
                assert_ne!(c.class, ErrorClass::None);
            }
        }
        assert_eq!(rebuilt_ocr, ocr, "OCR coverage for {ocr:?}");
        assert_eq!(rebuilt_gold, gold, "gold coverage for {gold:?}");
        assert_eq!(result.counts.total(), result.steps.len() as u64);
        assert_eq!(result.counts.catastrophic, 0);

        for sub in &result.substitutions {
            assert_eq!(sub.gold.chars().count(), 1);
            assert_eq!(sub.ocr.chars().count(), 1);
        }
    }

    assert!(!is_catastrophic("", ""));
}
