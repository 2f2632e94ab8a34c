//! Text cleanup applied before OCR and gold transcriptions are compared.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Anything outside letters, digits, whitespace and common punctuation.
    // Em dash and curly quotes survive here and are normalized later.
    static ref DISALLOWED_CHARS: Regex =
        Regex::new(r#"[^A-Za-z0-9\s!#$%&*()_?/+\-=\[\]:;'",.\u{2014}\u{2018}\u{2019}\u{201C}\u{201D}]+"#)
            .unwrap();

    // Normalization rules applied in order before aligning.
    static ref ALIGN_RULES: Vec<(Regex, &'static str)> = vec![
        // any whitespace run becomes one space
        (Regex::new(r"\s+").unwrap(), " "),
        // em dash is usually transcribed as a double hyphen
        (Regex::new(r"\u{2014}").unwrap(), "--"),
        (Regex::new(r"[\u{201C}\u{201D}\u{2018}]").unwrap(), "\""),
        (Regex::new(r"\u{2019}").unwrap(), "'"),
        // stray spaces around punctuation
        (Regex::new(r" \. ").unwrap(), " ."),
        (Regex::new(r" , ").unwrap(), ", "),
        (Regex::new(r" ' ").unwrap(), "'"),
    ];
}

// Latin typographic ligatures (ﬀ ﬁ ﬂ ﬃ ﬄ ﬅ ﬆ)
fn is_ligature(c: char) -> bool {
    ('\u{FB00}'..='\u{FB06}').contains(&c)
}

/// Expands ligatures and strips characters OCR engines emit as noise.
pub fn clean_ocr_text(text: &str) -> String {
    let expanded: String = if text.chars().any(is_ligature) {
        text.chars()
            .flat_map(|c| {
                if is_ligature(c) {
                    c.to_string().nfkc().collect::<Vec<_>>()
                } else {
                    vec![c]
                }
            })
            .collect()
    } else {
        text.to_string()
    };
    DISALLOWED_CHARS.replace_all(&expanded, "").into_owned()
}

/// Normalizes whitespace, dashes, quotes and spacing around punctuation so
/// that transcription conventions do not show up as errors.
pub fn sanitize_before_aligning(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in ALIGN_RULES.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    result
}

/// Keeps markdown viewers from reading transcription text as formatting.
pub fn clean_for_markdown(text: &str) -> String {
    text.replace(['*', '\\'], "").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sanitize_before_aligning("a \t b\n\nc"), "a b c");
    }

    #[test]
    fn normalizes_dashes_and_quotes() {
        assert_eq!(
            sanitize_before_aligning("\u{201C}Yes\u{201D}\u{2014}it\u{2019}s so"),
            "\"Yes\"--it's so"
        );
        assert_eq!(sanitize_before_aligning("\u{2018}quoted"), "\"quoted");
    }

    #[test]
    fn tightens_punctuation_spacing() {
        assert_eq!(sanitize_before_aligning("end . Next"), "end .Next");
        assert_eq!(sanitize_before_aligning("one , two"), "one, two");
        assert_eq!(sanitize_before_aligning("don ' t"), "don't");
    }

    #[test]
    fn cleaning_drops_noise_characters() {
        assert_eq!(clean_ocr_text("The caf\u{e9} \u{25a0}sold"), "The caf sold");
        assert_eq!(clean_ocr_text("a \u{2014} b"), "a \u{2014} b");
        assert_eq!(clean_ocr_text("price: $5.00 (net)"), "price: $5.00 (net)");
    }

    #[test]
    fn cleaning_expands_ligatures() {
        assert_eq!(clean_ocr_text("\u{FB01}ne o\u{FB03}ce"), "fine office");
    }

    #[test]
    fn markdown_escaping() {
        assert_eq!(clean_for_markdown("*bold* a_b c\\d"), "bold a\\_b cd");
    }
}
