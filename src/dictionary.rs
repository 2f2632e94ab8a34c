//! Word validation for the visual spellchecker.
//!
//! Hunspell dictionaries are loaded through zspell; plain word lists (one
//! word per line, `#` comments) cover vocabularies whose affix files zspell
//! cannot read. A word is known if ANY loaded source accepts it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{info, warn};
use zspell::Dictionary;

use crate::error::{EvalError, Result};

/// Dictionary set consulted by the spellchecker
#[derive(Default)]
pub struct WordSource {
    hunspell: Vec<(String, Dictionary)>,
    words: HashSet<String>,
}

impl WordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `<name>.aff` + `<name>.dic` from `dict_dir` for every name.
    /// Missing or unreadable dictionaries are skipped with a warning.
    pub fn load(dict_dir: &Path, names: &[String]) -> Result<Self> {
        if !dict_dir.is_dir() {
            return Err(EvalError::Dictionary(format!(
                "dictionary directory not found: {}",
                dict_dir.display()
            )));
        }
        let mut source = Self::new();
        for name in names {
            if let Some(dict) = load_dict(dict_dir, name) {
                source.hunspell.push((name.clone(), dict));
            }
        }
        info!("{}", source.stats());
        Ok(source)
    }

    pub fn add_word_list(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| EvalError::io(format!("reading word list {}", path.display()), e))?;
        self.add_words(content.lines());
        info!("Loaded word list {}: {} words total", path.display(), self.words.len());
        Ok(())
    }

    pub fn add_words<'a, I>(&mut self, words: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    /// Check if a word exists in any loaded source, as written or lowercased
    pub fn check(&self, word: &str) -> bool {
        if self.check_exact(word) {
            return true;
        }
        let lower = word.to_lowercase();
        lower != word && self.check_exact(&lower)
    }

    fn check_exact(&self, word: &str) -> bool {
        self.words.contains(word) || self.hunspell.iter().any(|(_, d)| d.check_word(word))
    }

    pub fn is_empty(&self) -> bool {
        self.hunspell.is_empty() && self.words.is_empty()
    }

    pub fn stats(&self) -> String {
        let names: Vec<&str> = self.hunspell.iter().map(|(n, _)| n.as_str()).collect();
        format!(
            "Dictionaries loaded: hunspell=[{}], word list entries={}",
            names.join(", "),
            self.words.len()
        )
    }
}

/// Load a single Hunspell dictionary using zspell builder pattern
fn load_dict(dict_dir: &Path, name: &str) -> Option<Dictionary> {
    let aff_path = dict_dir.join(format!("{}.aff", name));
    let dic_path = dict_dir.join(format!("{}.dic", name));

    if !aff_path.exists() || !dic_path.exists() {
        warn!("Dictionary not found: {}", name);
        return None;
    }

    let aff_content = match fs::read_to_string(&aff_path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}.aff: {}", name, e);
            return None;
        }
    };
    let dic_content = match fs::read_to_string(&dic_path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}.dic: {}", name, e);
            return None;
        }
    };

    match zspell::builder()
        .config_str(&aff_content)
        .dict_str(&dic_content)
        .build()
    {
        Ok(dict) => {
            info!("Loaded dictionary: {}", name);
            Some(dict)
        }
        Err(e) => {
            warn!("Failed to build dictionary {}: {}", name, e);
            None
        }
    }
}
