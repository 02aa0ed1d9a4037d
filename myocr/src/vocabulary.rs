use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use tracing::debug;

/// Placeholder vocabulary used when no wordlist is supplied or it cannot be read.
pub const DEFAULT_WORD: &str = "correct";

const GLOSS_DELIMITER: &str = " - ";

/// Custom words handed to the OCR engine as recognition hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: BTreeSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            words: BTreeSet::from([DEFAULT_WORD.to_string()]),
        }
    }
}

impl Vocabulary {
    /// Reads a wordlist file, falling back to the default vocabulary when it
    /// cannot be read.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_wordlist(&contents),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Wordlist unreadable, using default vocabulary");
                Self::default()
            }
        }
    }

    /// Builds a vocabulary from dictionary-style text.
    ///
    /// Anything after `" - "` on a line is a gloss and is dropped; the
    /// remaining text is split on whitespace into unique words.
    pub fn from_wordlist(contents: &str) -> Self {
        let words = contents
            .lines()
            .map(|line| match line.split_once(GLOSS_DELIMITER) {
                Some((headword, _gloss)) => headword,
                None => line,
            })
            .flat_map(str::split_whitespace)
            .map(str::to_string)
            .collect();

        Self { words }
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.words().map(|w| format!("\"{w}\"")).collect();
        write!(f, "[{}]", quoted.join(", "))
    }
}
