use std::path::Path;

use rand::Rng;

/// Built-in word list used when no `word_list` path is configured.
const DEFAULT_WORDS: &str = include_str!("../assets/words.txt");

#[derive(Debug)]
pub enum WordListError {
    /// The source contained no usable words.
    Empty,
    Io(String, std::io::Error),
}

impl std::fmt::Display for WordListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "word list contains no words"),
            Self::Io(path, e) => write!(f, "failed to read word list {path}: {e}"),
        }
    }
}

impl std::error::Error for WordListError {}

/// The pool of secret words rounds draw from.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Parse a newline-separated list. Entries are trimmed and blank lines
    /// dropped; an empty result is an error rather than a lobby that can
    /// never start a round.
    pub fn parse(text: &str) -> Result<Self, WordListError> {
        let words: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();
        if words.is_empty() {
            return Err(WordListError::Empty);
        }
        Ok(Self { words })
    }

    pub fn load(path: &Path) -> Result<Self, WordListError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| WordListError::Io(path.display().to_string(), e))?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Draw one word, uniformly.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.words[rng.random_range(0..self.words.len())]
    }
}

impl Default for WordList {
    fn default() -> Self {
        Self::parse(DEFAULT_WORDS).expect("built-in word list is non-empty")
    }
}
