use std::collections::HashSet;

/// Answers whether a candidate string is a recognized word.
///
/// The game only ever asks this one question, so any word source can be plugged in.
pub trait Dictionary {
    fn is_word(&self, candidate: &str) -> bool;
}

impl<F> Dictionary for F
where
    F: Fn(&str) -> bool,
{
    fn is_word(&self, candidate: &str) -> bool {
        self(candidate)
    }
}

/// A set-backed dictionary. Words are stored lowercased.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Parses a whitespace separated word list, one or more words per line.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split_whitespace())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn is_word(&self, candidate: &str) -> bool {
        self.words.contains(candidate)
    }
}
