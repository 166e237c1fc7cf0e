//! # Custom Words
//!
//! Type-safe word collection for configurable active effects.
//!
//! Configurable effects (e.g. `fading_messages`) carry a short ordered list of
//! user-supplied words. Each effect declares its own [`WordLimits`]; a
//! [`CustomWords`] value can only be built through [`CustomWords::parse`], which
//! enforces those limits.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits a configurable effect places on its custom words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordLimits {
    /// Maximum number of words (inclusive)
    pub max_words: usize,
    /// Maximum characters per word (inclusive, counted as chars)
    pub max_chars: usize,
}

impl WordLimits {
    /// Limits used by short single-word effects.
    pub const SHORT_WORDS: Self = Self {
        max_words: 5,
        max_chars: 15,
    };

    /// Limits used by phrase effects.
    pub const PHRASES: Self = Self {
        max_words: 4,
        max_chars: 50,
    };

    /// Create custom limits.
    #[must_use]
    pub const fn new(max_words: usize, max_chars: usize) -> Self {
        Self {
            max_words,
            max_chars,
        }
    }
}

/// Word collection validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordsError {
    /// No words provided
    #[error("At least one word is required")]
    Empty,
    /// More words than the effect allows
    #[error("At most {max} words are allowed, got {provided}")]
    TooMany {
        /// Effect maximum
        max: usize,
        /// Number of words provided
        provided: usize,
    },
    /// A word is blank after trimming
    #[error("Word {index} is blank")]
    Blank {
        /// Zero-based position of the blank entry
        index: usize,
    },
    /// A word exceeds the per-word character cap
    #[error("'{word}' is longer than {max_chars} characters")]
    TooLong {
        /// The offending word
        word: String,
        /// Effect per-word cap
        max_chars: usize,
    },
    /// The same word appears twice (case-insensitive)
    #[error("'{word}' appears more than once")]
    Duplicate {
        /// The repeated word
        word: String,
    },
}

/// Ordered, duplicate-free set of custom words.
///
/// Invariants (for values built by [`CustomWords::parse`]):
/// - between 1 and `limits.max_words` entries
/// - every entry trimmed, non-empty and at most `limits.max_chars` chars
/// - no two entries equal ignoring case
///
/// The empty value ([`CustomWords::default`]) represents "no words" and is what
/// non-configurable effects carry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomWords(IndexSet<String>);

impl CustomWords {
    /// Validate raw input against `limits`.
    pub fn parse<I, S>(words: I, limits: WordLimits) -> Result<Self, WordsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<S> = words.into_iter().collect();
        if raw.is_empty() {
            return Err(WordsError::Empty);
        }
        if raw.len() > limits.max_words {
            return Err(WordsError::TooMany {
                max: limits.max_words,
                provided: raw.len(),
            });
        }

        let mut seen = IndexSet::with_capacity(raw.len());
        let mut out = IndexSet::with_capacity(raw.len());
        for (index, word) in raw.iter().enumerate() {
            let word = word.as_ref().trim();
            if word.is_empty() {
                return Err(WordsError::Blank { index });
            }
            if word.chars().count() > limits.max_chars {
                return Err(WordsError::TooLong {
                    word: word.to_string(),
                    max_chars: limits.max_chars,
                });
            }
            if !seen.insert(word.to_lowercase()) {
                return Err(WordsError::Duplicate {
                    word: word.to_string(),
                });
            }
            out.insert(word.to_string());
        }
        Ok(Self(out))
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no words are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copy out as a plain list.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}
