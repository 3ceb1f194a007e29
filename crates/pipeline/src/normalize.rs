//! Text normalization: collapsing, lowercasing and stemming.
//!
//! Multi-word entities ("Science Fiction", "Sam Worthington") are collapsed
//! into a single token so that the vectorizer sees one feature per entity
//! rather than one per word.
//!
//! Stemming uses the Snowball English (Porter2) algorithm. A single Porter
//! pass is not always a fixed point, so `stem` re-applies it until the token
//! stops changing. That makes stemming idempotent:
//! `stem(stem(t)) == stem(t)`.

use rust_stemmers::{Algorithm, Stemmer};

/// Upper bound on re-stemming; Porter2 settles within two or three passes.
const MAX_STEM_ROUNDS: usize = 8;

/// Remove all whitespace inside a multi-word name
pub fn collapse_entity(name: &str) -> String {
    name.split_whitespace().collect()
}

/// Produces canonical lowercase, stemmed tokens.
pub struct TextNormalizer {
    stemmer: Stemmer,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Stem a single lowercase token to its fixed point
    pub fn stem(&self, token: &str) -> String {
        let mut current = token.to_string();
        for _ in 0..MAX_STEM_ROUNDS {
            let next = self.stemmer.stem(&current);
            if next == current.as_str() {
                break;
            }
            current = next.into_owned();
        }
        current
    }

    /// Collapse, lowercase and stem one raw token or phrase.
    ///
    /// Input with no alphanumeric content normalizes to the empty token.
    pub fn normalize_token(&self, raw: &str) -> String {
        let collapsed = collapse_entity(raw).to_lowercase();
        if !collapsed.chars().any(char::is_alphanumeric) {
            return String::new();
        }
        self.stem(&collapsed)
    }

    /// Lowercase a whitespace-separated string and stem every token
    pub fn normalize_text(&self, text: &str) -> String {
        text.to_lowercase()
            .split_whitespace()
            .map(|token| self.stem(token))
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
