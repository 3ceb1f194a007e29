//! Count vectorization over a bounded vocabulary.
//!
//! ## Algorithm
//! 1. Tokenize every tag: lowercase runs of two or more alphanumeric characters
//! 2. Drop English stop words
//! 3. Count each token across the whole corpus
//! 4. Keep the `max_features` most frequent (ties by token text)
//! 5. Give kept tokens column indices in alphabetical order
//! 6. Emit one count vector per document
//!
//! Every step is order-deterministic, so the same corpus always yields the
//! same vocabulary and the same vectors.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument};

/// Default vocabulary bound
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Common English function words excluded from the vocabulary
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "alone", "along",
    "already", "also", "although", "always", "am", "among", "an", "and", "another", "any",
    "anyone", "anything", "are", "around", "as", "at", "back", "be", "became", "because",
    "become", "becomes", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "cannot", "could", "did", "do", "does", "doing", "done", "down", "during", "each",
    "either", "else", "enough", "even", "ever", "every", "few", "for", "from", "further",
    "get", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its", "itself",
    "just", "least", "less", "many", "may", "me", "might", "more", "most", "much", "must",
    "my", "myself", "neither", "never", "no", "nor", "not", "nothing", "now", "of", "off",
    "often", "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise", "our",
    "ours", "ourselves", "out", "over", "own", "per", "perhaps", "rather", "same", "several",
    "she", "should", "since", "so", "some", "someone", "something", "still", "such", "than",
    "that", "the", "their", "theirs", "them", "themselves", "then", "there", "therefore",
    "these", "they", "this", "those", "though", "through", "thus", "to", "together", "too",
    "toward", "under", "until", "up", "upon", "us", "very", "was", "we", "well", "were",
    "what", "whatever", "when", "where", "whether", "which", "while", "who", "whoever",
    "whole", "whom", "whose", "why", "will", "with", "within", "without", "would", "yet",
    "you", "your", "yours", "yourself", "yourselves",
];

// =============================================================================
// Vocabulary
// =============================================================================

/// Token → column index mapping, fixed once fitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    fn from_terms(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(col, term)| (term.clone(), col))
            .collect();
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn term(&self, col: usize) -> Option<&str> {
        self.terms.get(col).map(String::as_str)
    }

    /// Terms in column order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

// =============================================================================
// Count Vector
// =============================================================================

/// Term counts for one document over a vocabulary of width `dim`.
///
/// Stored as `(column, count)` pairs sorted by column with zero entries
/// omitted; `to_dense` gives the fixed-width view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountVector {
    dim: usize,
    entries: Vec<(u32, u32)>,
}

impl CountVector {
    /// Width of the dense vector (vocabulary size)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Non-zero `(column, count)` pairs, sorted by column
    pub fn entries(&self) -> &[(u32, u32)] {
        &self.entries
    }

    /// Count at a column (zero if absent)
    pub fn get(&self, col: usize) -> u32 {
        self.entries
            .binary_search_by_key(&(col as u32), |&(c, _)| c)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    pub fn to_dense(&self) -> Vec<u32> {
        let mut dense = vec![0; self.dim];
        for &(col, count) in &self.entries {
            dense[col as usize] = count;
        }
        dense
    }

    /// Dot product with another vector over the same vocabulary
    pub fn dot(&self, other: &CountVector) -> u64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0u64;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_col, a_count) = self.entries[i];
            let (b_col, b_count) = other.entries[j];
            match a_col.cmp(&b_col) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_count as u64 * b_count as u64;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        let squares: u64 = self
            .entries
            .iter()
            .map(|&(_, count)| count as u64 * count as u64)
            .sum();
        (squares as f64).sqrt()
    }
}

// =============================================================================
// Vectorizer
// =============================================================================

/// Bag-of-words count vectorizer with a frequency-bounded vocabulary.
pub struct CountVectorizer {
    max_features: usize,
    stop_words: HashSet<&'static str>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Set maximum vocabulary size (default: 5000)
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Split a document into lowercase tokens of two or more word characters,
    /// skipping stop words
    pub fn tokenize(&self, doc: &str) -> Vec<String> {
        doc.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= 2)
            .map(str::to_lowercase)
            .filter(|token| !self.stop_words.contains(token.as_str()))
            .collect()
    }

    /// Learn the vocabulary from the whole corpus
    #[instrument(skip_all, fields(documents = corpus.len()))]
    pub fn fit<S: AsRef<str>>(&self, corpus: &[S]) -> Vocabulary {
        let mut frequencies: HashMap<String, u64> = HashMap::new();
        for doc in corpus {
            for token in self.tokenize(doc.as_ref()) {
                *frequencies.entry(token).or_insert(0) += 1;
            }
        }
        let distinct = frequencies.len();

        let mut ranked: Vec<(String, u64)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        debug!(
            "Vocabulary holds {} of {} distinct tokens",
            terms.len(),
            distinct
        );
        Vocabulary::from_terms(terms)
    }

    /// Count vocabulary tokens in a single document
    pub fn transform(&self, vocabulary: &Vocabulary, doc: &str) -> CountVector {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for token in self.tokenize(doc) {
            if let Some(col) = vocabulary.index_of(&token) {
                *counts.entry(col as u32).or_insert(0) += 1;
            }
        }
        CountVector {
            dim: vocabulary.len(),
            entries: counts.into_iter().collect(),
        }
    }

    /// Fit the vocabulary, then vectorize every document in parallel.
    /// Output order matches corpus order.
    pub fn fit_transform<S: AsRef<str> + Sync>(&self, corpus: &[S]) -> (Vocabulary, Vec<CountVector>) {
        let vocabulary = self.fit(corpus);
        let vectors = corpus
            .par_iter()
            .map(|doc| self.transform(&vocabulary, doc.as_ref()))
            .collect();
        (vocabulary, vectors)
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
