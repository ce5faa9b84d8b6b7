//! LaTeX citation key extraction.
//!
//! Finds `\cite{...}`, `\citet{...}` and `\citep{...}` markers in text and
//! tallies how often each citation key is used.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

/// Matches `\cite{..}`, `\citet{..}` and `\citep{..}`.
/// Group 1: the raw brace argument (up to the first closing brace)
fn cite_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\cite[tp]?\{(.*?)\}").expect("citation regex is valid"))
}

/// Occurrence counts of citation keys across every processed document.
///
/// Keys are opaque: no case folding or punctuation cleanup is applied.
/// Iteration is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationFrequency {
    counts: BTreeMap<String, usize>,
    empty_tokens: usize,
}

impl CitationFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `text` for citation markers and registers every key found.
    ///
    /// The brace argument may hold several comma-separated keys; each one is
    /// trimmed and counted independently. Empty tokens (from `\cite{}` or a
    /// trailing comma) are not registered, only tallied in
    /// [`empty_tokens`](Self::empty_tokens).
    ///
    /// # Examples
    ///
    /// ```
    /// use papers_bibtex::CitationFrequency;
    ///
    /// let mut freq = CitationFrequency::new();
    /// freq.extract(r"See \cite{A,B} and later \citep{A}.");
    /// assert_eq!(freq.count("A"), 2);
    /// assert_eq!(freq.count("B"), 1);
    /// ```
    pub fn extract(&mut self, text: &str) {
        for cap in cite_regex().captures_iter(text) {
            let argument = cap.get(1).map_or("", |m| m.as_str());
            for key in argument.split(',') {
                self.register(key.trim());
            }
        }
    }

    fn register(&mut self, key: &str) {
        if key.is_empty() {
            self.empty_tokens += 1;
            return;
        }
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    /// Folds the counts of `other` into this accumulator.
    pub fn merge(&mut self, other: CitationFrequency) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
        self.empty_tokens += other.empty_tokens;
    }

    /// Number of times `key` was cited (0 if never).
    pub fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    /// Distinct keys, in key order.
    pub fn keys(&self) -> Vec<String> {
        self.counts.keys().cloned().collect()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, usize> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Empty key tokens seen and discarded.
    pub fn empty_tokens(&self) -> usize {
        self.empty_tokens
    }
}

impl<'a> IntoIterator for &'a CitationFrequency {
    type Item = (&'a String, &'a usize);
    type IntoIter = btree_map::Iter<'a, String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
