use rust_stemmers::{Algorithm, Stemmer};
use std::collections::BTreeSet;

use crate::analysis::tokenizer::clean_split;

/// Cleans and stems text into index-ready words: split on non-letter
/// boundaries, lowercase, drop empties, then English Snowball stemming.
pub struct TextNormalizer {
    stemmer: Stemmer,
}

impl TextNormalizer {
    pub fn new() -> Self {
        TextNormalizer {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Lazy sequence of stems in source order, duplicates included.
    pub fn stems<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        clean_split(text).map(|word| self.stemmer.stem(&word).into_owned())
    }

    /// Sorted, de-duplicated stem set. This is the query form: its
    /// space-joined rendering is the canonical query string.
    pub fn unique_stems(&self, text: &str) -> BTreeSet<String> {
        self.stems(text).collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
