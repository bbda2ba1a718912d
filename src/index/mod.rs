pub mod inverted;
pub mod locked;

use std::collections::BTreeSet;

use crate::search::results::SearchResult;

/// Read capability shared by the plain and lock-wrapped indexes, so the
/// query engines stay generic over where the data lives.
pub trait SearchIndex {
    /// Ranked results for one query's sorted stem set.
    fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult>;
}
