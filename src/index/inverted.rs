use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::index::SearchIndex;
use crate::search::results::SearchResult;

/// The core inverted index: a word -> location -> positions map plus a
/// per-location word count, both ordered by key ascending.
///
/// Positions are 1-indexed token ordinals within one location, stored as
/// an ascending set with duplicates suppressed. The count table records
/// each location's maximum observed position, the denominator of every
/// score. `add` and `merge` keep the two structures consistent: a counted
/// location always has at least one entry, and no stored position exceeds
/// its location's count.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    entries: BTreeMap<String, BTreeMap<String, BTreeSet<u32>>>,
    counts: BTreeMap<String, u32>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex {
            entries: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Records one occurrence of `word` at `position` inside `location`.
    /// Idempotent per (word, location, position) triple.
    pub fn add(&mut self, word: String, location: &str, position: u32) {
        let positions = self
            .entries
            .entry(word)
            .or_default()
            .entry(location.to_string())
            .or_default();
        if positions.insert(position) {
            let count = self.counts.entry(location.to_string()).or_insert(0);
            if position > *count {
                *count = position;
            }
        }
    }

    /// Indexes a whole token stream under `location` with 1-based positions.
    pub fn add_all(&mut self, stems: impl IntoIterator<Item = String>, location: &str) {
        self.add_at(stems, location, 1);
    }

    /// Indexes a token stream whose first token sits at `start`.
    pub fn add_at(
        &mut self,
        stems: impl IntoIterator<Item = String>,
        location: &str,
        start: u32,
    ) {
        let mut position = start;
        for stem in stems {
            self.add(stem, location, position);
            position += 1;
        }
    }

    /// Bulk-unions `other` into `self`. Absent words are spliced in
    /// wholesale; otherwise position sets merge per location. Counts take
    /// the per-location maximum. Commutative and associative, so any
    /// merge order of per-file indexes matches the sequential build.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (word, locations) in other.entries {
            match self.entries.entry(word) {
                Entry::Vacant(slot) => {
                    slot.insert(locations);
                }
                Entry::Occupied(mut slot) => {
                    for (location, positions) in locations {
                        slot.get_mut().entry(location).or_default().extend(positions);
                    }
                }
            }
        }
        for (location, count) in other.counts {
            let mine = self.counts.entry(location).or_insert(0);
            if count > *mine {
                *mine = count;
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.entries
            .get(word)
            .is_some_and(|locations| locations.contains_key(location))
    }

    pub fn contains_position(&self, word: &str, location: &str, position: u32) -> bool {
        self.entries
            .get(word)
            .and_then(|locations| locations.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    /// Indexed words in ascending order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Locations holding `word`, ascending; empty if the word is absent.
    pub fn locations<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a str> {
        self.entries
            .get(word)
            .into_iter()
            .flat_map(|locations| locations.keys().map(String::as_str))
    }

    /// Positions of `word` inside `location`, ascending; empty if absent.
    pub fn positions<'a>(&'a self, word: &str, location: &str) -> impl Iterator<Item = u32> + 'a {
        self.entries
            .get(word)
            .and_then(|locations| locations.get(location))
            .into_iter()
            .flat_map(|positions| positions.iter().copied())
    }

    /// The full word map, for serialization.
    pub fn entries(&self) -> &BTreeMap<String, BTreeMap<String, BTreeSet<u32>>> {
        &self.entries
    }

    /// The location -> word-count table.
    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }

    /// Number of distinct indexed words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of locations holding `word`.
    pub fn location_count(&self, word: &str) -> usize {
        self.entries.get(word).map_or(0, BTreeMap::len)
    }

    /// Number of positions of `word` inside `location`.
    pub fn position_count(&self, word: &str, location: &str) -> usize {
        self.entries
            .get(word)
            .and_then(|locations| locations.get(location))
            .map_or(0, BTreeSet::len)
    }

    /// Ranked results for one query.
    ///
    /// Exact mode considers each stem verbatim. Prefix mode walks the
    /// ordered key range starting at the first word >= the stem and stops
    /// at the first word that no longer starts with it; the ordered map
    /// makes this a range scan, not a filter over every key. A seen-set
    /// keeps overlapping prefixes (e.g. "car" and "cart") from tallying
    /// the same word twice.
    pub fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut totals: HashMap<&String, u32> = HashMap::new();

        for stem in stems {
            if exact {
                if let Some((word, locations)) = self.entries.get_key_value(stem) {
                    if seen.insert(word) {
                        tally(&mut totals, locations);
                    }
                }
            } else {
                for (word, locations) in self.entries.range(stem.clone()..) {
                    if !word.starts_with(stem.as_str()) {
                        break;
                    }
                    if seen.insert(word) {
                        tally(&mut totals, locations);
                    }
                }
            }
        }

        let mut results: Vec<SearchResult> = totals
            .into_iter()
            .map(|(location, count)| {
                let total = self.counts[location];
                SearchResult::new(location.clone(), count, f64::from(count) / f64::from(total))
            })
            .collect();
        results.sort_unstable();
        results
    }
}

fn tally<'a>(totals: &mut HashMap<&'a String, u32>, locations: &'a BTreeMap<String, BTreeSet<u32>>) {
    for (location, positions) in locations {
        *totals.entry(location).or_insert(0) += positions.len() as u32;
    }
}

impl SearchIndex for InvertedIndex {
    fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        InvertedIndex::search(self, stems, exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InvertedIndex {
        // Corpus E1: A holds "apple apple banana", B holds "banana cherry".
        let mut index = InvertedIndex::new();
        index.add_all(
            ["apple", "apple", "banana"].map(String::from),
            "A",
        );
        index.add_all(["banana", "cherry"].map(String::from), "B");
        index
    }

    fn query(stems: &[&str]) -> BTreeSet<String> {
        stems.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positions_and_counts() {
        let index = sample();

        assert_eq!(index.positions("apple", "A").collect::<Vec<_>>(), [1, 2]);
        assert_eq!(index.positions("banana", "A").collect::<Vec<_>>(), [3]);
        assert_eq!(index.positions("banana", "B").collect::<Vec<_>>(), [1]);
        assert_eq!(index.positions("cherry", "B").collect::<Vec<_>>(), [2]);
        assert_eq!(index.counts()["A"], 3);
        assert_eq!(index.counts()["B"], 2);
    }

    #[test]
    fn test_enumeration_is_ordered() {
        let index = sample();

        assert_eq!(
            index.words().collect::<Vec<_>>(),
            ["apple", "banana", "cherry"]
        );
        assert_eq!(index.locations("banana").collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut once = InvertedIndex::new();
        once.add("apple".to_string(), "A", 1);
        let mut twice = once.clone();
        twice.add("apple".to_string(), "A", 1);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_contains_predicates() {
        let index = sample();

        assert!(index.contains("apple"));
        assert!(!index.contains("durian"));
        assert!(index.contains_location("banana", "B"));
        assert!(!index.contains_location("apple", "B"));
        assert!(index.contains_position("apple", "A", 2));
        assert!(!index.contains_position("apple", "A", 3));
    }

    #[test]
    fn test_count_invariants() {
        let index = sample();

        for word in index.words() {
            for location in index.locations(word).collect::<Vec<_>>() {
                let max = index.positions(word, location).max().unwrap();
                assert!(index.counts()[location] >= max);
            }
        }
        for location in index.counts().keys() {
            assert!(index.words().any(|w| index.contains_location(w, location)));
        }
    }

    #[test]
    fn test_merge_unions_positions_and_counts() {
        let mut left = InvertedIndex::new();
        left.add("apple".to_string(), "A", 1);
        left.add("banana".to_string(), "A", 2);
        let mut right = InvertedIndex::new();
        right.add("banana".to_string(), "A", 5);
        right.add("banana".to_string(), "B", 1);

        left.merge(right);

        assert_eq!(left.positions("banana", "A").collect::<Vec<_>>(), [2, 5]);
        assert_eq!(left.positions("banana", "B").collect::<Vec<_>>(), [1]);
        assert_eq!(left.counts()["A"], 5);
        assert_eq!(left.counts()["B"], 1);
    }

    #[test]
    fn test_merge_is_commutative() {
        let mut left = InvertedIndex::new();
        left.add_all(["apple", "banana"].map(String::from), "A");
        let mut right = InvertedIndex::new();
        right.add_all(["banana", "cherry"].map(String::from), "B");

        let mut ab = left.clone();
        ab.merge(right.clone());
        let mut ba = right;
        ba.merge(left);

        assert_eq!(ab, ba);
    }

    #[test]
    fn test_exact_search_scores_and_ranks() {
        let index = sample();

        let results = index.search(&query(&["banana"]), true);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].location, "B");
        assert_eq!(results[0].count, 1);
        assert_eq!(results[0].score, 0.5);
        assert_eq!(results[1].location, "A");
        assert_eq!(results[1].count, 1);
        assert_eq!(results[1].score, 1.0 / 3.0);
    }

    #[test]
    fn test_exact_search_sums_over_stems() {
        let index = sample();

        let results = index.search(&query(&["apple", "banana"]), true);
        assert_eq!(results[0].location, "A");
        assert_eq!(results[0].count, 3);
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[1].location, "B");
        assert_eq!(results[1].count, 1);
    }

    #[test]
    fn test_prefix_search_scans_key_range() {
        // Corpus E2: X holds "car cart carpet".
        let mut index = InvertedIndex::new();
        index.add_all(["car", "cart", "carpet"].map(String::from), "X");

        let results = index.search(&query(&["car"]), false);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].count, 3);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_overlapping_prefixes_count_once() {
        let mut index = InvertedIndex::new();
        index.add_all(["car", "cart", "carpet"].map(String::from), "X");

        // "cart" is covered by the "car" scan already; tallying it again
        // would double-count.
        let results = index.search(&query(&["car", "cart"]), false);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].count, 3);
    }

    #[test]
    fn test_prefix_does_not_overrun_range() {
        let mut index = InvertedIndex::new();
        index.add_all(["car", "cat", "dog"].map(String::from), "X");

        let results = index.search(&query(&["ca"]), false);
        assert_eq!(results[0].count, 2);
        assert!(index.search(&query(&["cb"]), false).is_empty());
    }

    #[test]
    fn test_search_misses_return_empty() {
        let index = sample();

        assert!(index.search(&query(&["durian"]), true).is_empty());
        assert!(index.search(&query(&["durian"]), false).is_empty());
        assert!(index.search(&BTreeSet::new(), false).is_empty());
    }

    #[test]
    fn test_each_location_appears_once_per_query() {
        let index = sample();

        let results = index.search(&query(&["apple", "banana", "cherry"]), true);
        let mut locations: Vec<&str> = results.iter().map(|r| r.location.as_str()).collect();
        locations.sort_unstable();
        locations.dedup();
        assert_eq!(locations.len(), results.len());
    }
}
