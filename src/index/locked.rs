use std::collections::{BTreeMap, BTreeSet};

use crate::index::SearchIndex;
use crate::index::inverted::InvertedIndex;
use crate::parallel::rwlock::{ReadGuard, ReadWriteLock};
use crate::search::results::SearchResult;

/// Thread-safe facade over [`InvertedIndex`].
///
/// Every read runs inside a read section and returns owned snapshots, so
/// callers never observe torn state; every mutation is one write-critical
/// section covering its full traversal (a `merge` holds the write lock
/// exactly once per merged index).
#[derive(Default)]
pub struct LockedIndex {
    inner: ReadWriteLock<InvertedIndex>,
}

impl LockedIndex {
    pub fn new() -> Self {
        LockedIndex {
            inner: ReadWriteLock::new(InvertedIndex::new()),
        }
    }

    pub fn add(&self, word: String, location: &str, position: u32) {
        self.inner.write().add(word, location, position);
    }

    pub fn add_all(&self, stems: impl IntoIterator<Item = String>, location: &str) {
        self.inner.write().add_all(stems, location);
    }

    pub fn merge(&self, other: InvertedIndex) {
        self.inner.write().merge(other);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.inner.read().contains(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.inner.read().contains_location(word, location)
    }

    pub fn contains_position(&self, word: &str, location: &str, position: u32) -> bool {
        self.inner.read().contains_position(word, location, position)
    }

    pub fn words(&self) -> Vec<String> {
        self.inner.read().words().map(String::from).collect()
    }

    pub fn locations(&self, word: &str) -> Vec<String> {
        self.inner.read().locations(word).map(String::from).collect()
    }

    pub fn positions(&self, word: &str, location: &str) -> Vec<u32> {
        self.inner.read().positions(word, location).collect()
    }

    pub fn counts(&self) -> BTreeMap<String, u32> {
        self.inner.read().counts().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        self.inner.read().search(stems, exact)
    }

    /// Holds the read lock for the guard's lifetime; used to serialize
    /// the whole index in one consistent section.
    pub fn read(&self) -> ReadGuard<'_, InvertedIndex> {
        self.inner.read()
    }

    pub fn into_inner(self) -> InvertedIndex {
        self.inner.into_inner()
    }
}

impl SearchIndex for LockedIndex {
    fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        LockedIndex::search(self, stems, exact)
    }
}
