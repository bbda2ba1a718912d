use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::cmp::Ordering;

/// One ranked hit for a single query: the matched location, how many
/// matched positions it held, and the count/word-count ratio.
///
/// A location appears at most once per query; `score` can never be NaN
/// because a listed location holds at least one match and so has a
/// positive word count.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub location: String,
    pub count: u32,
    pub score: f64,
}

impl SearchResult {
    pub fn new(location: String, count: u32, score: f64) -> Self {
        SearchResult {
            location,
            count,
            score,
        }
    }
}

impl Eq for SearchResult {}

impl Ord for SearchResult {
    /// Ranking order: score descending, then count descending, then
    /// location ascending ignoring case, ties broken case-sensitively.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| compare_locations(&self.location, &other.location))
    }
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_locations(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

impl Serialize for SearchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The score is emitted as a fixed-point decimal with eight
        // fractional digits, which f64 serialization cannot express.
        let score = serde_json::value::RawValue::from_string(format!("{:.8}", self.score))
            .map_err(serde::ser::Error::custom)?;

        let mut state = serializer.serialize_struct("SearchResult", 3)?;
        state.serialize_field("where", &self.location)?;
        state.serialize_field("count", &self.count)?;
        state.serialize_field("score", &*score)?;
        state.end()
    }
}
