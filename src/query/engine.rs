use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::analysis::normalizer::TextNormalizer;
use crate::core::error::{Error, ErrorKind, Result};
use crate::index::SearchIndex;
use crate::index::locked::LockedIndex;
use crate::parallel::queue::WorkQueue;
use crate::search::results::SearchResult;

/// Query results keyed by canonical query string, ascending.
pub type QueryResults = BTreeMap<String, Vec<SearchResult>>;

fn open_query_file(path: &Path) -> Result<BufReader<File>> {
    if path.is_dir() {
        return Err(Error::new(
            ErrorKind::WrongInputKind,
            format!("query input {} is a directory", path.display()),
        ));
    }
    Ok(BufReader::new(File::open(path)?))
}

/// Reduces a line to its canonical form: the space-joined sorted stem
/// set. Returns the stems alongside; `None` for lines with no stems.
fn canonicalize(normalizer: &TextNormalizer, line: &str) -> Option<(String, std::collections::BTreeSet<String>)> {
    let stems = normalizer.unique_stems(line);
    if stems.is_empty() {
        return None;
    }
    let canonical = stems.iter().cloned().collect::<Vec<_>>().join(" ");
    Some((canonical, stems))
}

/// Single-threaded query driver over any readable index.
///
/// Lines with the same canonical form are answered once; later
/// duplicates are dropped before `search` runs.
pub struct QueryEngine<'a, I> {
    index: &'a I,
    exact: bool,
    normalizer: TextNormalizer,
    results: QueryResults,
}

impl<'a, I: SearchIndex> QueryEngine<'a, I> {
    pub fn new(index: &'a I, exact: bool) -> Self {
        QueryEngine {
            index,
            exact,
            normalizer: TextNormalizer::new(),
            results: QueryResults::new(),
        }
    }

    /// Processes a query file line by line. Per-line failures cannot
    /// happen past the read itself, so the first I/O error aborts.
    pub fn parse_queries(&mut self, path: &Path) -> Result<()> {
        for line in open_query_file(path)?.lines() {
            self.parse_line(&line?);
        }
        Ok(())
    }

    pub fn parse_line(&mut self, line: &str) {
        let Some((canonical, stems)) = canonicalize(&self.normalizer, line) else {
            return;
        };
        if self.results.contains_key(&canonical) {
            return;
        }
        let hits = self.index.search(&stems, self.exact);
        self.results.insert(canonical, hits);
    }

    pub fn results(&self) -> &QueryResults {
        &self.results
    }

    pub fn into_results(self) -> QueryResults {
        self.results
    }
}

/// Concurrent query driver: one task per line on the shared queue, with
/// the results map behind its own mutex.
///
/// A task reserves its canonical key with an empty list before searching
/// and fills the slot afterwards, so two lines with the same canonical
/// form can never both reach `search` regardless of interleaving.
#[derive(Clone)]
pub struct ThreadedQueryEngine {
    index: Arc<LockedIndex>,
    queue: Arc<WorkQueue>,
    exact: bool,
    results: Arc<Mutex<QueryResults>>,
}

impl ThreadedQueryEngine {
    pub fn new(index: Arc<LockedIndex>, queue: Arc<WorkQueue>, exact: bool) -> Self {
        ThreadedQueryEngine {
            index,
            queue,
            exact,
            results: Arc::new(Mutex::new(QueryResults::new())),
        }
    }

    /// Submits one task per line, then waits for the wavefront.
    pub fn parse_queries(&self, path: &Path) -> Result<()> {
        for line in open_query_file(path)?.lines() {
            let line = line?;
            let engine = self.clone();
            self.queue.execute(move || engine.parse_line(&line));
        }
        self.queue.finish();
        Ok(())
    }

    pub fn parse_line(&self, line: &str) {
        let normalizer = TextNormalizer::new();
        let Some((canonical, stems)) = canonicalize(&normalizer, line) else {
            return;
        };

        // Reserve, search outside the lock, fill.
        {
            let mut results = self.results.lock();
            if results.contains_key(&canonical) {
                return;
            }
            results.insert(canonical.clone(), Vec::new());
        }
        let hits = self.index.search(&stems, self.exact);
        self.results.lock().insert(canonical, hits);
    }

    pub fn results(&self) -> QueryResults {
        self.results.lock().clone()
    }
}
