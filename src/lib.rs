pub mod analysis;
pub mod core;
pub mod crawl;
pub mod index;
pub mod ingest;
pub mod output;
pub mod parallel;
pub mod query;
pub mod search;

/*
TRAWLER MODULE MAP

  core      Config, Error/ErrorKind/Result
  parallel  ReadWriteLock<T> (Dormant/Reading/Writing with writer identity),
            WorkQueue (fixed pool, FIFO tasks, pending counter, finish barrier)
  analysis  token cleaning + Snowball stemming (TextNormalizer)
  index     InvertedIndex (word -> location -> positions, per-location counts),
            LockedIndex (ReadWriteLock facade over InvertedIndex)
  search    SearchResult and its ranking order
  ingest    directory walker + sequential/parallel index builders
  crawl     URL cleaning, link extraction, redirect-following HTML fetch,
            HTML stripping, bounded-BFS WebCrawler
  query     sequential and threaded query engines
  output    tab-indented JSON artifacts (index, counts, results)

  inputs (file tree | seed URL) -> ingest/crawl -> index -> query -> output
*/
