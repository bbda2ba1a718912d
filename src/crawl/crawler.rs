use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

use crate::analysis::normalizer::TextNormalizer;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::crawl::clean;
use crate::crawl::fetch::HtmlFetcher;
use crate::crawl::html::HtmlStripper;
use crate::crawl::links::LinkParser;
use crate::index::inverted::InvertedIndex;
use crate::index::locked::LockedIndex;
use crate::parallel::queue::WorkQueue;

/// Bounded breadth-first crawl over the work queue.
///
/// The `consumed` set of cleaned absolute URLs enforces both uniqueness
/// and the crawl limit: a URL is admitted only while the set is below the
/// limit and only on first sight, decided in one critical section so no
/// interleaving can admit past the limit. Every admitted URL becomes one
/// crawl task; the seed is admitted like any other URL.
#[derive(Clone)]
pub struct WebCrawler {
    index: Arc<LockedIndex>,
    queue: Arc<WorkQueue>,
    fetcher: Arc<HtmlFetcher>,
    links: Arc<LinkParser>,
    stripper: Arc<HtmlStripper>,
    consumed: Arc<Mutex<HashSet<String>>>,
    limit: usize,
    redirects: usize,
}

impl WebCrawler {
    pub fn new(index: Arc<LockedIndex>, queue: Arc<WorkQueue>, config: &Config) -> Result<Self> {
        Ok(WebCrawler {
            index,
            queue,
            fetcher: Arc::new(HtmlFetcher::new()?),
            links: Arc::new(LinkParser::new()?),
            stripper: Arc::new(HtmlStripper::new()?),
            consumed: Arc::new(Mutex::new(HashSet::new())),
            limit: config.crawl_limit.max(1),
            redirects: config.redirects,
        })
    }

    /// Crawls from `seed` until the limit is reached and every submitted
    /// task has finished. Only the calling thread waits on the queue.
    pub fn crawl(&self, seed: &str) -> Result<()> {
        let seed = clean::clean_url(Url::parse(seed)?);
        if self.admit_seed(&seed) {
            self.submit(seed);
        }
        self.queue.finish();

        info!("crawl consumed {} url(s)", self.consumed.lock().len());
        Ok(())
    }

    fn admit_seed(&self, url: &Url) -> bool {
        let mut consumed = self.consumed.lock();
        consumed.len() < self.limit && consumed.insert(url.to_string())
    }

    fn submit(&self, url: Url) {
        let crawler = self.clone();
        self.queue.execute(move || crawler.crawl_task(url));
    }

    fn crawl_task(&self, url: Url) {
        let page = match self.fetcher.fetch(&url, self.redirects) {
            Ok(page) => page,
            Err(err) => {
                debug!("skipping {}: {}", url, err);
                return;
            }
        };

        // Widen the wavefront before the (slow) tokenize-and-merge step:
        // freshly admitted links start fetching on other workers while
        // this one is still indexing.
        let admitted: Vec<Url> = {
            let mut consumed = self.consumed.lock();
            self.links
                .list_links(&url, &page)
                .into_iter()
                .filter(|link| {
                    consumed.len() < self.limit && consumed.insert(link.to_string())
                })
                .collect()
        };
        for link in admitted {
            debug!("admitted {}", link);
            self.submit(link);
        }

        let text = self.stripper.strip(&page);
        let normalizer = TextNormalizer::new();
        let mut local = InvertedIndex::new();
        local.add_all(normalizer.stems(&text), url.as_str());
        self.index.merge(local);
    }

    /// Cleaned URLs consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed.lock().len()
    }
}
