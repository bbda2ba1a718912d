/// Runtime knobs shared by the builder, crawler, and query engines.
#[derive(Debug, Clone)]
pub struct Config {
    /// Worker threads in the shared queue.
    pub workers: usize,
    /// Maximum number of URLs a crawl may consume, seed included.
    pub crawl_limit: usize,
    /// Redirect hops a single fetch may follow.
    pub redirects: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: 5,
            crawl_limit: 50,
            redirects: 3,
        }
    }
}
