use clap::Parser;
use log::{LevelFilter, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use trawler::core::config::Config;
use trawler::crawl::crawler::WebCrawler;
use trawler::index::inverted::InvertedIndex;
use trawler::index::locked::LockedIndex;
use trawler::ingest::builder;
use trawler::output::json;
use trawler::parallel::queue::WorkQueue;
use trawler::query::engine::{QueryEngine, QueryResults, ThreadedQueryEngine};

/// Builds an inverted index over a file tree or a bounded web crawl,
/// then answers ranked search queries against it.
#[derive(Debug, Parser)]
#[command(name = "trawler")]
struct Args {
    /// Index text files under this path
    #[arg(long)]
    path: Option<PathBuf>,

    /// Crawl from this seed URL
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of URLs to crawl
    #[arg(long, num_args = 0..=1, default_missing_value = "50")]
    limit: Option<String>,

    /// Build and query on N worker threads
    #[arg(long, num_args = 0..=1, default_missing_value = "5")]
    threads: Option<String>,

    /// Write the index as JSON to this file
    #[arg(long, num_args = 0..=1, default_missing_value = "index.json")]
    index: Option<PathBuf>,

    /// Write per-location word counts as JSON to this file
    #[arg(long, num_args = 0..=1, default_missing_value = "counts.json")]
    counts: Option<PathBuf>,

    /// Read search queries from this file
    #[arg(long)]
    query: Option<PathBuf>,

    /// Exact matching instead of prefix matching
    #[arg(long)]
    exact: bool,

    /// Write query results as JSON to this file
    #[arg(long, num_args = 0..=1, default_missing_value = "results.json")]
    results: Option<PathBuf>,

    /// Log level filter
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = setup_logger(args.log_level) {
        eprintln!("could not install logger: {}", err);
    }
    // Soft failures are logged and skipped; the exit code stays 0.
    run(args);
}

fn setup_logger(level: LevelFilter) -> Result<(), fern::InitError> {
    use fern::colors::{Color, ColoredLevelConfig};

    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::BrightRed)
        .debug(Color::Magenta)
        .trace(Color::Cyan);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} | {:<5} | {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                colors.color(record.level()),
                message,
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

/// Numeric flags fall back to their defaults instead of failing the run.
fn lenient_parse(raw: &str, default: usize, flag: &str) -> usize {
    raw.parse().unwrap_or_else(|_| {
        warn!(
            "invalid value {:?} for --{}; using default {}",
            raw, flag, default
        );
        default
    })
}

fn run(args: Args) {
    let workers = args
        .threads
        .as_deref()
        .map(|raw| lenient_parse(raw, Config::default().workers, "threads").max(1));
    let config = Config {
        workers: workers.unwrap_or(Config::default().workers),
        crawl_limit: args
            .limit
            .as_deref()
            .map(|raw| lenient_parse(raw, Config::default().crawl_limit, "limit"))
            .unwrap_or(Config::default().crawl_limit)
            .max(1),
        redirects: Config::default().redirects,
    };

    // Crawling always runs on the queue; --threads opts the file build
    // and the query phase into it as well.
    if args.url.is_some() || workers.is_some() {
        run_threaded(&args, &config);
    } else {
        run_sequential(&args);
    }
}

fn run_sequential(args: &Args) {
    let mut index = InvertedIndex::new();

    if let Some(root) = &args.path {
        if let Err(err) = builder::build(root, &mut index) {
            error!("could not index {}: {}", root.display(), err);
        }
    } else {
        info!("no --path or --url given; nothing to index");
    }

    write_index_artifacts(&index, args);

    if let Some(queries) = &args.query {
        let mut engine = QueryEngine::new(&index, args.exact);
        if let Err(err) = engine.parse_queries(queries) {
            error!("could not process queries {}: {}", queries.display(), err);
        }
        write_results_artifact(&engine.into_results(), args);
    } else if args.results.is_some() {
        info!("no --query given; skipping results output");
    }
}

fn run_threaded(args: &Args, config: &Config) {
    let queue = Arc::new(WorkQueue::new(config.workers));
    let index = Arc::new(LockedIndex::new());

    if let Some(seed) = &args.url {
        match WebCrawler::new(Arc::clone(&index), Arc::clone(&queue), config) {
            Ok(crawler) => {
                if let Err(err) = crawler.crawl(seed) {
                    error!("could not crawl {}: {}", seed, err);
                }
            }
            Err(err) => error!("could not start crawler: {}", err),
        }
    }
    if let Some(root) = &args.path {
        if let Err(err) = builder::build_parallel(root, &index, &queue) {
            error!("could not index {}: {}", root.display(), err);
        }
    }
    if args.url.is_none() && args.path.is_none() {
        info!("no --path or --url given; nothing to index");
    }

    {
        let snapshot = index.read();
        write_index_artifacts(&snapshot, args);
    }

    if let Some(queries) = &args.query {
        let engine = ThreadedQueryEngine::new(Arc::clone(&index), Arc::clone(&queue), args.exact);
        if let Err(err) = engine.parse_queries(queries) {
            error!("could not process queries {}: {}", queries.display(), err);
        }
        write_results_artifact(&engine.results(), args);
    } else if args.results.is_some() {
        info!("no --query given; skipping results output");
    }

    queue.shutdown();
}

fn write_index_artifacts(index: &InvertedIndex, args: &Args) {
    if let Some(path) = &args.index {
        match json::write_index(index, path) {
            Ok(()) => info!("wrote {} word(s) to {}", index.len(), path.display()),
            Err(err) => error!("could not write {}: {}", path.display(), err),
        }
    }
    if let Some(path) = &args.counts {
        match json::write_counts(index, path) {
            Ok(()) => info!("wrote {} count(s) to {}", index.counts().len(), path.display()),
            Err(err) => error!("could not write {}: {}", path.display(), err),
        }
    }
}

fn write_results_artifact(results: &QueryResults, args: &Args) {
    if let Some(path) = &args.results {
        match json::write_results(results, path) {
            Ok(()) => info!("wrote {} result list(s) to {}", results.len(), path.display()),
            Err(err) => error!("could not write {}: {}", path.display(), err),
        }
    }
}
