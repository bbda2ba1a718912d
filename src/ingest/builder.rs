use log::warn;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::analysis::normalizer::TextNormalizer;
use crate::core::error::Result;
use crate::index::inverted::InvertedIndex;
use crate::index::locked::LockedIndex;
use crate::ingest::walker;
use crate::parallel::queue::WorkQueue;

/// Indexes one UTF-8 file into `index`, line by line, positions counting
/// up from 1 across the whole file.
pub fn add_file(path: &Path, index: &mut InvertedIndex) -> Result<()> {
    let location = path.display().to_string();
    let reader = BufReader::new(File::open(path)?);
    let normalizer = TextNormalizer::new();

    let mut position = 0u32;
    for line in reader.lines() {
        let line = line?;
        for stem in normalizer.stems(&line) {
            position += 1;
            index.add(stem, &location, position);
        }
    }
    Ok(())
}

/// Sequential build: walks `root` and indexes every text file in turn.
/// A file that fails to read is logged and skipped.
pub fn build(root: &Path, index: &mut InvertedIndex) -> Result<()> {
    for file in walker::walk(root)? {
        if let Err(err) = add_file(&file, index) {
            warn!("skipping {}: {}", file.display(), err);
        }
    }
    Ok(())
}

/// Parallel build: one task per file, each indexing into a fresh local
/// index before a single merge into the shared one. Local building keeps
/// tasks off the write lock until the file is fully tokenized, so the
/// lock is held once per file rather than once per token. Blocks until
/// the whole wavefront has merged.
pub fn build_parallel(root: &Path, index: &Arc<LockedIndex>, queue: &WorkQueue) -> Result<()> {
    for file in walker::walk(root)? {
        let index = Arc::clone(index);
        queue.execute(move || {
            let mut local = InvertedIndex::new();
            match add_file(&file, &mut local) {
                Ok(()) => index.merge(local),
                Err(err) => warn!("skipping {}: {}", file.display(), err),
            }
        });
    }
    queue.finish();
    Ok(())
}
