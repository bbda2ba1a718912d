use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::error::Result;
use crate::index::inverted::InvertedIndex;
use crate::query::engine::QueryResults;

/// Writes the word -> location -> positions map.
pub fn write_index(index: &InvertedIndex, path: &Path) -> Result<()> {
    write_pretty(index.entries(), path)
}

/// Writes the location -> word-count table.
pub fn write_counts(index: &InvertedIndex, path: &Path) -> Result<()> {
    write_pretty(index.counts(), path)
}

/// Writes the canonical-query -> ranked-results map.
pub fn write_results(results: &QueryResults, path: &Path) -> Result<()> {
    write_pretty(results, path)
}

/// Tab-indented pretty JSON, LF newlines, trailing newline. Map keys
/// arrive from ordered maps, so enumeration order is the serialized
/// order.
fn write_pretty<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    {
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut serializer = Serializer::with_formatter(&mut writer, formatter);
        value.serialize(&mut serializer)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
