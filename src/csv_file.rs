//! Whole-file reading and writing of comma separated rows, for data that fits in memory.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::row::Row;
use crate::run_reader::read_line;

/// Read every line of `path` as a [Row]
pub fn read_csv(path: &Path) -> Result<Vec<Row>, anyhow::Error> {
    let file = File::open(path).with_context(|| format!("path: {}", path.to_string_lossy()))?;
    let mut reader = BufReader::new(file);
    let mut rows = Vec::new();
    while let Some(line) = read_line(&mut reader, b'\n', path)? {
        rows.push(Row::new(&line, ','));
    }
    Ok(rows)
}

/// Write `rows` to `path`, one terminated line per row, replacing any existing file
pub fn write_csv(path: &Path, rows: &[Row]) -> Result<(), anyhow::Error> {
    let file = File::create(path).with_context(|| format!("path: {}", path.to_string_lossy()))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        writeln!(writer, "{}", row.line(','))
            .with_context(|| format!("path: {}", path.to_string_lossy()))?;
    }
    writer.flush().with_context(|| format!("path: {}", path.to_string_lossy()))?;
    Ok(())
}
