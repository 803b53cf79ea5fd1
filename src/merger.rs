use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::Config;
use crate::row::Row;
use crate::run::Run;
use crate::run_reader::RunReader;
use crate::run_writer::RunWriter;
use crate::sort_key::SortKey;

/// The next unread row of one source run.
///
/// The row is parsed once when it is read and compared through the shared [SortKey].
struct HeapNode<'a> {
    row: Row,
    source: usize,
    key: &'a SortKey,
}

impl Eq for HeapNode<'_> {}

impl PartialEq<Self> for HeapNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd<Self> for HeapNode<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapNode<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // flipped so that BinaryHeap (a max heap) pops the smallest row first
        self.key.compare(&other.row, &self.row)
    }
}

/// Merges a bounded number of sorted runs into one sorted run.
pub(crate) struct Merger<'a> {
    config: &'a Config,
}

impl<'a> Merger<'a> {
    pub(crate) fn new(config: &'a Config) -> Merger<'a> {
        Merger {
            config
        }
    }

    /// Merge `sources` into a new run with id `location`.
    ///
    /// Holds one open reader and one heap node per source. Ties between sources are broken
    /// by heap order.
    pub(crate) fn merge(&self, sources: &[Run], location: u64) -> Result<Run, anyhow::Error> {
        let key = self.config.key();
        let separator = self.config.field_separator();
        log::debug!(
            "Merging runs {:?} into run {}",
            sources.iter().map(|run| run.id()).collect::<Vec<u64>>(),
            location
        );

        let mut readers: Vec<Option<RunReader>> = Vec::with_capacity(sources.len());
        for run in sources {
            readers.push(Some(RunReader::open(run, self.config)?));
        }
        let mut writer = RunWriter::create(location, self.config)?;

        let mut heap: BinaryHeap<HeapNode> = BinaryHeap::with_capacity(sources.len());
        for source in 0..readers.len() {
            if let Some(row) = Self::next_row(&mut readers[source], separator)? {
                heap.push(HeapNode { row, source, key });
            }
        }

        while let Some(node) = heap.pop() {
            writer.write_line(&node.row.line(separator))?;
            if let Some(row) = Self::next_row(&mut readers[node.source], separator)? {
                heap.push(HeapNode { row, source: node.source, key });
            }
        }

        let merged = writer.finish()?;
        log::debug!("Merged {} rows into run {}", merged.rows(), location);
        Ok(merged)
    }

    /// Read and parse the next row of a source, closing the source once it is exhausted
    fn next_row(reader: &mut Option<RunReader>, separator: char) -> Result<Option<Row>, anyhow::Error> {
        let line = match reader {
            Some(r) => r.next_line()?,
            None => None,
        };
        match line {
            Some(line) => Ok(Some(Row::new(&line, separator))),
            None => {
                if let Some(r) = reader.take() {
                    log::trace!("Closed exhausted run {}", r.path().to_string_lossy());
                }
                Ok(None)
            }
        }
    }
}
