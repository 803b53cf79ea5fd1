use std::path::PathBuf;

use crate::config::Config;

/// A closed, sorted run file.
///
/// The row count is recorded when the run is written; readers rely on it because the
/// last line of a run carries no terminator and may itself be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
    id: u64,
    rows: usize,
}

impl Run {
    pub(crate) fn new(id: u64, rows: usize) -> Run {
        Run {
            id,
            rows,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn path(&self, config: &Config) -> PathBuf {
        config.run_path(self.id)
    }
}

/// Runs produced by one pipeline stage, with densely allocated ids starting at 1.
///
/// Returned by value from run generation and handed to the scheduler, which becomes the
/// only allocator of further ids.
#[derive(Debug, Default)]
pub(crate) struct RunSet {
    runs: Vec<Run>,
}

impl RunSet {
    pub(crate) fn new() -> RunSet {
        RunSet {
            runs: Vec::new()
        }
    }

    /// The id the next run must be written under
    pub(crate) fn next_id(&self) -> u64 {
        self.runs.len() as u64 + 1
    }

    pub(crate) fn push(&mut self, run: Run) {
        debug_assert_eq!(run.id(), self.next_id());
        self.runs.push(run);
    }

    pub(crate) fn get(&self, id: u64) -> Option<&Run> {
        if id == 0 {
            None
        } else {
            self.runs.get((id - 1) as usize)
        }
    }

    /// Number of runs, which is also the highest id in use
    pub(crate) fn len(&self) -> u64 {
        self.runs.len() as u64
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total rows over the runs with ids in `first..=last`
    pub(crate) fn rows(&self, first: u64, last: u64) -> usize {
        (first..=last)
            .filter_map(|id| self.get(id))
            .map(|run| run.rows())
            .sum()
    }
}
