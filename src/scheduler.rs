use std::fs::File;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Context};

use crate::config::Config;
use crate::merger::Merger;
use crate::run::{Run, RunSet};

/// Split the live run ids `start..=end` into the merge groups of one pass.
///
/// The group size follows from the fewest groups of at most `max_fanin` runs, and runs are
/// spread over the groups so that group sizes differ by at most one. A range of at most
/// `max_fanin` runs is a single group.
pub(crate) fn plan_pass(start: u64, end: u64, max_fanin: u64) -> Vec<RangeInclusive<u64>> {
    if end < start {
        return Vec::new();
    }
    let total = end - start + 1;
    let passes = total.div_ceil(max_fanin);
    let distance = max_fanin.min(total.div_ceil(passes));
    let groups = total.div_ceil(distance);
    let base = total / groups;
    let larger = total % groups;

    let mut plan = Vec::with_capacity(groups as usize);
    let mut first = start;
    for group in 0..groups {
        let size = if group < larger { base + 1 } else { base };
        plan.push(first..=first + size - 1);
        first += size;
    }
    plan
}

/// Outcome of merging all runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cascade {
    pub(crate) passes: usize,
    pub(crate) rows: usize,
}

/// Drives merge passes over the runs until one is left, then moves it to the output.
pub(crate) struct Scheduler<'a> {
    config: &'a Config,
}

impl<'a> Scheduler<'a> {
    pub(crate) fn new(config: &'a Config) -> Scheduler<'a> {
        Scheduler {
            config
        }
    }

    pub(crate) fn merge_all(&self, mut runs: RunSet, output: &Path) -> Result<Cascade, anyhow::Error> {
        if runs.is_empty() {
            File::create(output)
                .with_context(|| format!("path: {}", output.to_string_lossy()))?;
            log::info!("No runs to merge, created empty output {}", output.to_string_lossy());
            return Ok(Cascade { passes: 0, rows: 0 });
        }

        log::info!("Merging {} runs into {}", runs.len(), output.to_string_lossy());
        let merger = Merger::new(self.config);
        let mut start = 1;
        let mut end = runs.len();
        let mut passes = 0;
        while start < end {
            let pass_start = Instant::now();
            passes += 1;
            let plan = plan_pass(start, end, self.config.max_fanin());
            log::info!("Pass {}: merging runs {}..={} in {} groups", passes, start, end, plan.len());
            for group in plan {
                let location = runs.next_id();
                let merged = self.merge_group(&merger, &runs, group, location)?;
                runs.push(merged);
            }
            start = end + 1;
            end = runs.len();
            log::info!("Pass {} finished in {:?}", passes, pass_start.elapsed());
        }

        let last = runs.get(end).ok_or_else(|| anyhow!("run {} is missing", end))?;
        let path = last.path(self.config);
        std::fs::rename(&path, output)
            .with_context(|| anyhow!("Rename {} to {}", path.to_string_lossy(), output.to_string_lossy()))?;
        log::info!("Renamed run {} to {}", end, output.to_string_lossy());
        Ok(Cascade { passes, rows: last.rows() })
    }

    /// Merge one group into run `location` and delete the consumed runs
    fn merge_group(&self, merger: &Merger, runs: &RunSet, group: RangeInclusive<u64>, location: u64) -> Result<Run, anyhow::Error> {
        let sources = group
            .map(|id| runs.get(id).copied().ok_or_else(|| anyhow!("run {} is missing", id)))
            .collect::<Result<Vec<Run>, anyhow::Error>>()?;

        if let [single] = sources.as_slice() {
            let from = single.path(self.config);
            let to = self.config.run_path(location);
            std::fs::rename(&from, &to)
                .with_context(|| anyhow!("Rename {} to {}", from.to_string_lossy(), to.to_string_lossy()))?;
            log::debug!("Moved run {} to run {}", single.id(), location);
            return Ok(Run::new(location, single.rows()));
        }

        let merged = merger.merge(&sources, location)?;

        for run in &sources {
            let path = run.path(self.config);
            std::fs::remove_file(&path)
                .with_context(|| format!("remove merged run, path: {}", path.to_string_lossy()))?;
        }
        Ok(merged)
    }
}
