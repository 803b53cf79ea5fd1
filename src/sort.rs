use std::cmp::{max, Ordering};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use regex::Regex;
use rlimit::{getrlimit, Resource, setrlimit};

use crate::config::Config;
use crate::row::Row;
use crate::run_generator::RunGenerator;
use crate::run_reader::read_line;
use crate::scheduler::Scheduler;
use crate::sort_key::SortKey;

/// Open files needed on top of the merge fan-in: the merge output, stdio and whatever the
/// embedding process holds.
const FILE_HEADROOM: u64 = 256;

/// What a completed sort did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSummary {
    rows: usize,
    runs: u64,
    passes: usize,
    elapsed: Duration,
}

impl SortSummary {
    /// Number of rows written to the output
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of sorted runs produced from the input
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Number of merge passes, zero when the input produced at most one run
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Sort a delimited text file that does not fit in memory
///
/// The input is read once in chunks bounded by the memory budget. Each chunk is sorted in
/// memory and written to a run file `run_<id>.csv` in the temporary directory. Runs are then
/// merged in passes, at most `max_fanin` at a time, until one run is left, which is renamed
/// to the output.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use csv_external_sort::sort::Sort;
/// use csv_external_sort::sort_key::SortKey;
///
/// fn sort_log(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
///     let mut sort = Sort::new(input, output);
///     // order by the third column, then by the second
///     sort.with_key(SortKey::new(vec![2, 1]));
///     // buffer about 64 MB of input lines before writing a run
///     sort.with_memory_budget(64_000_000);
///     // the directory for run files. The default is the current directory
///     sort.with_tmp_dir(tmp);
///     let summary = sort.sort()?;
///     log::info!("sorted {} rows", summary.rows());
///     Ok(())
/// }
/// ```
pub struct Sort {
    input: PathBuf,
    output: PathBuf,
    tmp: PathBuf,
    field_separator: char,
    endl: char,
    ignore_empty: bool,
    ignore_lines: Option<Regex>,
    memory_budget: u64,
    max_fanin: u64,
    key: SortKey,
}

impl Sort {
    /// Create a default Sort definition.
    ///
    /// * run files are written to the current directory
    /// * the field separator is a comma
    /// * the key is column 2, then column 1, counting from 0
    /// * the memory budget is 10 MB of input lines
    /// * at most 100 runs are merged at a time
    /// * no lines are ignored
    /// * lines end with '\n'
    pub fn new(input: PathBuf, output: PathBuf) -> Sort {
        Sort {
            input,
            output,
            tmp: PathBuf::from("."),
            field_separator: ',',
            endl: '\n',
            ignore_empty: false,
            ignore_lines: None,
            memory_budget: 10_000_000,
            max_fanin: 100,
            key: SortKey::default(),
        }
    }

    /// Set the directory for run files. The default is the current directory. Run files are
    /// named `run_<id>.csv` and an existing file with such a name fails the sort.
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = tmp;
    }

    /// Set the field separator. The default is ','
    pub fn with_field_separator(&mut self, field_separator: char) {
        self.field_separator = field_separator
    }

    /// Set line ending char - not supporting CRLF
    pub fn with_endl(&mut self, endl: char) {
        self.endl = endl
    }

    /// Set the number of bytes of input lines buffered before a run is written. The budget is
    /// approximate: a single line larger than the budget still forms a run of its own.
    pub fn with_memory_budget(&mut self, memory_budget: u64) {
        self.memory_budget = memory_budget;
    }

    /// Set the maximum number of runs merged at once. The default is 100.
    pub fn with_max_fanin(&mut self, max_fanin: u64) {
        self.max_fanin = max_fanin;
    }

    /// Set the sort key
    pub fn with_key(&mut self, key: SortKey) {
        self.key = key;
    }

    /// Direct the algorithm to ignore empty lines. The default is false
    pub fn with_ignore_empty(&mut self) {
        self.ignore_empty = true;
    }

    /// Specify which lines to ignore. Each line matching the regex will be ignored and will not
    /// appear in the output.
    pub fn with_ignore_lines(&mut self, r: Regex) {
        self.ignore_lines = Some(r)
    }

    /// Sort the input file into the output file
    ///
    /// The output separates rows with the line ending and has none after the last row. When
    /// the last sorted row is empty the output therefore ends with a line ending, which a
    /// later read takes as the end of the file, so that row does not survive a re-sort. Use
    /// [Sort::with_ignore_empty] to drop empty rows up front.
    pub fn sort(&self) -> Result<SortSummary, anyhow::Error> {
        let config = self.create_config()?;
        let (current_soft, current_hard) = Self::get_rlimits()?;
        let needed = config.max_fanin().saturating_add(FILE_HEADROOM);
        if current_hard < config.max_fanin().saturating_add(16) {
            return Err(
                anyhow!(
                    "Merging {} runs at once needs more open files than the hard limit of {}",
                    config.max_fanin(),
                    current_hard
                )
            );
        }
        let new_soft = max(needed, current_soft).min(current_hard);
        log::info!("Current rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
        if new_soft != current_soft {
            log::info!("Set new rlimit NOFILE, soft: {}, hard: {}", new_soft, current_hard);
            Self::set_rlimits(new_soft, current_hard)?;
        }

        let result = self.internal_sort(&config);

        if new_soft != current_soft {
            log::info!("Restore rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
            return Self::after_restore(result, Self::set_rlimits(current_soft, current_hard));
        }
        result
    }

    fn internal_sort(&self, config: &Config) -> Result<SortSummary, anyhow::Error> {
        let started = Instant::now();
        log::info!(
            "Start sort of {}, key: {}, memory budget: {} bytes, max fan-in: {}",
            self.input.to_string_lossy(),
            config.key(),
            config.memory_budget(),
            config.max_fanin()
        );
        let runs = RunGenerator::new(config).generate(&self.input)?;
        let run_count = runs.len();
        log::info!("Run generation finished in {:?}", started.elapsed());

        let cascade = Scheduler::new(config).merge_all(runs, &self.output)?;
        let summary = SortSummary {
            rows: cascade.rows,
            runs: run_count,
            passes: cascade.passes,
            elapsed: started.elapsed(),
        };
        log::info!(
            "Finish sort of {} rows into {}, runs: {}, passes: {}, took {:?}",
            summary.rows,
            self.output.to_string_lossy(),
            summary.runs,
            summary.passes,
            summary.elapsed
        );
        Ok(summary)
    }

    /// Check whether the input file is already sorted by the key
    pub fn check(&self) -> Result<bool, anyhow::Error> {
        let config = self.create_config()?;
        let file = File::open(&self.input)
            .with_context(|| format!("path: {}", self.input.to_string_lossy()))?;
        let mut reader = BufReader::new(file);
        let mut previous: Option<Row> = None;
        let mut n: usize = 0;
        while let Some(line) = read_line(&mut reader, config.endl() as u8, &self.input)? {
            n += 1;
            if config.skip_line(&line) {
                continue;
            }
            let current = Row::new(&line, config.field_separator());
            if let Some(previous) = &previous {
                if config.key().compare(previous, &current) == Ordering::Greater {
                    log::info!("{} is not sorted at line {}", self.input.to_string_lossy(), n);
                    return Ok(false);
                }
            }
            previous = Some(current);
        }
        Ok(true)
    }

    /// A failed restore fails a successful sort but never hides the error of a failed one
    fn after_restore(result: Result<SortSummary, anyhow::Error>, restored: Result<(), anyhow::Error>) -> Result<SortSummary, anyhow::Error> {
        match (result, restored) {
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Err(restore_error)) => {
                log::error!("Failed to restore rlimit NOFILE after a failed sort: {:#}", restore_error);
                Err(e)
            }
            (result, Ok(())) => result,
        }
    }

    fn get_rlimits() -> Result<(u64, u64), anyhow::Error> {
        getrlimit(Resource::NOFILE).with_context(|| "getrlimit")
    }

    fn set_rlimits(soft: u64, hard: u64) -> Result<(), anyhow::Error> {
        setrlimit(Resource::NOFILE, soft, hard)
            .with_context(|| format!("set rlimit NOFILE, soft: {}, hard: {}", soft, hard))?;
        Ok(())
    }

    fn create_config(&self) -> Result<Config, anyhow::Error> {
        if self.key.is_empty() {
            return Err(anyhow!("The sort key must name at least one column"));
        }
        if self.memory_budget == 0 {
            return Err(anyhow!("The memory budget must be at least 1 byte"));
        }
        if self.max_fanin < 2 {
            return Err(anyhow!("The merge fan-in must be at least 2, got {}", self.max_fanin));
        }
        if !self.endl.is_ascii() {
            return Err(anyhow!("The line ending must be an ASCII character"));
        }
        if self.field_separator == self.endl {
            return Err(anyhow!("The field separator and the line ending must differ"));
        }

        Ok(
            Config::new(
                self.tmp.clone(),
                "run_".to_string(),
                ".csv".to_string(),
                self.field_separator,
                self.endl,
                self.ignore_empty,
                self.ignore_lines.clone(),
                self.memory_budget,
                self.max_fanin,
                self.key.clone(),
            )
        )
    }
}
