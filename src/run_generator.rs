use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::row::Row;
use crate::run::{Run, RunSet};
use crate::run_reader::read_line;
use crate::run_writer::RunWriter;

/// Splits the input into memory bounded chunks and writes each one as a sorted run.
pub(crate) struct RunGenerator<'a> {
    config: &'a Config,
}

impl<'a> RunGenerator<'a> {
    pub(crate) fn new(config: &'a Config) -> RunGenerator<'a> {
        RunGenerator {
            config
        }
    }

    /// Read `input` once and write runs `1..=R`.
    pub(crate) fn generate(&self, input: &Path) -> Result<RunSet, anyhow::Error> {
        let file = File::open(input)
            .with_context(|| format!("input unavailable, path: {}", input.to_string_lossy()))?;
        self.generate_from(BufReader::new(file), input)
    }

    pub(crate) fn generate_from<R: BufRead>(&self, mut reader: R, input: &Path) -> Result<RunSet, anyhow::Error> {
        let budget = self.config.memory_budget();
        let endl = self.config.endl() as u8;
        let mut runs = RunSet::new();
        let mut rows: Vec<Row> = Vec::new();
        let mut buffered: u64 = 0;
        let mut skipped: usize = 0;

        while let Some(line) = read_line(&mut reader, endl, input)? {
            if self.config.skip_line(&line) {
                skipped += 1;
                continue;
            }
            let len = line.len() as u64;
            // a line larger than the whole budget is still admitted into an empty buffer
            if !rows.is_empty() && buffered + len >= budget {
                let run = self.write_sorted_run(&mut rows, runs.next_id())?;
                runs.push(run);
                buffered = 0;
            }
            buffered += len + 1;
            rows.push(Row::new(&line, self.config.field_separator()));
        }

        if !rows.is_empty() {
            let run = self.write_sorted_run(&mut rows, runs.next_id())?;
            runs.push(run);
        }

        if skipped > 0 {
            log::info!("Skipped {} ignored lines", skipped);
        }
        log::info!(
            "Generated {} sorted runs, {} rows, from {}",
            runs.len(),
            runs.rows(1, runs.len()),
            input.to_string_lossy()
        );
        Ok(runs)
    }

    /// Sort the buffered rows, write them to run `id` and clear the buffer
    fn write_sorted_run(&self, rows: &mut Vec<Row>, id: u64) -> Result<Run, anyhow::Error> {
        let key = self.config.key();
        rows.sort_by(|a, b| key.compare(a, b));

        let mut writer = RunWriter::create(id, self.config)?;
        for row in rows.iter() {
            writer.write_line(&row.line(self.config.field_separator()))?;
        }
        rows.clear();
        let run = writer.finish()?;
        log::debug!("Wrote sorted run {} with {} rows", run.id(), run.rows());
        Ok(run)
    }
}
