use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;

use crate::config::Config;
use crate::run::Run;

/// Writes the lines of one run.
///
/// Lines are separated by the line terminator and the last line has none. The file is
/// created exclusively, an existing run file with the same id is an error.
pub(crate) struct RunWriter {
    id: u64,
    path: PathBuf,
    writer: BufWriter<File>,
    endl: u8,
    rows: usize,
}

impl RunWriter {
    pub(crate) fn create(id: u64, config: &Config) -> Result<RunWriter, anyhow::Error> {
        let path = config.run_path(id);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("create run file, path: {}", path.to_string_lossy()))?;
        Ok(
            RunWriter {
                id,
                path,
                writer: BufWriter::new(file),
                endl: config.endl() as u8,
                rows: 0,
            }
        )
    }

    pub(crate) fn write_line(&mut self, line: &str) -> Result<(), anyhow::Error> {
        if self.rows > 0 {
            self.writer.write_all(&[self.endl])
                .with_context(|| format!("path: {}", self.path.to_string_lossy()))?;
        }
        self.writer.write_all(line.as_bytes())
            .with_context(|| format!("path: {}", self.path.to_string_lossy()))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and close the run file
    pub(crate) fn finish(mut self) -> Result<Run, anyhow::Error> {
        self.writer.flush()
            .with_context(|| format!("path: {}", self.path.to_string_lossy()))?;
        log::debug!("Closed run {}, {} rows", self.id, self.rows);
        Ok(Run::new(self.id, self.rows))
    }
}
