use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use crate::config::Config;
use crate::run::Run;

/// Read one line terminated by `endl` or by the end of input, without the terminator.
///
/// Returns None at the end of input. A terminator at the very end of input does not start
/// another line.
pub(crate) fn read_line<R: BufRead>(reader: &mut R, endl: u8, path: &Path) -> Result<Option<String>, anyhow::Error> {
    let mut buf = Vec::new();
    let bytes = reader.read_until(endl, &mut buf)
        .with_context(|| format!("path: {}", path.to_string_lossy()))?;
    if bytes == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&endl) {
        buf.pop();
    }
    let line = String::from_utf8(buf)
        .with_context(|| format!("invalid UTF-8, path: {}", path.to_string_lossy()))?;
    Ok(Some(line))
}

/// Reads back the lines of a closed [Run], exactly as many as were written.
#[derive(Debug)]
pub(crate) struct RunReader {
    path: PathBuf,
    reader: BufReader<File>,
    endl: u8,
    remaining: usize,
}

impl RunReader {
    pub(crate) fn open(run: &Run, config: &Config) -> Result<RunReader, anyhow::Error> {
        let path = run.path(config);
        let file = File::open(&path).with_context(|| format!("path: {}", path.to_string_lossy()))?;
        Ok(
            RunReader {
                path,
                reader: BufReader::new(file),
                endl: config.endl() as u8,
                remaining: run.rows(),
            }
        )
    }

    pub(crate) fn next_line(&mut self) -> Result<Option<String>, anyhow::Error> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let line = match read_line(&mut self.reader, self.endl, &self.path)? {
            Some(line) => line,
            // only the last line of a run may be empty and leave nothing after the final terminator
            None if self.remaining == 1 => String::new(),
            None => {
                return Err(
                    anyhow!(
                        "Run file ended with {} rows missing, path: {}",
                        self.remaining,
                        self.path.to_string_lossy()
                    )
                );
            }
        };
        self.remaining -= 1;
        Ok(Some(line))
    }

    pub(crate) fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::BufReader;
    use std::path::PathBuf;

    use crate::config::tests::test_config;
    use crate::run::Run;
    use crate::run_reader::{read_line, RunReader};
    use crate::run_writer::RunWriter;

    fn read_all(reader: &mut RunReader) -> Result<Vec<String>, anyhow::Error> {
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line()? {
            lines.push(line);
        }
        Ok(lines)
    }

    #[test]
    fn test_read_line_strips_terminator() -> Result<(), anyhow::Error> {
        let path = PathBuf::from("memory");
        let mut reader = BufReader::new("a,b\n\nc\n".as_bytes());
        assert_eq!(read_line(&mut reader, b'\n', &path)?, Some("a,b".to_string()));
        assert_eq!(read_line(&mut reader, b'\n', &path)?, Some("".to_string()));
        assert_eq!(read_line(&mut reader, b'\n', &path)?, Some("c".to_string()));
        assert_eq!(read_line(&mut reader, b'\n', &path)?, None);
        Ok(())
    }

    #[test]
    fn test_empty_last_line_survives() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let config = test_config(tmp.path(), 100, 100);
        let mut writer = RunWriter::create(1, &config)?;
        writer.write_line("x")?;
        writer.write_line("")?;
        let run = writer.finish()?;

        let mut reader = RunReader::open(&run, &config)?;
        assert_eq!(read_all(&mut reader)?, vec!["x".to_string(), "".to_string()]);
        Ok(())
    }

    #[test]
    fn test_single_empty_row() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let config = test_config(tmp.path(), 100, 100);
        let mut writer = RunWriter::create(1, &config)?;
        writer.write_line("")?;
        let run = writer.finish()?;
        assert_eq!(fs::metadata(run.path(&config))?.len(), 0);

        let mut reader = RunReader::open(&run, &config)?;
        assert_eq!(read_all(&mut reader)?, vec!["".to_string()]);
        Ok(())
    }

    #[test]
    fn test_truncated_run() -> Result<(), anyhow::Error> {
        let tmp = tempfile::tempdir()?;
        let config = test_config(tmp.path(), 100, 100);
        fs::write(config.run_path(1), "a")?;
        let mut reader = RunReader::open(&Run::new(1, 3), &config)?;
        assert_eq!(reader.next_line()?, Some("a".to_string()));
        assert!(reader.next_line().is_err());
        Ok(())
    }
}
