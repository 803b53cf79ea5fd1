use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context};
use clap::Parser;
use log::LevelFilter;
use regex::Regex;
use simple_logger::SimpleLogger;

use csv_external_sort::generator::LogGenerator;
use csv_external_sort::sort::Sort;
use csv_external_sort::sort_key::SortKey;

const USAGE: &str = "external-sort-csv [OPTIONS] <INPUT_FILE> <MEM_SIZE_BYTES>
       external-sort-csv [OPTIONS] <INPUT_FILE> <OUTPUT_FILE> <MEM_SIZE_BYTES>";

#[derive(Parser, Debug)]
#[command(
    name = "external-sort-csv",
    version,
    about = "Generate a page view log, or sort a CSV file larger than memory",
    override_usage = USAGE
)]
struct Cli {
    /// With two values, INPUT_FILE MEM_SIZE_BYTES, generate a log of at least MEM_SIZE_BYTES
    /// bytes at INPUT_FILE. With three, INPUT_FILE OUTPUT_FILE MEM_SIZE_BYTES, sort INPUT_FILE
    /// into OUTPUT_FILE holding about MEM_SIZE_BYTES of lines in memory; a missing INPUT_FILE
    /// is generated first.
    #[arg(value_name = "ARGS", required = true, num_args = 2..=3)]
    args: Vec<String>,

    /// Key columns counting from 0, in order of precedence
    #[arg(short, long, default_value = "2,1")]
    key: String,

    /// Maximum number of runs merged at once
    #[arg(long, default_value_t = 100)]
    max_fanin: u64,

    /// Directory for run files
    #[arg(long, default_value = ".")]
    tmp_dir: PathBuf,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Drop blank lines from the output
    #[arg(long)]
    ignore_empty: bool,

    /// Drop lines matching this regular expression from the output
    #[arg(long, value_name = "REGEX")]
    ignore_lines: Option<String>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn parse_mem_size(value: &str) -> Result<u64, anyhow::Error> {
    u64::from_str(value.trim()).with_context(|| format!("MEM_SIZE_BYTES must be a number of bytes, got '{}'", value))
}

fn generate(input: &Path, mem_size: u64) -> Result<(), anyhow::Error> {
    LogGenerator::new(mem_size)
        .generate(input)
        .with_context(|| format!("generate {}", input.to_string_lossy()))?;
    Ok(())
}

fn sort(cli: &Cli, input: PathBuf, output: PathBuf, mem_size: u64) -> Result<(), anyhow::Error> {
    if File::open(&input).is_err() {
        log::warn!("Input {} is not readable, generating it", input.to_string_lossy());
        generate(&input, mem_size)?;
    }

    let mut sort = Sort::new(input, output);
    sort.with_key(SortKey::from_str(&cli.key)?);
    sort.with_memory_budget(mem_size);
    sort.with_max_fanin(cli.max_fanin);
    sort.with_tmp_dir(cli.tmp_dir.clone());
    sort.with_field_separator(cli.delimiter);
    if cli.ignore_empty {
        sort.with_ignore_empty();
    }
    if let Some(pattern) = &cli.ignore_lines {
        sort.with_ignore_lines(Regex::new(pattern)?);
    }
    sort.sort()?;
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    SimpleLogger::new().with_level(cli.log_level).init()?;

    match cli.args.as_slice() {
        [input, mem_size] => {
            generate(&PathBuf::from(input), parse_mem_size(mem_size)?)
        }
        [input, output, mem_size] => {
            let mem_size = parse_mem_size(mem_size)?;
            sort(&cli, PathBuf::from(input), PathBuf::from(output), mem_size)
        }
        _ => {
            Err(anyhow!("Usage: {}", USAGE))
        }
    }
}
