//! Synthetic page view logs for exercising the sort.
//!
//! Each line is `timestamp,page_id,customer_id`: seconds since the epoch within the current
//! UTC day, a 16 letter page id and a UUID v4 customer id. Page and customer ids are drawn
//! from fixed pools so that customers revisit pages.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context};
use data_encoding::HEXLOWER;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SECONDS_PER_DAY: u64 = 86_400;
const PAGE_ID_LEN: usize = 16;

/// Generate a log file of at least a given size.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use csv_external_sort::generator::LogGenerator;
///
/// fn generate(path: PathBuf) -> Result<u64, anyhow::Error> {
///     LogGenerator::new(1_048_576)
///         .with_customers(100)
///         .with_seed(7)
///         .generate(&path)
/// }
/// ```
#[derive(Clone, Debug)]
pub struct LogGenerator {
    size_bytes: u64,
    pages: usize,
    customers: usize,
    seed: Option<u64>,
}

impl LogGenerator {
    /// Create a generator for a log of at least `size_bytes` bytes, with 2000 pages and
    /// 500 customers
    pub fn new(size_bytes: u64) -> LogGenerator {
        LogGenerator {
            size_bytes,
            pages: 2000,
            customers: 500,
            seed: None,
        }
    }

    /// Set the number of distinct page ids
    pub fn with_pages(mut self, pages: usize) -> LogGenerator {
        self.pages = pages;
        self
    }

    /// Set the number of distinct customer ids
    pub fn with_customers(mut self, customers: usize) -> LogGenerator {
        self.customers = customers;
        self
    }

    /// Use a fixed seed, making the output reproducible within a day
    pub fn with_seed(mut self, seed: u64) -> LogGenerator {
        self.seed = Some(seed);
        self
    }

    /// Write the log to `path`, replacing any existing file. Returns the number of bytes written.
    pub fn generate(&self, path: &Path) -> Result<u64, anyhow::Error> {
        if self.pages == 0 || self.customers == 0 {
            return Err(anyhow!("Page and customer pools must not be empty"));
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .with_context(|| "system clock is before the epoch")?
            .as_secs();
        let day_start = now - now % SECONDS_PER_DAY;

        let page_ids: Vec<String> = (0..self.pages).map(|_| random_page_id(&mut rng)).collect();
        let customer_ids: Vec<String> = (0..self.customers).map(|_| uuid_v4(&mut rng)).collect();

        let file = File::create(path)
            .with_context(|| format!("path: {}", path.to_string_lossy()))?;
        let mut writer = BufWriter::new(file);
        let mut written: u64 = 0;
        let mut lines: u64 = 0;
        while written < self.size_bytes {
            let timestamp = day_start + rng.gen_range(0..=SECONDS_PER_DAY);
            let page_id = &page_ids[rng.gen_range(0..page_ids.len())];
            let customer_id = &customer_ids[rng.gen_range(0..customer_ids.len())];
            let line = format!("{},{},{}\n", timestamp, page_id, customer_id);
            writer.write_all(line.as_bytes())
                .with_context(|| format!("path: {}", path.to_string_lossy()))?;
            written += line.len() as u64;
            lines += 1;
        }
        writer.flush()
            .with_context(|| format!("path: {}", path.to_string_lossy()))?;
        log::info!("Generated {} with {} lines, {} bytes", path.to_string_lossy(), lines, written);
        Ok(written)
    }
}

fn random_page_id<R: Rng>(rng: &mut R) -> String {
    (0..PAGE_ID_LEN)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Random version 4 UUID in its hyphenated lowercase form
fn uuid_v4<R: Rng>(rng: &mut R) -> String {
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex = HEXLOWER.encode(&bytes);
    format!("{}-{}-{}-{}-{}", &hex[0..8], &hex[8..12], &hex[12..16], &hex[16..20], &hex[20..32])
}
