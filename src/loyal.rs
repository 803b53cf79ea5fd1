//! Loyal customers in daily page view logs.
//!
//! Each log holds one day of `timestamp,page_id,customer_id` lines. A customer is loyal when
//! they show up on at least two different days and viewed at least two distinct pages over
//! all days. Two strategies give the same answer: [loyal_customers_in_memory] keeps
//! per-customer state for every customer, [loyal_customers_sorted] sorts each log by
//! customer with the external sort and then walks all sorted logs together, keeping the
//! state of one customer at a time.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use regex::Regex;
use tempfile::Builder;

use crate::row::Row;
use crate::run_reader::read_line;
use crate::sort::Sort;
use crate::sort_key::SortKey;
use crate::text::with_file_suffix;

const PAGE_ID: usize = 1;
const CUSTOMER_ID: usize = 2;

fn visit(row: &Row) -> Option<(&str, &str)> {
    Some((row.field(PAGE_ID)?, row.field(CUSTOMER_ID)?))
}

#[derive(Default)]
struct Visits {
    days: BTreeSet<usize>,
    pages: BTreeSet<String>,
}

impl Visits {
    fn is_loyal(&self) -> bool {
        self.days.len() >= 2 && self.pages.len() >= 2
    }
}

/// Find loyal customers by streaming each log once and keeping visits of every customer in
/// memory
pub fn loyal_customers_in_memory(logs: &[PathBuf]) -> Result<BTreeSet<String>, anyhow::Error> {
    let mut loyal = BTreeSet::new();
    let mut visits: BTreeMap<String, Visits> = BTreeMap::new();
    for (day, path) in logs.iter().enumerate() {
        let file = File::open(path).with_context(|| format!("path: {}", path.to_string_lossy()))?;
        let mut reader = BufReader::new(file);
        let mut n: usize = 0;
        while let Some(line) = read_line(&mut reader, b'\n', path)? {
            n += 1;
            let row = Row::new(&line, ',');
            let Some((page_id, customer_id)) = visit(&row) else {
                log::warn!("Skipping malformed record, path: {}, line: {}", path.to_string_lossy(), n);
                continue;
            };
            if loyal.contains(customer_id) {
                continue;
            }
            let customer = visits.entry(customer_id.to_string()).or_default();
            customer.days.insert(day);
            customer.pages.insert(page_id.to_string());
            if customer.is_loyal() {
                visits.remove(customer_id);
                loyal.insert(customer_id.to_string());
            }
        }
    }
    Ok(loyal)
}

/// Find loyal customers by sorting every log by customer id and page id, then merging the
/// sorted logs customer by customer.
///
/// Sorted copies of the logs and run files live in a scratch directory created under `tmp`
/// and removed afterwards. Records with fewer than three fields are dropped while sorting.
pub fn loyal_customers_sorted(logs: &[PathBuf], tmp: &Path, memory_budget: u64) -> Result<BTreeSet<String>, anyhow::Error> {
    let scratch = Builder::new()
        .prefix("loyal-")
        .tempdir_in(tmp)
        .with_context(|| format!("create scratch directory in {}", tmp.to_string_lossy()))?;
    // records without a customer id have no place in a customer ordering
    let incomplete = Regex::new(r"^[^,]*(,[^,]*)?$")?;

    let mut cursors = Vec::with_capacity(logs.len());
    for (day, path) in logs.iter().enumerate() {
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("not a file, path: {}", path.to_string_lossy()))?;
        let sorted_name = with_file_suffix(Path::new(file_name), "_sorted");
        let sorted_path = scratch.path().join(format!("{}-{}", day, sorted_name.to_string_lossy()));

        let mut sort = Sort::new(path.clone(), sorted_path.clone());
        sort.with_key(SortKey::new(vec![CUSTOMER_ID, PAGE_ID]));
        sort.with_memory_budget(memory_budget);
        sort.with_tmp_dir(scratch.path().to_path_buf());
        sort.with_ignore_lines(incomplete.clone());
        sort.sort()?;

        cursors.push(DayCursor::open(sorted_path)?);
    }

    let mut loyal = BTreeSet::new();
    loop {
        let customer_id = cursors
            .iter()
            .filter_map(|cursor| cursor.head.as_ref().map(|(_, customer_id)| customer_id))
            .min()
            .cloned();
        let Some(customer_id) = customer_id else {
            break;
        };

        let mut visits = Visits::default();
        for (day, cursor) in cursors.iter_mut().enumerate() {
            while let Some((page_id, _)) = cursor.head.as_ref().filter(|(_, c)| *c == customer_id) {
                visits.days.insert(day);
                visits.pages.insert(page_id.clone());
                cursor.advance()?;
            }
        }
        if visits.is_loyal() {
            loyal.insert(customer_id);
        }
    }
    Ok(loyal)
}

/// Reading position in one sorted log
struct DayCursor {
    path: PathBuf,
    reader: BufReader<File>,
    head: Option<(String, String)>,
}

impl DayCursor {
    fn open(path: PathBuf) -> Result<DayCursor, anyhow::Error> {
        let file = File::open(&path).with_context(|| format!("path: {}", path.to_string_lossy()))?;
        let mut cursor = DayCursor {
            path,
            reader: BufReader::new(file),
            head: None,
        };
        cursor.advance()?;
        Ok(cursor)
    }

    /// Move to the next well formed record, or to the end
    fn advance(&mut self) -> Result<(), anyhow::Error> {
        self.head = None;
        while let Some(line) = read_line(&mut self.reader, b'\n', &self.path)? {
            let row = Row::new(&line, ',');
            match visit(&row) {
                Some((page_id, customer_id)) => {
                    self.head = Some((page_id.to_string(), customer_id.to_string()));
                    break;
                }
                None => {
                    log::warn!("Skipping malformed record, path: {}", self.path.to_string_lossy());
                }
            }
        }
        Ok(())
    }
}
