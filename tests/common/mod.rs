use std::cmp::Ordering;
use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use data_encoding::HEXLOWER;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use csv_external_sort::row::Row;
use csv_external_sort::sort::Sort;
use csv_external_sort::sort_key::SortKey;

#[allow(dead_code)]
pub fn read_lines(path: &Path) -> Result<Vec<String>, anyhow::Error> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().map(|x| x.unwrap()).collect();
    Ok(lines)
}

#[allow(dead_code)]
pub fn write_lines(path: &Path, lines: &[String]) -> Result<(), anyhow::Error> {
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &Path) -> PathBuf {
    let mut result = PathBuf::from(dir);
    let name = HEXLOWER.encode(&rand::random::<[u8; 16]>());
    result.push(name);
    result
}

/// Lines `timestamp,page,customer` with few distinct pages and customers, so the key has ties
#[allow(dead_code)]
pub fn random_log_lines(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            format!(
                "{},p{},c{}",
                rng.gen_range(1_700_000_000..1_700_086_400u64),
                rng.gen_range(0..20),
                rng.gen_range(0..50)
            )
        })
        .collect()
}

/// Lines whose `[2, 1]` key is unique, so the sorted order is fully determined
#[allow(dead_code)]
pub fn unique_key_lines(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lines: Vec<String> = (0..count)
        .map(|i| format!("{},p{:05},c{:03}", rng.gen_range(0..1_000_000u64), i % 1000, i / 1000))
        .collect();
    // shuffle by sorting on a random tag
    let mut tagged: Vec<(u64, String)> = lines.drain(..).map(|l| (rng.gen(), l)).collect();
    tagged.sort();
    tagged.into_iter().map(|(_, l)| l).collect()
}

#[allow(dead_code)]
pub fn is_sorted(lines: &[String], key: &SortKey) -> bool {
    lines.windows(2).all(|pair| {
        key.compare(&Row::new(&pair[0], ','), &Row::new(&pair[1], ',')) != Ordering::Greater
    })
}

#[allow(dead_code)]
pub fn sorted_multiset(lines: &[String]) -> Vec<String> {
    let mut lines = lines.to_vec();
    lines.sort();
    lines
}

/// A sort with its own run directory, so tests running in parallel never share run ids
#[allow(dead_code)]
pub fn new_sort(input: &Path, output: &Path, tmp: &Path, memory_budget: u64, max_fanin: u64) -> Sort {
    let mut sort = Sort::new(input.to_path_buf(), output.to_path_buf());
    sort.with_tmp_dir(tmp.to_path_buf());
    sort.with_memory_budget(memory_budget);
    sort.with_max_fanin(max_fanin);
    sort
}
