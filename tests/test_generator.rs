use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use csv_external_sort::csv_file::read_csv;
use csv_external_sort::generator::LogGenerator;
use csv_external_sort::sort_key::SortKey;

mod common;

fn visits(path: &Path) -> Result<Vec<String>, anyhow::Error> {
    let visits = read_csv(path)?
        .iter()
        .map(|row| format!("{},{}", row.field(1).unwrap_or(""), row.field(2).unwrap_or("")))
        .collect();
    Ok(visits)
}

#[test]
fn test_generated_size() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("log.csv");
    let written = LogGenerator::new(100_000).with_seed(1).generate(&path)?;
    let actual = fs::metadata(&path)?.len();
    assert_eq!(written, actual);
    assert!(actual >= 100_000);
    // a log line is much shorter than 100 bytes
    assert!(actual < 100_100);
    Ok(())
}

#[test]
fn test_generated_records() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("log.csv");
    LogGenerator::new(50_000)
        .with_pages(10)
        .with_customers(20)
        .with_seed(2)
        .generate(&path)?;

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let rows = read_csv(&path)?;
    assert!(!rows.is_empty());
    let mut pages = BTreeSet::new();
    let mut customers = BTreeSet::new();
    for row in &rows {
        assert_eq!(row.len(), 3);
        let timestamp: u64 = row.field(0).unwrap().parse()?;
        assert!(timestamp + 2 * 86_400 > now && timestamp < now + 2 * 86_400);
        pages.insert(row.field(1).unwrap().to_string());
        customers.insert(row.field(2).unwrap().to_string());
    }
    assert!(pages.len() <= 10);
    assert!(customers.len() <= 20);
    assert!(pages.iter().all(|p| p.len() == 16));
    assert!(customers.iter().all(|c| c.len() == 36));
    Ok(())
}

#[test]
fn test_seed_repeats_pages_and_customers() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let first = tmp.path().join("first.csv");
    let second = tmp.path().join("second.csv");
    LogGenerator::new(10_000).with_seed(3).generate(&first)?;
    LogGenerator::new(10_000).with_seed(3).generate(&second)?;

    assert_eq!(visits(&first)?, visits(&second)?);
    Ok(())
}

#[test]
fn test_empty_pools() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("log.csv");
    assert!(LogGenerator::new(100).with_customers(0).generate(&path).is_err());
    Ok(())
}

#[test]
fn test_sort_generated_log() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let input_path = tmp.path().join("log.csv");
    let output_path = tmp.path().join("sorted.csv");
    LogGenerator::new(200_000).with_seed(4).generate(&input_path)?;

    let summary = common::new_sort(&input_path, &output_path, tmp.path(), 10_000, 4).sort()?;
    assert!(summary.runs() > 4);
    assert!(summary.passes() >= 2);

    let input = common::read_lines(&input_path)?;
    let output = common::read_lines(&output_path)?;
    assert!(common::is_sorted(&output, &SortKey::default()));
    assert_eq!(common::sorted_multiset(&output), common::sorted_multiset(&input));
    Ok(())
}
