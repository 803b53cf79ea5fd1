use std::fs;

use regex::Regex;

use csv_external_sort::sort::Sort;
use csv_external_sort::sort_key::SortKey;

mod common;

#[test]
fn test_check_sorted() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let input_path = tmp.path().join("input.csv");
    let sorted_path = tmp.path().join("sorted.csv");
    common::write_lines(&input_path, &common::random_log_lines(1_000, 1))?;

    common::new_sort(&input_path, &sorted_path, tmp.path(), 2_000, 10).sort()?;

    let sort = Sort::new(sorted_path.clone(), tmp.path().join("unused.csv"));
    assert!(sort.check()?);
    Ok(())
}

#[test]
fn test_check_not_sorted() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let input_path = tmp.path().join("input.csv");
    fs::write(&input_path, "1,p1,c1\n2,p1,c3\n3,p1,c2\n")?;

    let sort = Sort::new(input_path, tmp.path().join("unused.csv"));
    assert!(!sort.check()?);
    Ok(())
}

#[test]
fn test_check_other_key() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let input_path = tmp.path().join("input.csv");
    fs::write(&input_path, "1,p2,c1\n2,p1,c3\n3,p1,c2")?;

    let mut sort = Sort::new(input_path, tmp.path().join("unused.csv"));
    assert!(!sort.check()?);
    sort.with_key(SortKey::new(vec![0]));
    assert!(sort.check()?);
    Ok(())
}

#[test]
fn test_check_skips_ignored_lines() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let input_path = tmp.path().join("input.csv");
    fs::write(&input_path, "# header,z,z\n1,p1,c1\n\n2,p1,c2\n")?;

    let mut sort = Sort::new(input_path, tmp.path().join("unused.csv"));
    assert!(!sort.check()?);
    sort.with_ignore_empty();
    sort.with_ignore_lines(Regex::new("^#")?);
    assert!(sort.check()?);
    Ok(())
}

#[test]
fn test_check_missing_input() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let sort = Sort::new(tmp.path().join("missing.csv"), tmp.path().join("unused.csv"));
    assert!(sort.check().is_err());
    Ok(())
}
