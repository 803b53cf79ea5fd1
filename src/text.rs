//! Field splitting and joining for delimited lines.
//!
//! There is no quoting or escaping: a delimiter character always separates fields, so
//! [split] and [join] are exact inverses for any line.

use std::path::{Path, PathBuf};

/// Split `line` on every occurrence of `delimiter`.
///
/// An empty line yields a single empty field, and a trailing delimiter yields a trailing
/// empty field, so that [join] restores the original line.
///
/// # Examples
/// ```
/// use csv_external_sort::text::split;
/// assert_eq!(split("10,p1,,c1", ','), vec!["10", "p1", "", "c1"]);
/// assert_eq!(split("", ','), vec![""]);
/// ```
pub fn split(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(str::to_string).collect()
}

/// Join `fields` with `delimiter` between each pair.
pub fn join(fields: &[String], delimiter: char) -> String {
    let capacity = fields.iter().map(|f| f.len() + 1).sum();
    let mut line = String::with_capacity(capacity);
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(delimiter);
        }
        line.push_str(field);
    }
    line
}

/// Derive a sibling file name by inserting `suffix` before the extension.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use csv_external_sort::text::with_file_suffix;
/// assert_eq!(with_file_suffix(&PathBuf::from("logs/day1.log"), "_sorted"), PathBuf::from("logs/day1_sorted.log"));
/// assert_eq!(with_file_suffix(&PathBuf::from("day1"), "_sorted"), PathBuf::from("day1_sorted"));
/// ```
pub fn with_file_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(extension) => format!("{}{}.{}", stem, suffix, extension.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(name)
}
