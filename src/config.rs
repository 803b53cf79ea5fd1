use std::path::PathBuf;

use regex::Regex;

use crate::sort_key::SortKey;

#[derive(Clone)]
pub(crate) struct Config {
    tmp: PathBuf,
    tmp_prefix: String,
    tmp_suffix: String,
    field_separator: char,
    endl: char,
    ignore_empty: bool,
    ignore_lines: Option<Regex>,
    memory_budget: u64,
    max_fanin: u64,
    key: SortKey,
}

impl Config {
    pub(crate) fn new(
        tmp: PathBuf,
        tmp_prefix: String,
        tmp_suffix: String,
        field_separator: char,
        endl: char,
        ignore_empty: bool,
        ignore_lines: Option<Regex>,
        memory_budget: u64,
        max_fanin: u64,
        key: SortKey,
    ) -> Config {
        Config {
            tmp,
            tmp_prefix,
            tmp_suffix,
            field_separator,
            endl,
            ignore_empty,
            ignore_lines,
            memory_budget,
            max_fanin,
            key,
        }
    }

    /// Path of the run file with the given id
    pub(crate) fn run_path(&self, id: u64) -> PathBuf {
        self.tmp.join(format!("{}{}{}", self.tmp_prefix, id, self.tmp_suffix))
    }

    pub(crate) fn field_separator(&self) -> char {
        self.field_separator
    }

    pub(crate) fn endl(&self) -> char {
        self.endl
    }

    pub(crate) fn memory_budget(&self) -> u64 {
        self.memory_budget
    }

    pub(crate) fn max_fanin(&self) -> u64 {
        self.max_fanin
    }

    pub(crate) fn key(&self) -> &SortKey {
        &self.key
    }

    /// Whether an input line is excluded from sorting
    pub(crate) fn skip_line(&self, line: &str) -> bool {
        if self.ignore_empty && line.trim().is_empty() {
            return true;
        }
        match &self.ignore_lines {
            Some(r) => r.is_match(line),
            None => false,
        }
    }
}
