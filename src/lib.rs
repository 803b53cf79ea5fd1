//! This crate implements an external sort for delimited text files, such as CSV logs, that are
//! too large to sort in memory.
//!
//! Records are lines split on a delimiter, with no quoting or escaping, and are ordered by a
//! list of key columns compared as strings. The input is read once in chunks bounded by a
//! memory budget; each chunk is sorted in memory and written to a run file. Runs are then
//! merged with a bounded fan-in, pass after pass, until a single sorted run is left and
//! becomes the output. Memory use and the number of open files stay bounded regardless of
//! the size of the input.
//!
//! The crate also contains the generator for synthetic page view logs and a loyal customer
//! analysis over such logs, which uses the sort.
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use csv_external_sort::sort::Sort;
//! use csv_external_sort::sort_key::SortKey;
//!
//! fn sort_records(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
//!     let mut sort = Sort::new(input, output);
//!
//!     // sort by customer id in the third column, then by page id in the second
//!     sort.with_key(SortKey::new(vec![2, 1]));
//!
//!     // bytes of input lines held in memory before a sorted run is written
//!     sort.with_memory_budget(100_000_000);
//!
//!     // the maximum number of runs merged at once, which bounds open files
//!     sort.with_max_fanin(100);
//!
//!     // set the directory for run files. The default is the current directory, however
//!     // a dedicated directory on the same file system as the output is recommended.
//!     sort.with_tmp_dir(tmp);
//!
//!     let summary = sort.sort()?;
//!     println!("{} rows, {} runs, {} merge passes", summary.rows(), summary.runs(), summary.passes());
//!     Ok(())
//! }
//! ```
//!

pub(crate) mod config;
pub(crate) mod run;
pub(crate) mod run_reader;
pub(crate) mod run_writer;
pub(crate) mod run_generator;
pub(crate) mod merger;
pub(crate) mod scheduler;

pub mod sort;
pub mod sort_key;
pub mod row;
pub mod text;
pub mod csv_file;
pub mod generator;
pub mod loyal;
