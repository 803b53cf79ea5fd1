use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, Context};

use crate::row::Row;

/// An ordered list of zero based column indices defining the sort order.
///
/// Rows are compared on the first column; when both rows have that column and the values
/// differ, the byte order of the values decides. Otherwise comparison moves on to the next
/// column. A column missing from either row does not discriminate, and rows that agree on
/// every comparable column are equal.
///
/// The same comparator orders rows in memory and in the merge heap.
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use csv_external_sort::row::Row;
/// use csv_external_sort::sort_key::SortKey;
///
/// // order by customer id, then by page id
/// let key = SortKey::new(vec![2, 1]);
/// let a = Row::new("10,p2,c1", ',');
/// let b = Row::new("5,p1,c2", ',');
/// assert_eq!(key.compare(&a, &b), Ordering::Less);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    columns: Vec<usize>,
}

impl SortKey {
    /// Create a new [SortKey] from column indices in order of precedence.
    pub fn new(columns: Vec<usize>) -> SortKey {
        SortKey {
            columns
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        for column in &self.columns {
            if let (Some(x), Some(y)) = (a.field(*column), b.field(*column)) {
                match x.as_bytes().cmp(y.as_bytes()) {
                    Ordering::Equal => {}
                    ordering => {
                        return ordering;
                    }
                }
            }
        }
        Ordering::Equal
    }
}

impl Default for SortKey {
    /// Customer id, then page id, for `timestamp,page_id,customer_id` logs.
    fn default() -> Self {
        SortKey::new(vec![2, 1])
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    /// Parse a comma separated list of column indices such as `2,1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let columns = s
            .split(',')
            .map(|c| usize::from_str(c.trim()).with_context(|| format!("key column: '{}'", c)))
            .collect::<Result<Vec<usize>, anyhow::Error>>()?;
        if s.trim().is_empty() || columns.is_empty() {
            Err(anyhow!("sort key must name at least one column"))
        } else {
            Ok(SortKey::new(columns))
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let columns: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", columns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;
    use std::str::FromStr;

    use crate::row::Row;
    use crate::sort_key::SortKey;

    fn row(line: &str) -> Row {
        Row::new(line, ',')
    }

    #[test]
    fn test_primary_column_decides() {
        let key = SortKey::new(vec![2, 1]);
        assert_eq!(key.compare(&row("10,p9,c1"), &row("5,p1,c2")), Ordering::Less);
        assert_eq!(key.compare(&row("5,p1,c2"), &row("10,p9,c1")), Ordering::Greater);
    }

    #[test]
    fn test_secondary_breaks_ties() {
        let key = SortKey::new(vec![2, 1]);
        assert_eq!(key.compare(&row("10,p1,c1"), &row("7,p2,c1")), Ordering::Less);
        assert_eq!(key.compare(&row("10,p1,c1"), &row("7,p1,c1")), Ordering::Equal);
    }

    #[test]
    fn test_missing_column_is_skipped() {
        let key = SortKey::new(vec![2, 1]);
        // column 2 is missing on one side, so column 1 decides
        assert_eq!(key.compare(&row("10,a"), &row("7,b,c0")), Ordering::Less);
        assert_eq!(key.compare(&row("10"), &row("7,b,c0")), Ordering::Equal);
        assert_eq!(SortKey::new(vec![9]).compare(&row("a"), &row("b")), Ordering::Equal);
    }

    #[test]
    fn test_byte_order() {
        let key = SortKey::new(vec![0]);
        assert_eq!(key.compare(&row("B"), &row("a")), Ordering::Less);
        assert_eq!(key.compare(&row("10"), &row("9")), Ordering::Less);
        assert_eq!(key.compare(&row(""), &row("a")), Ordering::Less);
    }

    #[test]
    fn test_parse() -> Result<(), anyhow::Error> {
        assert_eq!(SortKey::from_str("2,1")?, SortKey::new(vec![2, 1]));
        assert_eq!(SortKey::from_str(" 0 ")?, SortKey::new(vec![0]));
        assert!(SortKey::from_str("").is_err());
        assert!(SortKey::from_str("2,x").is_err());
        assert!(SortKey::from_str("-1").is_err());
        assert_eq!(SortKey::default().to_string(), "[2, 1]");
        Ok(())
    }
}
