use crate::text;

/// A record parsed from one line of delimited text.
///
/// The number of fields is not validated and may differ from line to line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    /// Parse `line` by splitting it on `field_separator`. No unescaping is done.
    ///
    /// # Examples
    /// ```
    /// use csv_external_sort::row::Row;
    /// let row = Row::new("10,p1,c1", ',');
    /// assert_eq!(row.field(2), Some("c1"));
    /// assert_eq!(row.field(3), None);
    /// ```
    pub fn new(line: &str, field_separator: char) -> Row {
        Row {
            fields: text::split(line, field_separator),
        }
    }

    /// Get the field at zero based `index`, or None when the row is shorter.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize the row back to a line, without a line terminator.
    pub fn line(&self, field_separator: char) -> String {
        text::join(&self.fields, field_separator)
    }
}

#[cfg(test)]
mod tests {
    use crate::row::Row;

    #[test]
    fn test_ragged_rows() {
        let short = Row::new("a", ',');
        let long = Row::new("a,b,,d", ',');
        assert_eq!(short.len(), 1);
        assert_eq!(long.len(), 4);
        assert_eq!(long.field(2), Some(""));
        assert_eq!(long.line(','), "a,b,,d");
    }

    #[test]
    fn test_empty_line() {
        let row = Row::new("", ',');
        assert_eq!(row.len(), 1);
        assert_eq!(row.line(','), "");
    }
}
