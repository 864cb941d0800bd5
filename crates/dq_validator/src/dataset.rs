//! Dataset representation for validation.
//!
//! This module provides the in-memory table the validators read. A table is
//! an ordered list of rows plus the list of columns it was loaded with, so a
//! column can be known to exist even when the table has no rows.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A value in a dataset.
///
/// Represents the cell types inferred when a table is loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
}

static NULL: DataValue = DataValue::Null;

impl DataValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Returns true if this value is null or a blank string.
    pub fn is_blank(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::String(_) => "string",
            DataValue::Int(_) => "int64",
            DataValue::Float(_) => "float64",
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::String(s) => write!(f, "{s}"),
            DataValue::Int(i) => write!(f, "{i}"),
            DataValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Int(i)
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DataValue::Null, Into::into)
    }
}

/// A single row of data, keyed by normalized column name.
pub type DataRow = HashMap<String, DataValue>;

/// Looks up a cell; a column the row does not carry reads as null.
pub fn cell<'a>(row: &'a DataRow, column: &str) -> &'a DataValue {
    row.get(column).unwrap_or(&NULL)
}

/// A dataset containing multiple rows.
///
/// Rows are immutable once loaded; validators only ever borrow them.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    /// Column names in source order
    columns: Vec<String>,
    /// The data rows
    rows: Vec<DataRow>,
}

impl DataSet {
    /// Creates a new empty dataset with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a dataset from explicit columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<DataRow>) -> Self {
        Self { columns, rows }
    }

    /// Creates a dataset from rows, taking the columns from the row keys.
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        let columns: BTreeSet<&String> = rows.iter().flat_map(|r| r.keys()).collect();
        let columns = columns.into_iter().cloned().collect();
        Self { columns, rows }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true if the dataset was loaded with the given column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Returns the number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &DataRow> {
        self.rows.iter()
    }

    /// Gets a specific row by index.
    pub fn get_row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    /// Returns the rows in `start..end`, clamped to the table.
    pub fn slice(&self, start: usize, end: usize) -> &[DataRow] {
        let end = end.min(self.rows.len());
        let start = start.min(end);
        &self.rows[start..end]
    }

    /// Iterates one column as `(row index, value)` pairs.
    pub fn column_values<'a>(
        &'a self,
        column: &'a str,
    ) -> impl Iterator<Item = (usize, &'a DataValue)> + 'a {
        self.rows
            .iter()
            .enumerate()
            .map(move |(idx, row)| (idx, cell(row, column)))
    }
}

impl FromIterator<DataRow> for DataSet {
    fn from_iter<T: IntoIterator<Item = DataRow>>(iter: T) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_value_types() {
        assert_eq!(DataValue::Null.type_name(), "null");
        assert_eq!(DataValue::String("test".into()).type_name(), "string");
        assert_eq!(DataValue::Int(42).type_name(), "int64");
        assert_eq!(DataValue::Float(3.5).type_name(), "float64");
    }

    #[test]
    fn test_data_value_conversions() {
        let val = DataValue::String("hello".into());
        assert_eq!(val.as_string(), Some("hello"));
        assert_eq!(val.as_int(), None);

        let val = DataValue::Int(42);
        assert_eq!(val.as_int(), Some(42));
        assert_eq!(val.as_float(), Some(42.0));
        assert_eq!(val.as_string(), None);

        assert_eq!(DataValue::from(None::<f64>), DataValue::Null);
        assert_eq!(DataValue::from(Some(1.5)), DataValue::Float(1.5));
    }

    #[test]
    fn test_blank_values() {
        assert!(DataValue::Null.is_blank());
        assert!(DataValue::String("   ".into()).is_blank());
        assert!(!DataValue::String("A".into()).is_blank());
        assert!(!DataValue::Int(0).is_blank());
    }

    #[test]
    fn test_display() {
        assert_eq!(DataValue::Null.to_string(), "null");
        assert_eq!(DataValue::Int(-1).to_string(), "-1");
        assert_eq!(DataValue::Float(647.62).to_string(), "647.62");
        assert_eq!(DataValue::String("INR".into()).to_string(), "INR");
    }

    #[test]
    fn test_dataset_operations() {
        let mut row = HashMap::new();
        row.insert("qty".to_string(), DataValue::Int(1));
        let dataset = DataSet::from_rows(vec![row, HashMap::new()]);

        assert_eq!(dataset.len(), 2);
        assert!(dataset.has_column("qty"));
        assert!(!dataset.has_column("amount"));

        let values: Vec<_> = dataset.column_values("qty").collect();
        assert_eq!(values, vec![(0, &DataValue::Int(1)), (1, &DataValue::Null)]);
    }

    #[test]
    fn test_columns_survive_without_rows() {
        let dataset = DataSet::new(vec!["order_id".to_string()], vec![]);
        assert!(dataset.is_empty());
        assert!(dataset.has_column("order_id"));
    }

    #[test]
    fn test_slice_is_clamped() {
        let dataset = DataSet::from_rows(vec![HashMap::new(); 3]);
        assert_eq!(dataset.slice(1, 10).len(), 2);
        assert_eq!(dataset.slice(5, 10).len(), 0);
    }
}
