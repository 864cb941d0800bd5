//! CSV loading.
//!
//! Reads a delimited file into a [`DataSet`], normalizing column names and
//! inferring one type per column.

use crate::{CancelHandle, DataRow, DataSet, DataValue};
use csv::{ReaderBuilder, StringRecord, Trim};
use dq_core::LoadError;
use dq_core::columns::{ORDER_COLUMNS, TEXT_COLUMNS};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Cell contents treated as missing, in addition to blank cells.
pub const NULL_MARKERS: &[&str] = &[
    "NaN", "nan", "NA", "N/A", "n/a", "#N/A", "NULL", "null", "None", "<NA>",
];

/// Columns a table must carry, and columns that stay text.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema<'a> {
    /// Normalized columns that must be present
    pub required: &'a [&'a str],
    /// Normalized columns never converted to numbers
    pub text: &'a [&'a str],
}

impl TableSchema<'static> {
    /// The order table read by the row model.
    pub const ORDERS: TableSchema<'static> = TableSchema {
        required: &ORDER_COLUMNS,
        text: &TEXT_COLUMNS,
    };
}

/// Type shared by every cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnType {
    /// Every value is an integer literal
    Int,
    /// Every value is a number, at least one with a fraction
    Float,
    /// Anything else
    Text,
}

/// Normalizes a raw header into a column name.
///
/// Strips a leading BOM, lowercases, and collapses every run of
/// non-alphanumeric characters into a single `_`.
///
/// ```rust
/// use dq_validator::normalize_column_name;
///
/// assert_eq!(normalize_column_name("Order ID"), "order_id");
/// assert_eq!(normalize_column_name("ship-country"), "ship_country");
/// ```
pub fn normalize_column_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.trim_matches('\u{feff}').trim().chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !name.is_empty() {
                name.push('_');
            }
            pending_sep = false;
            name.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }

    name
}

fn is_null_marker(value: &str) -> bool {
    value.is_empty() || NULL_MARKERS.contains(&value)
}

/// Narrowest type a single non-null cell fits.
fn cell_type(value: &str) -> ColumnType {
    if value.parse::<i64>().is_ok() {
        ColumnType::Int
    } else if value.parse::<f64>().is_ok_and(f64::is_finite) {
        ColumnType::Float
    } else {
        ColumnType::Text
    }
}

/// Infers a column type from its raw cells; nulls do not vote.
pub fn infer_column_type<'a>(cells: impl IntoIterator<Item = &'a str>) -> ColumnType {
    let mut inferred = ColumnType::Int;
    for value in cells.into_iter().map(str::trim) {
        if is_null_marker(value) {
            continue;
        }
        inferred = inferred.max(cell_type(value));
        if inferred == ColumnType::Text {
            break;
        }
    }
    inferred
}

/// Converts a raw cell to a value of the column's type.
pub fn parse_cell(raw: &str, column_type: ColumnType) -> DataValue {
    let value = raw.trim();
    if is_null_marker(value) {
        return DataValue::Null;
    }

    let parsed = match column_type {
        ColumnType::Int => value.parse().ok().map(DataValue::Int),
        ColumnType::Float => value.parse().ok().map(DataValue::Float),
        ColumnType::Text => None,
    };
    parsed.unwrap_or_else(|| DataValue::String(value.to_string()))
}

/// Loads a CSV file, requiring the columns of `schema`.
pub fn load_csv(path: &Path, schema: &TableSchema<'_>) -> Result<DataSet, LoadError> {
    load_csv_until(path, schema, &CancelHandle::new())
}

/// Like [`load_csv`], but stops reading once `cancel` is set.
pub fn load_csv_until(
    path: &Path,
    schema: &TableSchema<'_>,
    cancel: &CancelHandle,
) -> Result<DataSet, LoadError> {
    info!("Loading data from: {}", path.display());

    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let dataset = read_csv_until(file, path, schema, cancel)?;
    info!(
        "Rows: {} | Columns: {}",
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

/// Reads CSV content from any reader. `source` is only used in errors.
pub fn read_csv<R: Read>(
    reader: R,
    source: &Path,
    schema: &TableSchema<'_>,
) -> Result<DataSet, LoadError> {
    read_csv_until(reader, source, schema, &CancelHandle::new())
}

/// Like [`read_csv`], but stops once `cancel` is set.
pub fn read_csv_until<R: Read>(
    reader: R,
    source: &Path,
    schema: &TableSchema<'_>,
    cancel: &CancelHandle,
) -> Result<DataSet, LoadError> {
    let cancelled = || LoadError::Cancelled {
        path: source.to_path_buf(),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| csv_error(source, e))?
        .clone();

    // Parallel: field position and normalized name of every kept header
    let mut columns: Vec<String> = Vec::with_capacity(headers.len());
    let mut fields: Vec<usize> = Vec::with_capacity(headers.len());
    for (position, raw) in headers.iter().enumerate() {
        let name = normalize_column_name(raw);
        if name.is_empty() || columns.contains(&name) {
            warn!("Ignoring duplicate or empty column header '{}'", raw);
        } else {
            fields.push(position);
            columns.push(name);
        }
    }
    debug!("Normalized columns: {:?}", columns);

    let missing: Vec<String> = schema
        .required
        .iter()
        .filter(|c| !columns.iter().any(|have| have == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            path: source.to_path_buf(),
            columns: missing,
        });
    }

    let mut records: Vec<StringRecord> = Vec::new();
    for (n, record) in reader.records().enumerate() {
        if cancel.is_cancelled_at(n) {
            return Err(cancelled());
        }
        records.push(record.map_err(|e| csv_error(source, e))?);
    }

    let types: Vec<ColumnType> = columns
        .iter()
        .zip(&fields)
        .map(|(name, &position)| {
            if schema.text.contains(&name.as_str()) {
                ColumnType::Text
            } else {
                infer_column_type(records.iter().map(|r| r.get(position).unwrap_or("")))
            }
        })
        .collect();
    debug!("Column types: {:?}", columns.iter().zip(&types).collect::<Vec<_>>());

    let mut rows = Vec::with_capacity(records.len());
    for (n, record) in records.iter().enumerate() {
        if cancel.is_cancelled_at(n) {
            return Err(cancelled());
        }
        let mut row = DataRow::with_capacity(columns.len());
        for ((name, &position), &column_type) in columns.iter().zip(&fields).zip(&types) {
            let raw = record.get(position).unwrap_or("");
            row.insert(name.clone(), parse_cell(raw, column_type));
        }
        rows.push(row);
    }

    Ok(DataSet::new(columns, rows))
}

fn csv_error(source: &Path, err: csv::Error) -> LoadError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => LoadError::Read {
            path: source.to_path_buf(),
            source: e,
        },
        _ => LoadError::Parse {
            path: source.to_path_buf(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const HEADER: &str = "index,Order ID,Date,Status,Fulfilment,Qty,currency,Amount,ship-country";

    fn read(content: &str) -> Result<DataSet, LoadError> {
        read_csv(content.as_bytes(), Path::new("inline.csv"), &TableSchema::ORDERS)
    }

    fn text(value: &str) -> DataValue {
        DataValue::String(value.to_string())
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Order ID"), "order_id");
        assert_eq!(normalize_column_name("ship-country"), "ship_country");
        assert_eq!(normalize_column_name("\u{feff}index"), "index");
        assert_eq!(normalize_column_name(" Unnamed: 22 "), "unnamed_22");
        assert_eq!(normalize_column_name("--Qty--"), "qty");
    }

    #[test]
    fn test_infer_column_type() {
        assert_eq!(infer_column_type(["1", "-2", "", "NaN"]), ColumnType::Int);
        assert_eq!(infer_column_type(["1", "647.62"]), ColumnType::Float);
        assert_eq!(infer_column_type(["1", "inf"]), ColumnType::Text);
        assert_eq!(infer_column_type(["1.5", "405-8078784-5731545"]), ColumnType::Text);
        assert_eq!(infer_column_type(Vec::<&str>::new()), ColumnType::Int);
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("", ColumnType::Int), DataValue::Null);
        assert_eq!(parse_cell("   ", ColumnType::Text), DataValue::Null);
        assert_eq!(parse_cell("NaN", ColumnType::Float), DataValue::Null);
        assert_eq!(parse_cell("-1", ColumnType::Int), DataValue::Int(-1));
        assert_eq!(parse_cell("10", ColumnType::Float), DataValue::Float(10.0));
        assert_eq!(parse_cell("007", ColumnType::Text), text("007"));
        assert_eq!(parse_cell(" 04-30-22 ", ColumnType::Text), text("04-30-22"));
    }

    #[test]
    fn test_read_csv_normalizes_and_types() {
        let content = format!(
            "{HEADER}\n0,405-8078784-5731545,04-30-22,Cancelled,Merchant,0,INR,,IN\n1,171-9198151-1101146,04-30-22,Shipped,Amazon,1,INR,406,IN\n2,171-9198151-1101147,04-30-22,Shipped,Amazon,2,INR,647.62,IN\n"
        );

        let dataset = read(&content).expect("Failed to read CSV");

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.columns()[1], "order_id");
        assert!(dataset.has_column("ship_country"));

        let first = dataset.get_row(0).unwrap();
        assert_eq!(first.get("amount"), Some(&DataValue::Null));
        assert_eq!(first.get("qty"), Some(&DataValue::Int(0)));

        let second = dataset.get_row(1).unwrap();
        assert_eq!(second.get("amount"), Some(&DataValue::Float(406.0)));
        assert_eq!(second.get("status"), Some(&text("Shipped")));
    }

    #[test]
    fn test_numeric_looking_ids_stay_text() {
        let content = format!(
            "{HEADER}\n0,007,04-30-22,Shipped,Amazon,1,INR,1,IN\n1,7,04-30-22,Shipped,Amazon,1,INR,1,IN\n2,1.0,04-30-22,Shipped,Amazon,1,INR,1,IN\n3,1,04-30-22,Shipped,Amazon,1,INR,1,IN\n"
        );

        let dataset = read(&content).expect("Failed to read CSV");
        let ids: Vec<DataValue> = dataset
            .column_values("order_id")
            .map(|(_, value)| value.clone())
            .collect();
        assert_eq!(ids, vec![text("007"), text("7"), text("1.0"), text("1")]);
    }

    #[test]
    fn test_missing_required_columns() {
        let err = read("Order ID,Date\nA,01-01-22\n").unwrap_err();
        match err {
            LoadError::MissingColumns { columns, .. } => {
                assert_eq!(
                    columns,
                    vec![
                        "status",
                        "fulfilment",
                        "currency",
                        "ship_country",
                        "qty",
                        "amount"
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ragged_rows_are_parse_errors() {
        let content = format!("{HEADER}\n0,A,04-30-22\n");
        let err = read(&content).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }), "{err}");
    }

    #[test]
    fn test_cancelled_read_stops() {
        let content = format!("{HEADER}\n0,A,04-30-22,Shipped,Amazon,1,INR,10,IN\n");
        let cancel = CancelHandle::new();
        cancel.cancel();

        let err = read_csv_until(
            content.as_bytes(),
            Path::new("inline.csv"),
            &TableSchema::ORDERS,
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Cancelled { .. }), "{err}");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_csv(Path::new("no/such/orders.csv"), &TableSchema::ORDERS).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "0,A,04-30-22,Shipped,Amazon,1,INR,10,IN").unwrap();

        let dataset = load_csv(file.path(), &TableSchema::ORDERS).expect("Failed to load CSV");
        assert_eq!(dataset.len(), 1);
    }
}
