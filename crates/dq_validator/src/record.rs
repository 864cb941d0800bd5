//! Typed view of one order row.

use crate::{DataRow, DataValue, cell};
use dq_core::columns;

/// A numeric cell after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// The cell was empty
    Missing,
    /// The cell held a value of the expected type
    Value(T),
    /// The cell held something else; the raw text is kept for reporting
    Invalid(String),
}

/// One order record, read from a loaded row.
///
/// Text fields hold the rendered cell (empty for missing cells) so every
/// rule sees exactly what the source file carried.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Order identifier
    pub order_id: String,
    /// Order date as written (`MM-DD-YY`)
    pub date: String,
    /// Order status
    pub status: String,
    /// Fulfilment channel
    pub fulfilment: String,
    /// Currency code
    pub currency: String,
    /// Destination country code
    pub ship_country: String,
    /// Quantity ordered
    pub qty: Parsed<i64>,
    /// Order amount; absent for most cancelled orders
    pub amount: Parsed<f64>,
}

fn text(row: &DataRow, column: &str) -> String {
    match cell(row, column) {
        DataValue::Null => String::new(),
        value => value.to_string(),
    }
}

fn integer(value: &DataValue) -> Parsed<i64> {
    match value {
        DataValue::Null => Parsed::Missing,
        DataValue::Int(i) => Parsed::Value(*i),
        DataValue::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Parsed::Value(*f as i64)
        }
        other => Parsed::Invalid(other.to_string()),
    }
}

fn number(value: &DataValue) -> Parsed<f64> {
    match value.as_float() {
        Some(f) => Parsed::Value(f),
        None if value.is_null() => Parsed::Missing,
        None => Parsed::Invalid(value.to_string()),
    }
}

impl OrderRecord {
    /// Reads a record from a loaded row.
    pub fn from_row(row: &DataRow) -> Self {
        Self {
            order_id: text(row, columns::ORDER_ID),
            date: text(row, columns::DATE),
            status: text(row, columns::STATUS),
            fulfilment: text(row, columns::FULFILMENT),
            currency: text(row, columns::CURRENCY),
            ship_country: text(row, columns::SHIP_COUNTRY),
            qty: integer(cell(row, columns::QTY)),
            amount: number(cell(row, columns::AMOUNT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_row_coerces_fields() {
        let mut row = DataRow::new();
        row.insert("order_id".into(), "A-1".into());
        row.insert("qty".into(), DataValue::Float(2.0));
        row.insert("amount".into(), DataValue::Int(100));

        let record = OrderRecord::from_row(&row);
        assert_eq!(record.order_id, "A-1");
        assert_eq!(record.date, "");
        assert_eq!(record.qty, Parsed::Value(2));
        assert_eq!(record.amount, Parsed::Value(100.0));
    }

    #[test]
    fn test_non_numeric_cells_are_invalid() {
        let mut row = DataRow::new();
        row.insert("qty".into(), DataValue::Float(1.5));
        row.insert("amount".into(), "free".into());

        let record = OrderRecord::from_row(&row);
        assert_eq!(record.qty, Parsed::Invalid("1.5".to_string()));
        assert_eq!(record.amount, Parsed::Invalid("free".to_string()));
    }

    #[test]
    fn test_missing_numeric_cells() {
        let record = OrderRecord::from_row(&DataRow::new());
        assert_eq!(record.qty, Parsed::Missing);
        assert_eq!(record.amount, Parsed::Missing);
    }
}
