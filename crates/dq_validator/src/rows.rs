//! Row-level validation.
//!
//! Every row is read into an [`OrderRecord`] and checked by a fixed table of
//! field rules. Rules are independent: all of them run for every row and
//! each failure becomes one [`FieldError`].

use crate::constraints::matches_date;
use crate::record::{OrderRecord, Parsed};
use crate::{CancelHandle, DataRow, DataSet};
use dq_core::{FieldError, PipelineError, RowResult, RowSchema, RuleSetError, columns};
use regex::Regex;
use std::ops::Range;
use tracing::debug;

/// A single field check; `None` means the field is valid.
pub type FieldRule = fn(&OrderRecord, &RowValidator) -> Option<FieldError>;

/// Field rules, in the order errors are reported.
pub const FIELD_RULES: [(&str, FieldRule); 8] = [
    (columns::ORDER_ID, check_order_id),
    (columns::DATE, check_date),
    (columns::STATUS, check_status),
    (columns::FULFILMENT, check_fulfilment),
    (columns::CURRENCY, check_currency),
    (columns::QTY, check_qty),
    (columns::AMOUNT, check_amount),
    (columns::SHIP_COUNTRY, check_ship_country),
];

/// Applies the order model to individual rows.
#[derive(Debug, Clone)]
pub struct RowValidator {
    schema: RowSchema,
    date_regex: Regex,
}

impl RowValidator {
    /// Creates a row validator, compiling the date regex of the schema.
    pub fn new(schema: RowSchema) -> Result<Self, RuleSetError> {
        let date_regex = Regex::new(&schema.date_regex).map_err(|e| RuleSetError::InvalidRegex {
            target: "row_schema.date_regex".to_string(),
            error: e.to_string(),
        })?;
        Ok(Self { schema, date_regex })
    }

    /// The schema this validator checks against.
    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// Validates one row. `index` is the 0-based data row index.
    pub fn validate_row(&self, index: usize, row: &DataRow) -> RowResult {
        let record = OrderRecord::from_row(row);
        let errors = FIELD_RULES
            .iter()
            .filter_map(|(_, rule)| rule(&record, self))
            .collect();
        RowResult::from_errors(index, errors)
    }

    /// Validates every row of the dataset, in row order.
    pub fn validate(&self, dataset: &DataSet) -> Vec<RowResult> {
        self.validate_range(dataset, 0..dataset.len())
    }

    /// Validates the rows in `range`, keeping their original indices.
    pub fn validate_range(&self, dataset: &DataSet, range: Range<usize>) -> Vec<RowResult> {
        let start = range.start;
        let rows = dataset.slice(range.start, range.end);
        debug!("Validating rows {}..{}", start, start + rows.len());

        rows.iter()
            .enumerate()
            .map(|(offset, row)| self.validate_row(start + offset, row))
            .collect()
    }

    /// Like [`validate_range`](Self::validate_range), but gives up once
    /// `cancel` is set.
    pub fn validate_range_until(
        &self,
        dataset: &DataSet,
        range: Range<usize>,
        cancel: &CancelHandle,
    ) -> Result<Vec<RowResult>, PipelineError> {
        let start = range.start;
        let rows = dataset.slice(range.start, range.end);
        let mut results = Vec::with_capacity(rows.len());
        for (offset, row) in rows.iter().enumerate() {
            if cancel.is_cancelled_at(offset) {
                debug!("Row validation cancelled at row {}", start + offset);
                return Err(PipelineError::Cancelled);
            }
            results.push(self.validate_row(start + offset, row));
        }
        Ok(results)
    }

    fn is_date(&self, value: &str) -> bool {
        matches_date(&self.date_regex, Some(&self.schema.date_format), value)
    }
}

fn contains(values: &[String], value: &str) -> bool {
    values.iter().any(|v| v == value)
}

/// Renders a chrono format the way users write it (`%m-%d-%y` → `MM-DD-YY`).
fn format_hint(format: &str) -> String {
    format
        .replace("%Y", "YYYY")
        .replace("%m", "MM")
        .replace("%d", "DD")
        .replace("%y", "YY")
}

fn check_order_id(record: &OrderRecord, _: &RowValidator) -> Option<FieldError> {
    record.order_id.trim().is_empty().then(|| {
        FieldError::new(
            columns::ORDER_ID,
            "Order ID cannot be empty",
            &record.order_id,
        )
    })
}

fn check_date(record: &OrderRecord, validator: &RowValidator) -> Option<FieldError> {
    (!validator.is_date(&record.date)).then(|| {
        FieldError::new(
            columns::DATE,
            format!(
                "Invalid date format: '{}' (expected: {})",
                record.date,
                format_hint(&validator.schema.date_format)
            ),
            &record.date,
        )
    })
}

fn check_status(record: &OrderRecord, validator: &RowValidator) -> Option<FieldError> {
    (!contains(&validator.schema.statuses, &record.status)).then(|| {
        FieldError::new(
            columns::STATUS,
            format!("Invalid status: '{}'", record.status),
            &record.status,
        )
    })
}

fn check_fulfilment(record: &OrderRecord, validator: &RowValidator) -> Option<FieldError> {
    (!contains(&validator.schema.fulfilment_channels, &record.fulfilment)).then(|| {
        FieldError::new(
            columns::FULFILMENT,
            format!("Invalid fulfilment: '{}'", record.fulfilment),
            &record.fulfilment,
        )
    })
}

fn check_currency(record: &OrderRecord, validator: &RowValidator) -> Option<FieldError> {
    let accepted = &validator.schema.currencies;
    (!contains(accepted, &record.currency)).then(|| {
        FieldError::new(
            columns::CURRENCY,
            format!(
                "Invalid currency: '{}' (expected: {})",
                record.currency,
                accepted.join(", ")
            ),
            &record.currency,
        )
    })
}

fn check_ship_country(record: &OrderRecord, validator: &RowValidator) -> Option<FieldError> {
    let accepted = &validator.schema.ship_countries;
    (!contains(accepted, &record.ship_country)).then(|| {
        FieldError::new(
            columns::SHIP_COUNTRY,
            format!(
                "Invalid ship-country: '{}' (expected: {})",
                record.ship_country,
                accepted.join(", ")
            ),
            &record.ship_country,
        )
    })
}

fn check_qty(record: &OrderRecord, _: &RowValidator) -> Option<FieldError> {
    match &record.qty {
        Parsed::Value(q) if *q >= 0 => None,
        Parsed::Value(q) => Some(FieldError::new(
            columns::QTY,
            format!("Qty cannot be negative: {q}"),
            q.to_string(),
        )),
        Parsed::Missing => Some(FieldError::new(columns::QTY, "Qty is required", "")),
        Parsed::Invalid(raw) => Some(FieldError::new(
            columns::QTY,
            format!("Qty must be an integer, got '{raw}'"),
            raw,
        )),
    }
}

fn check_amount(record: &OrderRecord, validator: &RowValidator) -> Option<FieldError> {
    match &record.amount {
        Parsed::Value(a) if *a >= 0.0 => None,
        Parsed::Value(a) => Some(FieldError::new(
            columns::AMOUNT,
            format!("Amount cannot be negative: {a}"),
            a.to_string(),
        )),
        Parsed::Missing if validator.schema.is_cancellation(&record.status) => None,
        Parsed::Missing => Some(FieldError::new(
            columns::AMOUNT,
            "Amount is required unless the order is cancelled",
            "",
        )),
        Parsed::Invalid(raw) => Some(FieldError::new(
            columns::AMOUNT,
            format!("Amount must be a number, got '{raw}'"),
            raw,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataValue;
    use pretty_assertions::assert_eq;

    fn order(status: &str, amount: Option<f64>) -> DataRow {
        let mut row = DataRow::new();
        row.insert("order_id".into(), "171-9198151-1101146".into());
        row.insert("date".into(), "04-30-22".into());
        row.insert("status".into(), status.into());
        row.insert("fulfilment".into(), "Merchant".into());
        row.insert("currency".into(), "INR".into());
        row.insert("ship_country".into(), "IN".into());
        row.insert("qty".into(), DataValue::Int(1));
        row.insert("amount".into(), amount.into());
        row
    }

    fn validator() -> RowValidator {
        RowValidator::new(RowSchema::default()).unwrap()
    }

    fn messages(result: &RowResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_valid_row() {
        let validator = validator();
        let result = validator.validate_row(0, &order("Shipped", Some(406.0)));
        assert!(result.success, "{:?}", result.errors);
    }

    #[test]
    fn test_cancelled_order_without_amount_is_valid() {
        let validator = validator();
        assert!(validator.validate_row(0, &order("Cancelled", None)).success);
    }

    #[test]
    fn test_shipped_order_without_amount_is_invalid() {
        let validator = validator();
        let result = validator.validate_row(3, &order("Shipped", None));

        assert!(!result.success);
        assert_eq!(result.index, 3);
        assert_eq!(
            messages(&result),
            vec!["Amount is required unless the order is cancelled"]
        );
        assert_eq!(result.errors[0].field, "amount");
    }

    #[test]
    fn test_errors_are_collected_not_short_circuited() {
        let validator = validator();
        let mut row = order("Lost", Some(10.0));
        row.insert("order_id".into(), DataValue::Null);
        row.insert("date".into(), "13-01-24".into());
        row.insert("currency".into(), "USD".into());
        row.insert("qty".into(), DataValue::Int(-1));

        let result = validator.validate_row(0, &row);
        assert_eq!(
            messages(&result),
            vec![
                "Order ID cannot be empty",
                "Invalid date format: '13-01-24' (expected: MM-DD-YY)",
                "Invalid status: 'Lost'",
                "Invalid currency: 'USD' (expected: INR)",
                "Qty cannot be negative: -1",
            ]
        );
    }

    #[test]
    fn test_bad_fulfilment_and_country() {
        let validator = validator();
        let mut row = order("Shipped", Some(1.0));
        row.insert("fulfilment".into(), "Drone".into());
        row.insert("ship_country".into(), "US".into());

        let result = validator.validate_row(0, &row);
        assert_eq!(
            messages(&result),
            vec![
                "Invalid fulfilment: 'Drone'",
                "Invalid ship-country: 'US' (expected: IN)"
            ]
        );
    }

    #[test]
    fn test_numeric_type_errors() {
        let validator = validator();
        let mut row = order("Shipped", None);
        row.insert("qty".into(), "two".into());
        row.insert("amount".into(), "lots".into());

        let result = validator.validate_row(0, &row);
        assert_eq!(
            messages(&result),
            vec![
                "Qty must be an integer, got 'two'",
                "Amount must be a number, got 'lots'"
            ]
        );

        row.insert("qty".into(), DataValue::Null);
        row.insert("amount".into(), DataValue::Float(-5.5));
        let result = validator.validate_row(0, &row);
        assert_eq!(
            messages(&result),
            vec!["Qty is required", "Amount cannot be negative: -5.5"]
        );
    }

    #[test]
    fn test_custom_cancellation_statuses() {
        let schema = RowSchema {
            cancellation_statuses: vec!["Shipped - Lost in Transit".to_string()],
            ..RowSchema::default()
        };
        let validator = RowValidator::new(schema).unwrap();

        assert!(
            validator
                .validate_row(0, &order("Shipped - Lost in Transit", None))
                .success
        );
        assert!(!validator.validate_row(0, &order("Cancelled", None)).success);
    }

    #[test]
    fn test_invalid_date_regex_is_rejected() {
        let schema = RowSchema {
            date_regex: "(".to_string(),
            ..RowSchema::default()
        };
        assert!(matches!(
            RowValidator::new(schema),
            Err(RuleSetError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_validate_range_keeps_indices() {
        let validator = validator();
        let dataset = DataSet::from_rows(vec![
            order("Shipped", Some(1.0)),
            order("Shipped", None),
            order("Cancelled", None),
        ]);

        let results = validator.validate_range(&dataset, 1..3);
        let indices: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert!(!results[0].success);
        assert!(results[1].success);

        assert_eq!(validator.validate(&dataset).len(), 3);
    }

    #[test]
    fn test_validate_range_until_cancelled() {
        let validator = validator();
        let dataset = DataSet::from_rows(vec![order("Shipped", Some(1.0)); 3]);

        let cancel = CancelHandle::new();
        let results = validator
            .validate_range_until(&dataset, 0..3, &cancel)
            .unwrap();
        assert_eq!(results, validator.validate(&dataset));

        cancel.cancel();
        let err = validator
            .validate_range_until(&dataset, 0..3, &cancel)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[test]
    fn test_format_hint() {
        assert_eq!(format_hint("%m-%d-%y"), "MM-DD-YY");
        assert_eq!(format_hint("%Y/%m/%d"), "YYYY/MM/DD");
    }
}
