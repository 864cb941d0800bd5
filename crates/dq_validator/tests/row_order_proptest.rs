//! Row results must not depend on the order rows are evaluated in.

use dq_core::RowSchema;
use dq_validator::{DataRow, DataValue, RowValidator};
use proptest::prelude::*;
use proptest::test_runner::Config;

const STATUSES: &[&str] = &["Shipped", "Cancelled", "Lost", ""];

fn arb_row() -> impl Strategy<Value = DataRow> {
    (
        "[A-Z0-9-]{0,6}",
        prop_oneof!["(0[1-9]|1[0-2])-[0-2][0-9]-2[0-4]", "[0-9]{2}-[0-9]{2}-[0-9]{2}"],
        0..STATUSES.len(),
        prop::option::of(-3i64..5),
        prop::option::of(-10.0f64..1000.0),
    )
        .prop_map(|(id, date, status, qty, amount)| {
            let mut row = DataRow::new();
            row.insert("order_id".into(), DataValue::from(id));
            row.insert("date".into(), DataValue::from(date));
            row.insert("status".into(), DataValue::from(STATUSES[status]));
            row.insert("fulfilment".into(), DataValue::from("Merchant"));
            row.insert("currency".into(), DataValue::from("INR"));
            row.insert("ship_country".into(), DataValue::from("IN"));
            row.insert("qty".into(), DataValue::from(qty));
            row.insert("amount".into(), DataValue::from(amount));
            row
        })
}

fn rows_and_permutation() -> impl Strategy<Value = (Vec<DataRow>, Vec<usize>)> {
    prop::collection::vec(arb_row(), 1..40).prop_flat_map(|rows| {
        let n = rows.len();
        (Just(rows), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    })
}

proptest! {
    #![proptest_config(Config::with_cases(64))]
    #[test]
    fn shuffled_evaluation_gives_identical_row_results((rows, order) in rows_and_permutation()) {
        let validator = RowValidator::new(RowSchema::default()).expect("default schema");

        let in_order: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| validator.validate_row(idx, row))
            .collect();

        let mut shuffled: Vec<_> = order
            .iter()
            .map(|&idx| validator.validate_row(idx, &rows[idx]))
            .collect();
        shuffled.sort_by_key(|r| r.index);

        prop_assert_eq!(in_order, shuffled);
    }
}
