//! FILENAME: tests/common/mod.rs
//! Fixtures for pivot-engine integration tests.

#![allow(dead_code)]

use pivot_engine::{calculate_pivot, AggregationType, FlatRow, PageRequest, PivotDefinition, PivotView};
use records::Record;

/// Builds a record from (field, value) pairs.
pub fn record(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().map(|&(k, v)| (k, v)).collect()
}

/// Three sales in two regions.
pub fn small_sales() -> Vec<Record> {
    vec![
        Record::new().with("region", "East").with("rep", "A").with("amount", 10),
        Record::new().with("region", "East").with("rep", "B").with("amount", 20),
        Record::new().with("region", "West").with("rep", "C").with("amount", 5),
    ]
}

/// Five reps across two regions, each with a quarter and an amount.
pub fn regional_sales() -> Vec<Record> {
    vec![
        Record::new().with("region", "East").with("rep", "A").with("quarter", "Q1").with("amount", 10),
        Record::new().with("region", "East").with("rep", "B").with("quarter", "Q2").with("amount", 20),
        Record::new().with("region", "East").with("rep", "C").with("quarter", "Q1").with("amount", 30),
        Record::new().with("region", "West").with("rep", "D").with("quarter", "Q2").with("amount", 40),
        Record::new().with("region", "West").with("rep", "E").with("quarter", "Q1").with("amount", 50),
    ]
}

/// A generated dataset of `count` records over a few regions and products.
pub fn generated_sales(count: usize) -> Vec<Record> {
    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Gizmo"];
    let years = [2022, 2023, 2024];
    (0..count)
        .map(|i| {
            Record::new()
                .with("region", regions[i % regions.len()])
                .with("product", products[(i / 4) % products.len()])
                .with("year", years[(i / 12) % years.len()])
                .with("amount", (i % 17 + 1) as i64)
        })
        .collect()
}

pub fn sum_by(rows: &[&str]) -> PivotDefinition {
    PivotDefinition::new()
        .with_rows(rows.iter().copied())
        .with_value("amount", AggregationType::Sum)
}

pub fn calculate(records: &[Record], definition: &PivotDefinition, page: usize, page_size: usize) -> PivotView {
    let request = PageRequest::new(page, page_size).expect("positive page size");
    calculate_pivot(records, definition, request)
}

pub fn keys(rows: &[FlatRow]) -> Vec<&str> {
    rows.iter().map(|r| r.key.as_str()).collect()
}

/// The value of final column `column` on the row keyed `key`.
pub fn cell<'a>(view: &'a PivotView, key: &str, column: usize) -> &'a str {
    let row = view
        .rows
        .iter()
        .position(|r| r.key == key)
        .unwrap_or_else(|| panic!("no row keyed {key}"));
    view.cell(row, &view.final_columns[column])
}
