//! Utility functions for the sales_forecast crate

use chrono::{Months, NaiveDate};

/// The `count` calendar months strictly after `last`, ascending.
///
/// Calendar arithmetic, so December rolls over into January of the next year.
pub fn months_after(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (1..=count as u32)
        .map(|offset| last + Months::new(offset))
        .collect()
}

/// Number of leading rows that feed gradient updates.
///
/// The remaining tail is the validation hold-out, reserved once in input
/// order. At least one training row is always kept.
pub fn split_validation(rows: usize, validation_ratio: f64) -> usize {
    if !(0.0..1.0).contains(&validation_ratio) {
        return rows;
    }
    let holdout = (rows as f64 * validation_ratio).floor() as usize;
    rows - holdout.min(rows.saturating_sub(1))
}
