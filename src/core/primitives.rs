use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Millisecond precision, matching how time keys usually reach a dimension.
#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Coerces NaN/infinite geometry to `0.0` so empty data still yields a valid
/// (empty) shape.
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Returns `true` when `(start, end)` can be used as a continuous domain.
#[must_use]
pub fn is_usable_range(start: f64, end: f64) -> bool {
    start.is_finite() && end.is_finite()
}
