use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64};
use crate::error::ChartResult;

/// Key or bound value understood by filters and dimensions.
///
/// Numbers are wrapped in `OrderedFloat` so values can be hashed and used as
/// stacking row keys. `List` carries composite keys (2-D points, hierarchy
/// paths).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(OrderedFloat<f64>),
    Text(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn list(values: impl IntoIterator<Item = FilterValue>) -> Self {
        Self::List(values.into_iter().collect())
    }

    #[must_use]
    pub fn point(x: f64, y: f64) -> Self {
        Self::List(vec![Self::number(x), Self::number(y)])
    }

    /// Time keys are stored as unix seconds so they share the numeric axis.
    #[must_use]
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        Self::number(datetime_to_unix_seconds(time))
    }

    pub fn from_decimal(value: Decimal) -> ChartResult<Self> {
        Ok(Self::number(decimal_to_f64(value, "filter value")?))
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value.0),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Compares two values of the same kind.
    ///
    /// Mixed kinds are incomparable, so every `<=`/`>=` style test between a
    /// number and a text key fails instead of falling back to variant order.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => {
                if a.is_nan() || b.is_nan() {
                    None
                } else {
                    Some(a.cmp(b))
                }
            }
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::List(a), Self::List(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    match left.compare(right)? {
                        Ordering::Equal => continue,
                        unequal => return Some(unequal),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }

    /// Value equality in the `a <= b && a >= b` sense.
    #[must_use]
    pub fn loosely_equals(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::number(value as f64)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value.0),
            Self::Text(value) => f.write_str(value),
            Self::List(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}
