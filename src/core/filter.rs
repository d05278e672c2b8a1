use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::FilterValue;

/// Type tag exposed by every filter variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterType {
    Exact,
    Ranged,
    TwoDimensional,
    RangedTwoDimensional,
    HierarchyPath,
}

/// Half-open interval `[low, high)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangedFilter {
    pub low: FilterValue,
    pub high: FilterValue,
}

impl RangedFilter {
    #[must_use]
    pub fn new(low: impl Into<FilterValue>, high: impl Into<FilterValue>) -> Self {
        Self {
            low: low.into(),
            high: high.into(),
        }
    }

    #[must_use]
    pub fn is_filtered(&self, value: &FilterValue) -> bool {
        let above_low = matches!(
            self.low.compare(value),
            Some(Ordering::Less | Ordering::Equal)
        );
        let below_high = matches!(self.high.compare(value), Some(Ordering::Greater));
        above_low && below_high
    }

    /// Numeric bounds, when both ends are numbers.
    #[must_use]
    pub fn numeric_bounds(&self) -> Option<(f64, f64)> {
        Some((self.low.as_f64()?, self.high.as_f64()?))
    }
}

/// Exact match on a 2-D key `[x, y]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TwoDimensionalFilter {
    pub x: FilterValue,
    pub y: FilterValue,
}

impl TwoDimensionalFilter {
    #[must_use]
    pub fn new(x: impl Into<FilterValue>, y: impl Into<FilterValue>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    #[must_use]
    pub fn is_filtered(&self, value: &FilterValue) -> bool {
        match value.as_list() {
            Some([x, y]) => x.loosely_equals(&self.x) && y.loosely_equals(&self.y),
            _ => false,
        }
    }
}

/// Rectangle `[x0, x1) x [y0, y1)` with corners normalized so `x0 <= x1`
/// and `y0 <= y1`.
///
/// Built from scalar x bounds it has no y extent and behaves like a 1-D
/// interval on the x component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangedTwoDimensionalFilter {
    x0: OrderedFloat<f64>,
    x1: OrderedFloat<f64>,
    y: Option<(OrderedFloat<f64>, OrderedFloat<f64>)>,
}

impl RangedTwoDimensionalFilter {
    /// Builds the filter from two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: [f64; 2], b: [f64; 2]) -> Self {
        Self {
            x0: OrderedFloat(a[0].min(b[0])),
            x1: OrderedFloat(a[0].max(b[0])),
            y: Some((OrderedFloat(a[1].min(b[1])), OrderedFloat(a[1].max(b[1])))),
        }
    }

    #[must_use]
    pub fn from_x_bounds(x0: f64, x1: f64) -> Self {
        Self {
            x0: OrderedFloat(x0.min(x1)),
            x1: OrderedFloat(x0.max(x1)),
            y: None,
        }
    }

    #[must_use]
    pub fn bottom_left(&self) -> [f64; 2] {
        let (y0, _) = self.y_bounds();
        [self.x0.0, y0]
    }

    #[must_use]
    pub fn top_right(&self) -> [f64; 2] {
        let (_, y1) = self.y_bounds();
        [self.x1.0, y1]
    }

    #[must_use]
    pub fn is_one_dimensional(&self) -> bool {
        self.y.is_none()
    }

    fn y_bounds(&self) -> (f64, f64) {
        self.y
            .map_or((f64::NEG_INFINITY, f64::INFINITY), |(y0, y1)| (y0.0, y1.0))
    }

    #[must_use]
    pub fn is_filtered(&self, value: &FilterValue) -> bool {
        let (y0, y1) = self.y_bounds();
        let (x, y) = match value {
            FilterValue::List(items) => match (
                items.first().and_then(FilterValue::as_f64),
                items.get(1).and_then(FilterValue::as_f64),
            ) {
                (Some(x), Some(y)) => (x, y),
                _ => return false,
            },
            FilterValue::Number(x) => (x.0, y0),
            FilterValue::Text(_) => return false,
        };

        x >= self.x0.0 && x < self.x1.0 && y >= y0 && y < y1
    }
}

/// Prefix match on an ordered key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyFilter {
    pub path: SmallVec<[FilterValue; 4]>,
}

impl HierarchyFilter {
    #[must_use]
    pub fn new(path: impl IntoIterator<Item = FilterValue>) -> Self {
        Self {
            path: path.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_filtered(&self, value: &FilterValue) -> bool {
        let Some(candidate) = value.as_list() else {
            return false;
        };
        if self.path.is_empty() || candidate.len() < self.path.len() {
            return false;
        }
        self.path
            .iter()
            .zip(candidate)
            .all(|(segment, key)| segment.loosely_equals(key))
    }
}

/// One entry of a chart's active filter list.
///
/// Filters are compared by value, never by identity: removing or probing a
/// filter matches any stored filter equal to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Filter {
    Exact(FilterValue),
    Ranged(RangedFilter),
    TwoDimensional(TwoDimensionalFilter),
    RangedTwoDimensional(RangedTwoDimensionalFilter),
    HierarchyPath(HierarchyFilter),
}

impl Filter {
    #[must_use]
    pub fn exact(value: impl Into<FilterValue>) -> Self {
        Self::Exact(value.into())
    }

    #[must_use]
    pub fn ranged(low: impl Into<FilterValue>, high: impl Into<FilterValue>) -> Self {
        Self::Ranged(RangedFilter::new(low, high))
    }

    #[must_use]
    pub fn two_dimensional(x: impl Into<FilterValue>, y: impl Into<FilterValue>) -> Self {
        Self::TwoDimensional(TwoDimensionalFilter::new(x, y))
    }

    #[must_use]
    pub fn ranged_two_dimensional(a: [f64; 2], b: [f64; 2]) -> Self {
        Self::RangedTwoDimensional(RangedTwoDimensionalFilter::from_corners(a, b))
    }

    #[must_use]
    pub fn hierarchy(path: impl IntoIterator<Item = FilterValue>) -> Self {
        Self::HierarchyPath(HierarchyFilter::new(path))
    }

    #[must_use]
    pub fn filter_type(&self) -> FilterType {
        match self {
            Self::Exact(_) => FilterType::Exact,
            Self::Ranged(_) => FilterType::Ranged,
            Self::TwoDimensional(_) => FilterType::TwoDimensional,
            Self::RangedTwoDimensional(_) => FilterType::RangedTwoDimensional,
            Self::HierarchyPath(_) => FilterType::HierarchyPath,
        }
    }

    /// Plain scalar filters are matched by the dimension itself; every other
    /// variant carries its own predicate.
    #[must_use]
    pub fn is_predicate_shaped(&self) -> bool {
        !matches!(self, Self::Exact(_))
    }

    #[must_use]
    pub fn is_filtered(&self, value: &FilterValue) -> bool {
        match self {
            Self::Exact(stored) => stored.loosely_equals(value),
            Self::Ranged(filter) => filter.is_filtered(value),
            Self::TwoDimensional(filter) => filter.is_filtered(value),
            Self::RangedTwoDimensional(filter) => filter.is_filtered(value),
            Self::HierarchyPath(filter) => filter.is_filtered(value),
        }
    }

    /// Value equality used to probe and remove stored filters.
    #[must_use]
    pub fn loosely_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a.loosely_equals(b),
            _ => self == other,
        }
    }

    /// Numeric `[low, high)` of a ranged filter, as used for axis domains.
    #[must_use]
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Ranged(filter) => filter.numeric_bounds(),
            Self::RangedTwoDimensional(filter) if filter.is_one_dimensional() => {
                Some((filter.x0.0, filter.x1.0))
            }
            _ => None,
        }
    }

    /// Shaped array form of the filter value.
    #[must_use]
    pub fn to_value(&self) -> FilterValue {
        match self {
            Self::Exact(value) => value.clone(),
            Self::Ranged(filter) => FilterValue::list([filter.low.clone(), filter.high.clone()]),
            Self::TwoDimensional(filter) => {
                FilterValue::list([filter.x.clone(), filter.y.clone()])
            }
            Self::RangedTwoDimensional(filter) => {
                let [x0, y0] = filter.bottom_left();
                let [x1, y1] = filter.top_right();
                if filter.is_one_dimensional() {
                    FilterValue::list([FilterValue::number(x0), FilterValue::number(x1)])
                } else {
                    FilterValue::list([FilterValue::point(x0, y0), FilterValue::point(x1, y1)])
                }
            }
            Self::HierarchyPath(filter) => FilterValue::list(filter.path.iter().cloned()),
        }
    }
}

impl From<FilterValue> for Filter {
    fn from(value: FilterValue) -> Self {
        Self::Exact(value)
    }
}

impl From<f64> for Filter {
    fn from(value: f64) -> Self {
        Self::Exact(value.into())
    }
}

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        Self::Exact(value.into())
    }
}
