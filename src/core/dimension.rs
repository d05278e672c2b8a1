//! Boundary with the external multidimensional query engine.
//!
//! Charts never own records or aggregates. They hold shared handles to a
//! [`Dimension`] (filterable key space) and a [`Group`] (aggregate rows), and
//! the filter handler is the only code allowed to mutate the dimension.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::FilterValue;

pub type Predicate = Box<dyn Fn(&FilterValue) -> bool>;

/// Shared, mutable handle; several charts may reference the same dimension.
pub type DimensionHandle = Rc<RefCell<dyn Dimension>>;

pub type GroupHandle = Rc<dyn Group>;

pub trait Dimension {
    fn clear_filter(&mut self);
    fn filter_exact(&mut self, value: &FilterValue);
    /// Half-open `[low, high)`.
    fn filter_range(&mut self, low: &FilterValue, high: &FilterValue);
    fn filter_function(&mut self, predicate: Predicate);

    /// `None` clears the dimension filter.
    fn filter(&mut self, predicate: Option<Predicate>) {
        match predicate {
            Some(predicate) => self.filter_function(predicate),
            None => self.clear_filter(),
        }
    }
}

/// One aggregate row. The reduced value keeps whatever shape the reducer
/// produced; accessors extract numbers from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: FilterValue,
    pub value: Value,
}

impl GroupRow {
    #[must_use]
    pub fn new(key: impl Into<FilterValue>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_f64()
    }
}

pub trait Group {
    /// Rows ordered by key.
    fn all(&self) -> Vec<GroupRow>;

    fn top(&self, n: usize) -> Vec<GroupRow> {
        let mut rows = self.all();
        rows.sort_by(|a, b| compare_numeric(b, a));
        rows.truncate(n);
        rows
    }

    fn bottom(&self, n: usize) -> Vec<GroupRow> {
        let mut rows = self.all();
        rows.sort_by(compare_numeric);
        rows.truncate(n);
        rows
    }
}

fn compare_numeric(a: &GroupRow, b: &GroupRow) -> Ordering {
    let a = a.numeric_value().unwrap_or(f64::NEG_INFINITY);
    let b = b.numeric_value().unwrap_or(f64::NEG_INFINITY);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Call observed by a [`RecordingDimension`].
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionCall {
    Clear,
    Exact(FilterValue),
    Range(FilterValue, FilterValue),
    Function,
}

/// Headless dimension used by tests and hosts without a query engine.
///
/// It records every call and keeps the active predicate so callers can ask
/// which keys are currently selected.
#[derive(Default)]
pub struct RecordingDimension {
    keys: Vec<FilterValue>,
    calls: Vec<DimensionCall>,
    active: Option<Predicate>,
}

impl RecordingDimension {
    #[must_use]
    pub fn new(keys: Vec<FilterValue>) -> Self {
        Self {
            keys,
            calls: Vec::new(),
            active: None,
        }
    }

    #[must_use]
    pub fn shared(keys: Vec<FilterValue>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(keys)))
    }

    #[must_use]
    pub fn calls(&self) -> &[DimensionCall] {
        &self.calls
    }

    #[must_use]
    pub fn last_call(&self) -> Option<&DimensionCall> {
        self.calls.last()
    }

    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.active.is_some()
    }

    /// Whether `key` passes the active filter; everything passes when clear.
    #[must_use]
    pub fn accepts(&self, key: &FilterValue) -> bool {
        self.active.as_ref().is_none_or(|predicate| predicate(key))
    }

    #[must_use]
    pub fn selected_keys(&self) -> Vec<FilterValue> {
        self.keys
            .iter()
            .filter(|key| self.accepts(key))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for RecordingDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingDimension")
            .field("keys", &self.keys)
            .field("calls", &self.calls)
            .field("filtered", &self.active.is_some())
            .finish()
    }
}

impl Dimension for RecordingDimension {
    fn clear_filter(&mut self) {
        self.calls.push(DimensionCall::Clear);
        self.active = None;
    }

    fn filter_exact(&mut self, value: &FilterValue) {
        self.calls.push(DimensionCall::Exact(value.clone()));
        let value = value.clone();
        self.active = Some(Box::new(move |key| key.loosely_equals(&value)));
    }

    fn filter_range(&mut self, low: &FilterValue, high: &FilterValue) {
        self.calls
            .push(DimensionCall::Range(low.clone(), high.clone()));
        let (low, high) = (low.clone(), high.clone());
        self.active = Some(Box::new(move |key| {
            matches!(low.compare(key), Some(Ordering::Less | Ordering::Equal))
                && matches!(high.compare(key), Some(Ordering::Greater))
        }));
    }

    fn filter_function(&mut self, predicate: Predicate) {
        self.calls.push(DimensionCall::Function);
        self.active = Some(predicate);
    }
}

/// Group over a fixed set of rows; rows can be swapped to simulate a
/// re-aggregation after another chart filtered.
#[derive(Debug, Default)]
pub struct StaticGroup {
    rows: RefCell<Vec<GroupRow>>,
}

impl StaticGroup {
    #[must_use]
    pub fn new(rows: Vec<GroupRow>) -> Self {
        Self {
            rows: RefCell::new(rows),
        }
    }

    /// Builds rows from numeric `(key, value)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(key, value)| GroupRow::new(key, value))
                .collect(),
        )
    }

    pub fn set_rows(&self, rows: Vec<GroupRow>) {
        *self.rows.borrow_mut() = rows;
    }
}

impl Group for StaticGroup {
    fn all(&self) -> Vec<GroupRow> {
        self.rows.borrow().clone()
    }
}
