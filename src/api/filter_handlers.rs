use std::rc::Rc;

use tracing::trace;

use crate::core::{Dimension, Filter};

/// Pushes a chart's whole filter list to its dimension and returns the list
/// the chart keeps.
pub trait FilterHandler {
    fn apply(&self, dimension: &mut dyn Dimension, filters: Vec<Filter>) -> Vec<Filter>;
}

/// Answers "is the chart filtered", optionally by one specific filter.
pub trait HasFilterHandler {
    fn has(&self, filters: &[Filter], probe: Option<&Filter>) -> bool;
}

pub trait AddFilterHandler {
    fn add(&self, filters: Vec<Filter>, filter: Filter) -> Vec<Filter>;
}

pub trait RemoveFilterHandler {
    fn remove(&self, filters: Vec<Filter>, filter: &Filter) -> Vec<Filter>;
}

pub trait ResetFilterHandler {
    fn reset(&self, filters: Vec<Filter>) -> Vec<Filter>;
}

impl<F> FilterHandler for F
where
    F: Fn(&mut dyn Dimension, Vec<Filter>) -> Vec<Filter>,
{
    fn apply(&self, dimension: &mut dyn Dimension, filters: Vec<Filter>) -> Vec<Filter> {
        self(dimension, filters)
    }
}

impl<F> HasFilterHandler for F
where
    F: Fn(&[Filter], Option<&Filter>) -> bool,
{
    fn has(&self, filters: &[Filter], probe: Option<&Filter>) -> bool {
        self(filters, probe)
    }
}

impl<F> AddFilterHandler for F
where
    F: Fn(Vec<Filter>, Filter) -> Vec<Filter>,
{
    fn add(&self, filters: Vec<Filter>, filter: Filter) -> Vec<Filter> {
        self(filters, filter)
    }
}

impl<F> RemoveFilterHandler for F
where
    F: Fn(Vec<Filter>, &Filter) -> Vec<Filter>,
{
    fn remove(&self, filters: Vec<Filter>, filter: &Filter) -> Vec<Filter> {
        self(filters, filter)
    }
}

impl<F> ResetFilterHandler for F
where
    F: Fn(Vec<Filter>) -> Vec<Filter>,
{
    fn reset(&self, filters: Vec<Filter>) -> Vec<Filter> {
        self(filters)
    }
}

/// Clears the dimension for an empty list, uses the dimension's own exact or
/// range filter for a single plain filter, and installs an any-of predicate
/// otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilterHandler;

impl FilterHandler for DefaultFilterHandler {
    fn apply(&self, dimension: &mut dyn Dimension, filters: Vec<Filter>) -> Vec<Filter> {
        trace!(filters = filters.len(), "applying filters to dimension");
        match filters.as_slice() {
            [] => dimension.clear_filter(),
            [Filter::Exact(value)] => dimension.filter_exact(value),
            [Filter::Ranged(range)] => dimension.filter_range(&range.low, &range.high),
            _ => {
                let snapshot = filters.clone();
                dimension.filter_function(Box::new(move |value| {
                    snapshot.iter().any(|filter| filter.is_filtered(value))
                }));
            }
        }
        filters
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHasFilterHandler;

impl HasFilterHandler for DefaultHasFilterHandler {
    fn has(&self, filters: &[Filter], probe: Option<&Filter>) -> bool {
        match probe {
            None => !filters.is_empty(),
            Some(probe) => filters.iter().any(|filter| filter.loosely_equals(probe)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAddFilterHandler;

impl AddFilterHandler for DefaultAddFilterHandler {
    fn add(&self, mut filters: Vec<Filter>, filter: Filter) -> Vec<Filter> {
        filters.push(filter);
        filters
    }
}

/// Removes the first stored filter equal to the given one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRemoveFilterHandler;

impl RemoveFilterHandler for DefaultRemoveFilterHandler {
    fn remove(&self, mut filters: Vec<Filter>, filter: &Filter) -> Vec<Filter> {
        if let Some(index) = filters.iter().position(|stored| stored.loosely_equals(filter)) {
            filters.remove(index);
        }
        filters
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResetFilterHandler;

impl ResetFilterHandler for DefaultResetFilterHandler {
    fn reset(&self, _filters: Vec<Filter>) -> Vec<Filter> {
        Vec::new()
    }
}

/// The five replaceable strategies of a chart's filter pipeline.
#[derive(Clone)]
pub struct FilterHandlers {
    pub filter: Rc<dyn FilterHandler>,
    pub has: Rc<dyn HasFilterHandler>,
    pub add: Rc<dyn AddFilterHandler>,
    pub remove: Rc<dyn RemoveFilterHandler>,
    pub reset: Rc<dyn ResetFilterHandler>,
}

impl Default for FilterHandlers {
    fn default() -> Self {
        Self {
            filter: Rc::new(DefaultFilterHandler),
            has: Rc::new(DefaultHasFilterHandler),
            add: Rc::new(DefaultAddFilterHandler),
            remove: Rc::new(DefaultRemoveFilterHandler),
            reset: Rc::new(DefaultResetFilterHandler),
        }
    }
}

impl std::fmt::Debug for FilterHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterHandlers").finish_non_exhaustive()
    }
}
