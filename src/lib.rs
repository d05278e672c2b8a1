//! linked-charts: the interaction core of crossfilter-style dashboards.
//!
//! Charts share filters through dimensions, coordinate redraws through
//! chart groups, and translate brush and zoom gestures into filters on a
//! coordinate grid. Drawing is delegated to a [`render::ChartRenderer`].

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{Chart, ChartConfig, Dashboard, DashboardConfig, GridConfig};
pub use core::{ChartId, Filter, FilterValue};
pub use error::{ChartError, ChartResult};
