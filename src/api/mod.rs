//! Chart-facing API: charts, the dashboard that owns them, and the
//! filter/brush/zoom coordination between linked charts.

mod chart;
mod chart_config;
mod chart_events;
mod chart_registry;
mod coordinate_grid;
mod dashboard;
mod dashboard_snapshot;
mod filter_handlers;
mod grid_interaction_coordinator;
mod stack_layers;

pub use chart::{Chart, FilterCommand, KeyAccessor, ValueAccessor};
pub use chart_config::{ChartConfig, DashboardConfig, GridConfig, ZoomScaleExtent};
pub use chart_events::{ChartEvent, ChartEventKind, ChartListener, ChartListeners, FilterChange};
pub use chart_registry::{ChartGroupRegistry, DEFAULT_CHART_GROUP, RegisteredChart, group_name};
pub use coordinate_grid::{AxisExtents, CoordinateGrid, RoundFn};
pub use dashboard::{Dashboard, GroupPassReport, ThrottledAction};
pub use dashboard_snapshot::{
    ChartSnapshot, DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1, DashboardSnapshot,
    DashboardSnapshotJsonContractV1,
};
pub use filter_handlers::{
    AddFilterHandler, DefaultAddFilterHandler, DefaultFilterHandler, DefaultHasFilterHandler,
    DefaultRemoveFilterHandler, DefaultResetFilterHandler, FilterHandler, FilterHandlers,
    HasFilterHandler, RemoveFilterHandler, ResetFilterHandler,
};
pub use stack_layers::{StackLayer, StackLayers};
