pub mod dimension;
pub mod filter;
pub mod primitives;
pub mod scale;
pub mod stack;
pub mod types;
pub mod value;

pub use dimension::{
    Dimension, DimensionCall, DimensionHandle, Group, GroupHandle, GroupRow, Predicate,
    RecordingDimension, StaticGroup,
};
pub use filter::{
    Filter, FilterType, HierarchyFilter, RangedFilter, RangedTwoDimensionalFilter,
    TwoDimensionalFilter,
};
pub use scale::{LinearScale, OrdinalScale, XScale, XUnits};
pub use stack::{
    LayerSample, StackCell, StackLayout, StackOffset, StackPoint, stack_layers,
};
pub use types::{ChartId, Margins, Viewport};
pub use value::FilterValue;
