use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::core::{
    ChartId, DimensionHandle, Filter, FilterValue, GroupHandle, GroupRow, Viewport,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{ChartFrame, ChartRenderer, RenderPass, Transition};

use super::{
    AddFilterHandler, AxisExtents, ChartConfig, ChartEvent, ChartListeners, CoordinateGrid,
    FilterChange, FilterHandler, FilterHandlers, GridConfig, HasFilterHandler,
    RemoveFilterHandler, ResetFilterHandler,
};

/// Extracts the x key of a group row.
pub type KeyAccessor = Rc<dyn Fn(&GroupRow) -> FilterValue>;
/// Extracts the plotted value of a group row; `None` is not drawn.
pub type ValueAccessor = Rc<dyn Fn(&GroupRow) -> Option<f64>>;

/// Filter mutation requested through [`super::Dashboard::filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCommand {
    /// Drops every active filter.
    Reset,
    /// Adds the filter if absent, removes it if present.
    Toggle(Filter),
    /// Toggles each filter independently, in order.
    ToggleEach(Vec<Filter>),
}

/// A chart widget: filter pipeline, listeners and the render/redraw
/// lifecycle.
///
/// Filters only change through the owning [`super::Dashboard`], which keeps
/// range/focus links in step with every change.
pub struct Chart {
    id: ChartId,
    anchor: String,
    config: ChartConfig,
    container: Viewport,
    width_cache: Cell<Option<u32>>,
    height_cache: Cell<Option<u32>>,
    dimension: Option<DimensionHandle>,
    group: Option<GroupHandle>,
    group_name: Option<String>,
    key_accessor: KeyAccessor,
    value_accessor: ValueAccessor,
    filters: Vec<Filter>,
    handlers: FilterHandlers,
    listeners: ChartListeners,
    renderer: Box<dyn ChartRenderer>,
    grid: Option<CoordinateGrid>,
    transitions_disabled: bool,
}

impl Chart {
    pub fn new(anchor: impl Into<String>, renderer: impl ChartRenderer + 'static) -> Self {
        Self {
            id: ChartId(0),
            anchor: anchor.into(),
            config: ChartConfig::default(),
            container: Viewport::default(),
            width_cache: Cell::new(None),
            height_cache: Cell::new(None),
            dimension: None,
            group: None,
            group_name: None,
            key_accessor: Rc::new(|row: &GroupRow| row.key.clone()),
            value_accessor: Rc::new(GroupRow::numeric_value),
            filters: Vec::new(),
            handlers: FilterHandlers::default(),
            listeners: ChartListeners::default(),
            renderer: Box::new(renderer),
            grid: None,
            transitions_disabled: false,
        }
    }

    /// Axis-based chart with brush, zoom and stacked layers.
    pub fn coordinate_grid(
        anchor: impl Into<String>,
        renderer: impl ChartRenderer + 'static,
        config: GridConfig,
    ) -> ChartResult<Self> {
        let mut chart = Self::new(anchor, renderer);
        chart.grid = Some(CoordinateGrid::new(config)?);
        Ok(chart)
    }

    #[must_use]
    pub fn id(&self) -> ChartId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ChartId) {
        self.id = id;
    }

    #[must_use]
    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub(crate) fn set_anchor(&mut self, anchor: &str) {
        anchor.clone_into(&mut self.anchor);
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ChartConfig) -> ChartResult<()> {
        config.validate()?;
        self.config = config;
        self.invalidate_size();
        Ok(())
    }

    /// Size of the element the chart is anchored to.
    pub fn set_container(&mut self, container: Viewport) {
        self.container = container;
        self.invalidate_size();
    }

    /// Fixed width, else the container width floored at `min_width` and at
    /// one pixel.
    #[must_use]
    pub fn width(&self) -> u32 {
        if let Some(width) = self.config.width {
            return width;
        }
        if let Some(width) = self.width_cache.get() {
            return width;
        }
        let width = self.container.width.max(self.config.min_width).max(1);
        self.width_cache.set(Some(width));
        width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        if let Some(height) = self.config.height {
            return height;
        }
        if let Some(height) = self.height_cache.get() {
            return height;
        }
        let height = self.container.height.max(self.config.min_height).max(1);
        self.height_cache.set(Some(height));
        height
    }

    fn invalidate_size(&self) {
        self.width_cache.set(None);
        self.height_cache.set(None);
    }

    #[must_use]
    pub fn dimension(&self) -> Option<&DimensionHandle> {
        self.dimension.as_ref()
    }

    pub fn set_dimension(&mut self, dimension: DimensionHandle) {
        self.dimension = Some(dimension);
        self.invalidate_size();
    }

    #[must_use]
    pub fn group(&self) -> Option<&GroupHandle> {
        self.group.as_ref()
    }

    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group_name.as_deref()
    }

    /// Sets the aggregate source. On grid charts this also resets the stack
    /// to a single layer built from `group`.
    pub fn set_group(&mut self, group: GroupHandle, name: Option<&str>) {
        if let Some(grid) = self.grid.as_mut() {
            grid.set_base_layer(Rc::clone(&group), name);
        }
        self.group = Some(group);
        self.group_name = name.map(str::to_owned);
        self.invalidate_size();
    }

    pub fn set_key_accessor(&mut self, accessor: impl Fn(&GroupRow) -> FilterValue + 'static) {
        self.key_accessor = Rc::new(accessor);
    }

    pub fn set_value_accessor(&mut self, accessor: impl Fn(&GroupRow) -> Option<f64> + 'static) {
        self.value_accessor = Rc::new(accessor);
    }

    #[must_use]
    pub fn key_accessor(&self) -> &KeyAccessor {
        &self.key_accessor
    }

    #[must_use]
    pub fn value_accessor(&self) -> &ValueAccessor {
        &self.value_accessor
    }

    pub fn set_filter_handler(&mut self, handler: impl FilterHandler + 'static) {
        self.handlers.filter = Rc::new(handler);
    }

    pub fn set_has_filter_handler(&mut self, handler: impl HasFilterHandler + 'static) {
        self.handlers.has = Rc::new(handler);
    }

    pub fn set_add_filter_handler(&mut self, handler: impl AddFilterHandler + 'static) {
        self.handlers.add = Rc::new(handler);
    }

    pub fn set_remove_filter_handler(&mut self, handler: impl RemoveFilterHandler + 'static) {
        self.handlers.remove = Rc::new(handler);
    }

    pub fn set_reset_filter_handler(&mut self, handler: impl ResetFilterHandler + 'static) {
        self.handlers.reset = Rc::new(handler);
    }

    /// Registers a listener under `"event"` or `"event.namespace"`.
    pub fn on(
        &mut self,
        spec: &str,
        listener: impl FnMut(&ChartEvent) + 'static,
    ) -> ChartResult<()> {
        self.listeners.on(spec, Box::new(listener))
    }

    pub fn off(&mut self, spec: &str) -> ChartResult<bool> {
        self.listeners.off(spec)
    }

    pub(crate) fn emit(&mut self, event: ChartEvent) {
        self.listeners.emit(&event);
    }

    #[must_use]
    pub fn grid(&self) -> Option<&CoordinateGrid> {
        self.grid.as_ref()
    }

    pub fn grid_mut(&mut self) -> Option<&mut CoordinateGrid> {
        self.grid.as_mut()
    }

    #[must_use]
    pub fn is_coordinate_grid(&self) -> bool {
        self.grid.is_some()
    }

    pub(crate) fn set_transitions_disabled(&mut self, disabled: bool) {
        self.transitions_disabled = disabled;
    }

    #[must_use]
    pub fn transition(&self) -> Transition {
        if self.transitions_disabled {
            return Transition::default();
        }
        Transition {
            duration_ms: self.config.transition_duration_ms,
            delay_ms: self.config.transition_delay_ms,
        }
    }

    /// First active filter.
    #[must_use]
    pub fn filter(&self) -> Option<&Filter> {
        self.filters.first()
    }

    /// Active filters in toggle order.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// With no probe: whether any filter is active.
    #[must_use]
    pub fn has_filter(&self, probe: Option<&Filter>) -> bool {
        self.handlers.has.has(&self.filters, probe)
    }

    /// Runs one filter mutation through the handler pipeline, applies the
    /// result to the dimension and notifies `filtered` listeners.
    pub(crate) fn apply_filter(&mut self, command: FilterCommand) {
        let handlers = self.handlers.clone();
        let mut filters = std::mem::take(&mut self.filters);
        let change = match command {
            FilterCommand::Reset => {
                filters = handlers.reset.reset(filters);
                FilterChange::Reset
            }
            FilterCommand::Toggle(filter) => {
                filters = toggle(&handlers, filters, filter.clone());
                FilterChange::Toggled(filter)
            }
            FilterCommand::ToggleEach(each) => {
                for filter in &each {
                    filters = toggle(&handlers, filters, filter.clone());
                }
                FilterChange::ToggledEach(each)
            }
        };
        self.filters = self.apply_to_dimension(filters);
        trace!(chart = %self.id, filters = self.filters.len(), "filters changed");
        self.emit(ChartEvent::Filtered {
            chart: self.id,
            change,
            filters: self.filters.clone(),
        });
    }

    /// Resets and sets `filter` in one pass, touching the dimension once.
    pub(crate) fn replace_filter(&mut self, filter: Option<Filter>) {
        let filters = std::mem::take(&mut self.filters);
        self.filters = self.handlers.reset.reset(filters);
        let command = match filter {
            Some(filter) => FilterCommand::Toggle(filter),
            None => FilterCommand::Reset,
        };
        self.apply_filter(command);
    }

    fn apply_to_dimension(&self, filters: Vec<Filter>) -> Vec<Filter> {
        let Some(dimension) = &self.dimension else {
            debug!(chart = %self.id, "no dimension set, keeping filters unapplied");
            return filters;
        };
        match dimension.try_borrow_mut() {
            Ok(mut dimension) => self.handlers.filter.apply(&mut *dimension, filters),
            Err(_) => {
                warn!(chart = %self.id, "dimension is already borrowed, filters were not applied");
                filters
            }
        }
    }

    /// Data extents across the visible layers, axis padding applied.
    #[must_use]
    pub fn axis_extents(&self) -> Option<AxisExtents> {
        self.grid
            .as_ref()
            .map(|grid| grid.axis_extents(&self.key_accessor, &self.value_accessor))
    }

    #[must_use]
    pub fn x_axis_min(&self) -> Option<f64> {
        self.axis_extents()?.x.map(|(min, _)| min)
    }

    #[must_use]
    pub fn x_axis_max(&self) -> Option<f64> {
        self.axis_extents()?.x.map(|(_, max)| max)
    }

    #[must_use]
    pub fn y_axis_min(&self) -> Option<f64> {
        self.axis_extents()?.y.map(|(min, _)| min)
    }

    #[must_use]
    pub fn y_axis_max(&self) -> Option<f64> {
        self.axis_extents()?.y.map(|(_, max)| max)
    }

    fn check_mandatory_attributes(&self) -> ChartResult<()> {
        let missing = if self.dimension.is_none() {
            Some("dimension")
        } else if self.group.is_none() {
            Some("group")
        } else if self.grid.as_ref().is_some_and(|grid| grid.x().is_none()) {
            Some("x")
        } else {
            None
        };
        match missing {
            Some(attribute) => Err(ChartError::InvalidState {
                anchor: self.anchor.clone(),
                attribute,
            }),
            None => Ok(()),
        }
    }

    /// Full rebuild: `preRender`, mandatory checks, draw, then
    /// `pretransition`, `renderlet` and `postRender`.
    pub fn render(&mut self) -> ChartResult<()> {
        self.invalidate_size();
        debug!(chart = %self.id, anchor = %self.anchor, "rendering chart");
        self.emit(ChartEvent::PreRender { chart: self.id });
        self.check_mandatory_attributes()?;
        let frame = self.build_frame(RenderPass::Render)?;
        self.renderer.draw(&frame)?;
        self.activate_renderlets(ChartEvent::PostRender { chart: self.id });
        Ok(())
    }

    /// Incremental update against the current filters and data.
    pub fn redraw(&mut self) -> ChartResult<()> {
        debug!(chart = %self.id, anchor = %self.anchor, "redrawing chart");
        self.emit(ChartEvent::PreRedraw { chart: self.id });
        let frame = self.build_frame(RenderPass::Redraw)?;
        self.renderer.draw(&frame)?;
        self.activate_renderlets(ChartEvent::PostRedraw { chart: self.id });
        Ok(())
    }

    fn activate_renderlets(&mut self, event: ChartEvent) {
        self.emit(ChartEvent::Pretransition { chart: self.id });
        self.emit(ChartEvent::Renderlet { chart: self.id });
        self.emit(event);
    }

    fn build_frame(&mut self, pass: RenderPass) -> ChartResult<ChartFrame> {
        let viewport = Viewport::new(self.width(), self.height());
        let transition = self.transition();
        let rows = self
            .group
            .as_ref()
            .map(|group| group.all())
            .unwrap_or_default();
        let animate = pass == RenderPass::Redraw && transition.duration_ms > 0;
        let plot = match self.grid.as_mut() {
            Some(grid) => Some(grid.prepare_frame(
                &self.anchor,
                pass,
                viewport,
                self.filters.first(),
                (&self.key_accessor, &self.value_accessor),
                animate,
            )?),
            None => None,
        };
        Ok(ChartFrame {
            chart: self.id,
            anchor: self.anchor.clone(),
            pass,
            viewport,
            transition,
            filters: self.filters.clone(),
            rows,
            plot,
        })
    }
}

fn toggle(handlers: &FilterHandlers, filters: Vec<Filter>, filter: Filter) -> Vec<Filter> {
    if handlers.has.has(&filters, Some(&filter)) {
        handlers.remove.remove(filters, &filter)
    } else {
        handlers.add.add(filters, filter)
    }
}

impl fmt::Debug for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("id", &self.id)
            .field("anchor", &self.anchor)
            .field("config", &self.config)
            .field("filters", &self.filters)
            .field("listeners", &self.listeners)
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}
