use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::core::{
    ChartId, Filter, GroupHandle, LinearScale, Viewport, XScale, XUnits,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    BrushEvent, BrushMode, BrushSelection, BrushState, InteractionMode, InteractionState,
    ZoomBehavior, ZoomEvent, ZoomTransform, admits,
};
use crate::render::{PlotFrame, RenderPass, XDomain};

use super::stack_layers::{StackLayers, ordinal_keys, stack_frames, x_extent};
use super::{GridConfig, KeyAccessor, ValueAccessor};

/// Rounds a domain value, e.g. to snap brush edges to whole units.
pub type RoundFn = Rc<dyn Fn(f64) -> f64>;

/// Axis, brush and zoom state of a coordinate-grid chart.
///
/// The original x domain is snapshotted whenever a scale is assigned; zoom
/// and focus only move the active domain, so the snapshot is what "zoom
/// out" and [`CoordinateGrid::refocused`] compare against.
pub struct CoordinateGrid {
    config: GridConfig,
    x: Option<XScale>,
    x_original_domain: Option<(f64, f64)>,
    y: LinearScale,
    x_units: XUnits,
    round: Option<RoundFn>,
    brush: BrushState,
    zoom: Option<ZoomBehavior>,
    orig_x: Option<LinearScale>,
    range_chart: Option<ChartId>,
    focus_chart: Option<ChartId>,
    interaction: InteractionState,
    stack: StackLayers,
    plot_size: (f64, f64),
}

/// Data extents of a grid chart, padding applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisExtents {
    pub x: Option<(f64, f64)>,
    pub y: Option<(f64, f64)>,
}

impl CoordinateGrid {
    pub fn new(config: GridConfig) -> ChartResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            x: None,
            x_original_domain: None,
            y: LinearScale::new(0.0, 1.0)?,
            x_units: XUnits::default(),
            round: None,
            brush: BrushState::default(),
            zoom: None,
            orig_x: None,
            range_chart: None,
            focus_chart: None,
            interaction: InteractionState::default(),
            stack: StackLayers::default(),
            plot_size: (0.0, 0.0),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Takes effect on the next render.
    pub fn set_config(&mut self, config: GridConfig) -> ChartResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    #[must_use]
    pub fn x(&self) -> Option<&XScale> {
        self.x.as_ref()
    }

    /// Assigns the x scale and snapshots its domain as the original one.
    pub fn set_x(&mut self, x: XScale) {
        self.x_original_domain = x.continuous_domain();
        self.x = Some(x);
        self.orig_x = None;
        self.rescale();
    }

    #[must_use]
    pub fn x_original_domain(&self) -> Option<(f64, f64)> {
        self.x_original_domain
    }

    /// Active continuous x domain.
    #[must_use]
    pub fn x_domain(&self) -> Option<(f64, f64)> {
        self.x.as_ref().and_then(XScale::continuous_domain)
    }

    /// Moves the active x domain, keeping the original snapshot.
    pub fn set_x_domain(&mut self, start: f64, end: f64) -> ChartResult<()> {
        match self.x.as_mut() {
            Some(XScale::Linear(scale)) => {
                scale.set_domain(start, end)?;
                self.rescale();
                Ok(())
            }
            Some(XScale::Ordinal(_)) | None => Err(ChartError::InvalidData(
                "continuous x domain requires a linear x scale".to_owned(),
            )),
        }
    }

    /// Restores the original x domain.
    pub fn reset_x_domain(&mut self) {
        if let (Some(XScale::Linear(scale)), Some((start, end))) =
            (self.x.as_mut(), self.x_original_domain)
            && scale.domain() != (start, end)
            && scale.set_domain(start, end).is_ok()
        {
            self.brush.request_resize();
        }
    }

    #[must_use]
    pub fn is_ordinal(&self) -> bool {
        self.x.as_ref().is_some_and(XScale::is_ordinal)
    }

    /// Whether the active x domain differs from the original one.
    #[must_use]
    pub fn refocused(&self) -> bool {
        match (self.x_domain(), self.x_original_domain) {
            (Some(current), Some(original)) => current != original,
            _ => false,
        }
    }

    #[must_use]
    pub fn y(&self) -> LinearScale {
        self.y
    }

    pub fn set_y(&mut self, y: LinearScale) {
        self.y = y;
    }

    #[must_use]
    pub fn x_units(&self) -> XUnits {
        self.x_units
    }

    pub fn set_x_units(&mut self, units: XUnits) {
        self.x_units = units;
    }

    #[must_use]
    pub fn round(&self) -> Option<&RoundFn> {
        self.round.as_ref()
    }

    pub fn set_round(&mut self, round: Option<RoundFn>) {
        self.round = round;
    }

    #[must_use]
    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    #[must_use]
    pub fn zoom(&self) -> Option<&ZoomBehavior> {
        self.zoom.as_ref()
    }

    #[must_use]
    pub fn range_chart(&self) -> Option<ChartId> {
        self.range_chart
    }

    #[must_use]
    pub fn focus_chart(&self) -> Option<ChartId> {
        self.focus_chart
    }

    pub(crate) fn set_range_chart(&mut self, range: Option<ChartId>) {
        self.range_chart = range;
    }

    pub(crate) fn set_focus_chart(&mut self, focus: Option<ChartId>) {
        self.focus_chart = focus;
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    #[must_use]
    pub fn stack_layers(&self) -> &StackLayers {
        &self.stack
    }

    pub(crate) fn set_base_layer(&mut self, group: GroupHandle, name: Option<&str>) {
        self.stack.set_base(group, name);
    }

    /// Adds a layer above the chart's own group.
    pub fn stack(&mut self, group: GroupHandle, name: Option<&str>, accessor: Option<ValueAccessor>) {
        self.stack.stack(group, name, accessor);
    }

    /// Hides a layer when the chart allows it; returns whether a layer changed.
    pub fn hide_stack(&mut self, name: &str) -> bool {
        if !self.config.hidable_stacks {
            trace!(layer = name, "stacks are not hidable");
            return false;
        }
        self.stack.hide_stack(name)
    }

    pub fn show_stack(&mut self, name: &str) -> bool {
        self.stack.show_stack(name)
    }

    /// Marks the brush region for resizing on the next handle redraw.
    pub fn rescale(&mut self) {
        self.brush.request_resize();
    }

    #[must_use]
    pub fn brush_is_empty(&self, selection: Option<BrushSelection>) -> bool {
        match selection {
            None => true,
            Some(BrushSelection::X { x0, x1 }) => x1 <= x0,
            Some(BrushSelection::XY { x0, y0, x1, y1 }) => x0 == x1 || y0 == y1,
        }
    }

    /// Applies the rounding function to both edges of a domain selection.
    #[must_use]
    pub fn extend_brush(&self, domain: (f64, f64)) -> (f64, f64) {
        match &self.round {
            Some(round) if !self.config.center_bar || self.config.always_use_rounding => {
                (round(domain.0), round(domain.1))
            }
            _ => domain,
        }
    }

    /// Moves the brush handles to the pixel projection of `filter`, or hides
    /// them. Safe outside a gesture: no brush callback is raised.
    pub fn redraw_brush(&mut self, filter: Option<&Filter>, animate: bool) {
        if !self.brush.is_attached() {
            return;
        }
        if self.brush.resize_pending() {
            self.brush.attach(self.plot_size.0, self.plot_size.1);
        }
        let selection = filter.and_then(|filter| self.selection_for(filter));
        self.brush.move_to(selection, animate);
    }

    fn selection_for(&self, filter: &Filter) -> Option<BrushSelection> {
        let x = self.x.as_ref()?.as_linear()?;
        match (self.config.brush_mode, filter) {
            (BrushMode::XY, Filter::RangedTwoDimensional(ranged)) if !ranged.is_one_dimensional() => {
                let [x0, y0] = ranged.bottom_left();
                let [x1, y1] = ranged.top_right();
                Some(BrushSelection::XY {
                    x0: x.apply(x0),
                    y0: self.y.apply(y1),
                    x1: x.apply(x1),
                    y1: self.y.apply(y0),
                })
            }
            _ => {
                let (start, end) = filter.numeric_range()?;
                Some(BrushSelection::X {
                    x0: x.apply(start),
                    x1: x.apply(end),
                })
            }
        }
    }

    /// Turns a brush callback into the filter it selects.
    ///
    /// `None` means the callback was ignored. `Some(None)` is an empty
    /// selection, which clears the filter.
    pub(crate) fn brush_filter(&mut self, event: &BrushEvent) -> Option<Option<Filter>> {
        if !admits("brush", event.source) {
            return None;
        }
        if !self.config.brush_on || self.is_ordinal() {
            trace!("brushing is disabled on this chart");
            return None;
        }
        let x = self.x.as_ref()?.as_linear()?;
        self.interaction.on_brush_phase(event.phase);

        let filter = match event.selection {
            None => {
                self.brush.move_to(None, false);
                None
            }
            Some(BrushSelection::X { x0, x1 }) => {
                let (start, end) = self.extend_brush((x.invert(x0), x.invert(x1)));
                let selection = BrushSelection::X {
                    x0: x.apply(start),
                    x1: x.apply(end),
                };
                self.brush.move_to(Some(selection), false);
                (end > start).then(|| Filter::ranged(start, end))
            }
            Some(BrushSelection::XY { x0, y0, x1, y1 }) => {
                let (start, end) = self.extend_brush((x.invert(x0), x.invert(x1)));
                let (top, bottom) = (self.y.invert(y0), self.y.invert(y1));
                self.brush.move_to(event.selection, false);
                (start != end && top != bottom)
                    .then(|| Filter::ranged_two_dimensional([start, bottom], [end, top]))
            }
        };
        Some(filter)
    }

    /// Applies a zoom callback and returns the x domain it selects, or
    /// `None` when the callback was ignored.
    pub(crate) fn zoom_domain(&mut self, event: &ZoomEvent) -> Option<(f64, f64)> {
        if !admits("zoom", event.source) {
            return None;
        }
        if !self.config.mouse_zoomable {
            trace!("mouse zoom is disabled on this chart");
            return None;
        }
        let (Some(zoom), Some(orig_x)) = (self.zoom.as_mut(), self.orig_x) else {
            return None;
        };
        self.interaction.on_zoom_phase(event.phase);
        let transform = zoom.apply(event.gesture);
        Some(transform.rescale_x(orig_x))
    }

    /// Clamps a focus range into the original domain and then into the
    /// linked range chart's domain. A range that misses either limit
    /// resets the focus.
    pub(crate) fn restrict_focus(
        &self,
        range: Option<(f64, f64)>,
        range_chart_domain: Option<(f64, f64)>,
    ) -> Option<(f64, f64)> {
        let range = range?;
        if !self.config.zoom_out_restrict {
            return Some(range);
        }
        let range = match self.x_original_domain {
            Some(limit) => check_extents(range, limit)?,
            None => range,
        };
        match range_chart_domain {
            Some(limit) => check_extents(range, limit),
            None => Some(range),
        }
    }

    /// Sets the active domain for a focus range, or restores the original
    /// one, and returns the filter matching the new view.
    pub(crate) fn apply_focus(&mut self, range: Option<(f64, f64)>) -> Option<Filter> {
        let range = range.filter(|(start, end)| start.is_finite() && end.is_finite());
        match range {
            Some((start, end)) => {
                if self.set_x_domain(start, end).is_err() {
                    return None;
                }
                Some(Filter::ranged(start, end))
            }
            None => {
                self.reset_x_domain();
                None
            }
        }
    }

    /// Points the zoom transform at the active domain so the next gesture
    /// starts from the current view.
    pub(crate) fn sync_zoom_transform(&mut self) {
        if let (Some(zoom), Some(orig_x), Some(domain)) =
            (self.zoom.as_mut(), self.orig_x, self.x.as_ref().and_then(XScale::continuous_domain))
        {
            zoom.set_transform(ZoomTransform::for_domain(domain, orig_x));
        }
    }

    fn configure_zoom(&mut self, width: f64) {
        if !self.config.mouse_zoomable {
            self.zoom = None;
            self.orig_x = None;
            return;
        }
        let Some((start, end)) = self.x_original_domain else {
            self.zoom = None;
            return;
        };
        let Ok(orig_x) = LinearScale::new(start, end) else {
            return;
        };
        self.orig_x = Some(orig_x.with_range(0.0, width));
        self.zoom = Some(ZoomBehavior::configured(
            self.config.zoom_scale.min,
            self.config.zoom_scale.max,
            width,
            self.config.zoom_out_restrict,
        ));
        self.sync_zoom_transform();
    }

    pub(crate) fn axis_extents(&self, key: &KeyAccessor, value: &ValueAccessor) -> AxisExtents {
        let raw = self.stack.raw_layers(key, value);
        let x = x_extent(&raw).map(|(min, max)| {
            (min - self.config.x_axis_padding, max + self.config.x_axis_padding)
        });
        let (_, layout) = stack_frames(raw, self.domain_filter(), self.config.stack_offset);
        let y = layout.extent().map(|(min, max)| {
            (min - self.config.y_axis_padding, max + self.config.y_axis_padding)
        });
        AxisExtents { x, y }
    }

    fn domain_filter(&self) -> Option<(f64, f64)> {
        if self.config.elastic_x || self.config.evade_domain_filter {
            return None;
        }
        self.x_domain()
    }

    /// Prepares scales, brush and zoom for one pass and describes the plot.
    pub(crate) fn prepare_frame(
        &mut self,
        anchor: &str,
        pass: RenderPass,
        viewport: Viewport,
        filter: Option<&Filter>,
        accessors: (&KeyAccessor, &ValueAccessor),
        animate: bool,
    ) -> ChartResult<PlotFrame> {
        let margins = self.config.margins;
        let width = (f64::from(viewport.width) - margins.left - margins.right).max(0.0);
        let height = (f64::from(viewport.height) - margins.top - margins.bottom).max(0.0);
        self.plot_size = (width, height);

        let raw = self.stack.raw_layers(accessors.0, accessors.1);
        let Some(x) = self.x.as_mut() else {
            return Err(ChartError::InvalidState {
                anchor: anchor.to_owned(),
                attribute: "x",
            });
        };
        match x {
            XScale::Linear(scale) => {
                if self.config.elastic_x
                    && let Some((min, max)) = x_extent(&raw)
                {
                    let padding = self.config.x_axis_padding;
                    let next = (min - padding, max + padding);
                    if scale.domain() != next {
                        scale.set_domain(next.0, next.1)?;
                        self.brush.request_resize();
                    }
                }
            }
            XScale::Ordinal(scale) => {
                if scale.domain().is_empty() || self.config.elastic_x {
                    scale.set_domain(ordinal_keys(&raw));
                }
            }
        }
        x.set_range(0.0, width);

        let (x_domain, x_unit_count, bandwidth) = match x {
            XScale::Linear(scale) => {
                let (start, end) = scale.domain();
                (
                    XDomain::Continuous(start, end),
                    self.x_units.count(start, end, 0),
                    None,
                )
            }
            XScale::Ordinal(scale) => (
                XDomain::Ordinal(scale.domain().to_vec()),
                scale.domain().len(),
                Some(scale.bandwidth()),
            ),
        };
        let ordinal = x.is_ordinal();

        let (layers, layout) = stack_frames(raw, self.domain_filter(), self.config.stack_offset);
        if self.config.elastic_y
            && let Some((min, max)) = layout.extent()
        {
            let padding = self.config.y_axis_padding;
            self.y.set_domain(min - padding, max + padding)?;
        }
        self.y.set_range(height, 0.0);

        if pass == RenderPass::Render {
            if self.config.brush_on && !ordinal {
                self.brush.attach(width, height);
            } else {
                self.brush.detach();
            }
            if self.round.is_some() && self.config.center_bar && !self.config.always_use_rounding {
                warn!(
                    anchor,
                    "brush rounding is ignored with centered bars unless always_use_rounding is set"
                );
            }
            self.configure_zoom(width);
        }
        self.redraw_brush(filter, animate);

        Ok(PlotFrame {
            margins,
            x_domain,
            y_domain: self.y.domain(),
            x_unit_count,
            bandwidth,
            layers,
            brush: self.brush.selection(),
            zoom: self.zoom.map(|zoom| zoom.transform()),
            refocused: self.refocused(),
        })
    }
}

fn check_extents(range: (f64, f64), limit: (f64, f64)) -> Option<(f64, f64)> {
    if range.1 < limit.0 || range.0 > limit.1 {
        warn!(
            ?range,
            ?limit,
            "focus range does not intersect the allowed extent, resetting focus"
        );
        return None;
    }
    Some((range.0.max(limit.0), range.1.min(limit.1)))
}

impl fmt::Debug for CoordinateGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateGrid")
            .field("config", &self.config)
            .field("x", &self.x)
            .field("x_original_domain", &self.x_original_domain)
            .field("y", &self.y)
            .field("brush", &self.brush)
            .field("zoom", &self.zoom)
            .field("range_chart", &self.range_chart)
            .field("focus_chart", &self.focus_chart)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> CoordinateGrid {
        let mut grid = CoordinateGrid::new(GridConfig::default()).expect("valid config");
        grid.set_x(XScale::linear(0.0, 100.0).expect("valid scale"));
        grid
    }

    #[test]
    fn focus_is_clamped_to_original_and_range_chart_domains() {
        let grid = grid();
        assert_eq!(grid.restrict_focus(Some((-20.0, 50.0)), None), Some((0.0, 50.0)));
        assert_eq!(
            grid.restrict_focus(Some((10.0, 90.0)), Some((20.0, 80.0))),
            Some((20.0, 80.0))
        );
        assert_eq!(grid.restrict_focus(Some((150.0, 200.0)), None), None);
    }

    #[test]
    fn refocused_compares_domains_by_value() {
        let mut grid = grid();
        assert!(!grid.refocused());
        grid.set_x_domain(30.0, 70.0).expect("linear scale");
        assert!(grid.refocused());
        grid.set_x_domain(0.0, 100.0).expect("linear scale");
        assert!(!grid.refocused());
    }

    #[test]
    fn rounding_is_skipped_for_centered_bars_without_opt_in() {
        let mut grid = grid();
        grid.set_round(Some(Rc::new(f64::floor)));
        assert_eq!(grid.extend_brush((1.5, 4.5)), (1.0, 4.0));

        let config = grid.config().with_center_bar(true);
        grid.set_config(config).expect("valid config");
        assert_eq!(grid.extend_brush((1.5, 4.5)), (1.5, 4.5));
    }
}
