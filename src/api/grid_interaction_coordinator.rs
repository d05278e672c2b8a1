use std::time::Duration;

use tracing::{debug, warn};

use crate::core::{ChartId, Filter, FilterValue};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{BrushEvent, ZoomEvent};

use super::{ChartEvent, Dashboard};

impl Dashboard {
    /// Feeds one brush callback of a grid chart.
    ///
    /// Callbacks without user provenance are dropped before anything
    /// changes. A genuine selection schedules `replace_filter` plus a group
    /// redraw after the event delay; a newer brush callback supersedes it.
    pub fn brush(&mut self, id: ChartId, event: BrushEvent) -> ChartResult<()> {
        let Some(grid) = self.chart_mut(id)?.grid_mut() else {
            return Ok(());
        };
        let Some(filter) = grid.brush_filter(&event) else {
            return Ok(());
        };
        let delay = self.event_delay();
        self.trigger(delay, move |dashboard| {
            dashboard.replace_filter(id, filter)?;
            dashboard.redraw_group(id)?;
            Ok(())
        })
    }

    /// Feeds one zoom callback of a grid chart.
    pub fn zoom(&mut self, id: ChartId, event: ZoomEvent) -> ChartResult<()> {
        let Some(grid) = self.chart_mut(id)?.grid_mut() else {
            return Ok(());
        };
        let Some(domain) = grid.zoom_domain(&event) else {
            return Ok(());
        };
        self.focus(id, Some(domain), false)
    }

    /// Programmatic zoom. `None` zooms back out to the original domain.
    ///
    /// With zoom-out restriction the range is clamped to the original domain
    /// and then to the range chart's domain. `suppress_events` skips the
    /// range chart update, the `zoomed` event and the group redraw.
    pub fn focus(
        &mut self,
        id: ChartId,
        range: Option<(f64, f64)>,
        suppress_events: bool,
    ) -> ChartResult<()> {
        let chart = self.chart(id)?;
        let Some(grid) = chart.grid() else {
            debug!(chart = %id, "focus ignored on a chart without axes");
            return Ok(());
        };
        if grid.x().is_none() || grid.is_ordinal() {
            debug!(chart = %id, "focus ignored without a continuous x scale");
            return Ok(());
        }
        let range_chart_domain = grid
            .range_chart()
            .and_then(|range_id| self.chart(range_id).ok())
            .and_then(|range_chart| range_chart.grid())
            .and_then(|range_grid| range_grid.x_domain());
        let range = grid.restrict_focus(range, range_chart_domain);
        debug!(chart = %id, ?range, suppress_events, "focusing chart");

        self.zoom_handler(id, range, suppress_events)?;
        if let Some(grid) = self.chart_mut(id)?.grid_mut() {
            grid.sync_zoom_transform();
        }
        Ok(())
    }

    fn zoom_handler(
        &mut self,
        id: ChartId,
        range: Option<(f64, f64)>,
        suppress_events: bool,
    ) -> ChartResult<()> {
        let Some(grid) = self.chart_mut(id)?.grid_mut() else {
            return Ok(());
        };
        let filter = grid.apply_focus(range);
        let x_domain = grid.x_domain();
        let range_chart = grid.range_chart();

        self.replace_filter(id, filter.clone())?;
        self.redraw(id)?;
        if suppress_events {
            return Ok(());
        }

        let range_differs = range_chart.is_some_and(|range_id| {
            self.chart(range_id)
                .is_ok_and(|range_chart| range_chart.filter() != filter.as_ref())
        });
        if let Some(range_id) = range_chart
            && range_differs
        {
            self.trigger(Duration::ZERO, move |dashboard| {
                let linked = dashboard
                    .replace_filter(range_id, filter)
                    .and_then(|()| dashboard.redraw(range_id));
                if let Err(error) = linked {
                    warn!(focus = %id, range = %range_id, %error, "range chart failed to follow zoom");
                }
                Ok(())
            })?;
        }
        if let Some(x_domain) = x_domain {
            self.chart_mut(id)?
                .emit(ChartEvent::Zoomed { chart: id, x_domain });
        }
        let delay = self.event_delay();
        self.trigger(delay, move |dashboard| {
            dashboard.redraw_group(id)?;
            Ok(())
        })
    }

    /// Keeps a focus chart on its range chart's selection.
    pub(crate) fn follow_range_chart(&mut self, range_id: ChartId, focus_id: ChartId) -> ChartResult<()> {
        let Ok(focus) = self.chart(focus_id) else {
            return Ok(());
        };
        let focus_filter = focus.filter().cloned();
        let range_filter = self.chart(range_id)?.filter().cloned();
        match range_filter {
            None => self.trigger(Duration::ZERO, move |dashboard| {
                if let Some(grid) = dashboard.chart_mut(focus_id)?.grid_mut() {
                    grid.reset_x_domain();
                    grid.sync_zoom_transform();
                }
                Ok(())
            }),
            Some(filter) if Some(&filter) != focus_filter.as_ref() => {
                let range = filter.numeric_range();
                self.trigger(Duration::ZERO, move |dashboard| {
                    dashboard.focus(focus_id, range, true)
                })
            }
            Some(_) => Ok(()),
        }
    }

    /// Makes `range_id` the overview of `focus_id` and `focus_id` the detail
    /// view of `range_id`. Any previous range chart of `focus_id` is unlinked.
    pub fn set_range_chart(&mut self, focus_id: ChartId, range_id: ChartId) -> ChartResult<()> {
        if focus_id == range_id {
            return Err(ChartError::InvalidData(
                "a chart cannot be its own range chart".to_owned(),
            ));
        }
        for id in [focus_id, range_id] {
            if !self.chart(id)?.is_coordinate_grid() {
                return Err(ChartError::InvalidData(format!(
                    "chart {id} has no axes to link"
                )));
            }
        }
        self.clear_range_chart(focus_id)?;
        if let Some(grid) = self.chart_mut(focus_id)?.grid_mut() {
            grid.set_range_chart(Some(range_id));
        }
        if let Some(grid) = self.chart_mut(range_id)?.grid_mut() {
            grid.set_focus_chart(Some(focus_id));
        }
        debug!(focus = %focus_id, range = %range_id, "linked range chart");
        Ok(())
    }

    pub fn clear_range_chart(&mut self, focus_id: ChartId) -> ChartResult<()> {
        let previous = self
            .chart_mut(focus_id)?
            .grid_mut()
            .and_then(|grid| {
                let previous = grid.range_chart();
                grid.set_range_chart(None);
                previous
            });
        if let Some(previous) = previous
            && let Ok(range) = self.chart_mut(previous)
            && let Some(grid) = range.grid_mut()
            && grid.focus_chart() == Some(focus_id)
        {
            grid.set_focus_chart(None);
        }
        Ok(())
    }

    /// Zooms every grid chart of `group` back out to its original domain.
    pub fn refocus_all(&mut self, group: Option<&str>) -> ChartResult<()> {
        for id in self.list(group) {
            let continuous = self
                .chart(id)
                .ok()
                .and_then(|chart| chart.grid())
                .is_some_and(|grid| grid.x().is_some() && !grid.is_ordinal());
            if continuous {
                self.focus(id, None, false)?;
            }
        }
        Ok(())
    }

    /// Click selection of one key: toggles it and redraws the chart's group
    /// right away.
    pub fn select_key(&mut self, id: ChartId, key: impl Into<FilterValue>) -> ChartResult<()> {
        self.chart(id)?;
        let filter = Filter::exact(key);
        self.trigger(Duration::ZERO, move |dashboard| {
            dashboard.toggle_filter(id, filter)?;
            dashboard.redraw_group(id)?;
            Ok(())
        })
    }
}
