use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::core::{ChartId, Filter};
use crate::error::{ChartError, ChartResult};
use crate::interaction::EventThrottle;

use super::chart_registry::group_name;
use super::{Chart, ChartGroupRegistry, DashboardConfig, FilterCommand};

/// Deferred dashboard mutation scheduled through the event throttle.
pub type ThrottledAction = Box<dyn FnOnce(&mut Dashboard) -> ChartResult<()>>;

/// Outcome of a render/redraw fan-out over one chart group.
///
/// One chart failing never stops the rest of the group.
#[derive(Debug, Default)]
pub struct GroupPassReport {
    pub group: String,
    pub charts: usize,
    pub failures: Vec<(ChartId, ChartError)>,
}

impl GroupPassReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns every chart, the chart group registry and the shared event
/// throttle.
///
/// Charts refer to each other by [`ChartId`] only. Time is virtual: the host
/// reports elapsed time through [`Dashboard::advance`], which is when
/// delayed actions run.
pub struct Dashboard {
    config: DashboardConfig,
    charts: IndexMap<ChartId, Chart>,
    registry: ChartGroupRegistry,
    throttle: EventThrottle<ThrottledAction>,
    clock: Duration,
    next_id: u64,
    renderlet: Option<Box<dyn FnMut(&str)>>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl Dashboard {
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            charts: IndexMap::new(),
            registry: ChartGroupRegistry::default(),
            throttle: EventThrottle::new(),
            clock: Duration::ZERO,
            next_id: 1,
            renderlet: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> DashboardConfig {
        self.config
    }

    pub fn set_disable_transitions(&mut self, disabled: bool) {
        self.config.disable_transitions = disabled;
        for chart in self.charts.values_mut() {
            chart.set_transitions_disabled(disabled);
        }
    }

    /// Takes ownership of `chart`, assigns its id and registers it in
    /// `group` (the default group when `None`).
    pub fn add_chart(&mut self, mut chart: Chart, group: Option<&str>) -> ChartId {
        let id = ChartId(self.next_id);
        self.next_id += 1;
        chart.set_id(id);
        chart.set_transitions_disabled(self.config.disable_transitions);
        self.registry.register(id, chart.anchor(), group);
        self.charts.insert(id, chart);
        id
    }

    /// Drops a chart and every range/focus link pointing at it.
    pub fn remove_chart(&mut self, id: ChartId) -> ChartResult<Chart> {
        let mut chart = self
            .charts
            .shift_remove(&id)
            .ok_or(ChartError::UnknownChart(id))?;
        self.registry.remove_id(id);
        for other in self.charts.values_mut() {
            if let Some(grid) = other.grid_mut() {
                if grid.range_chart() == Some(id) {
                    grid.set_range_chart(None);
                }
                if grid.focus_chart() == Some(id) {
                    grid.set_focus_chart(None);
                }
            }
        }
        if let Some(grid) = chart.grid_mut() {
            grid.set_range_chart(None);
            grid.set_focus_chart(None);
        }
        debug!(chart = %id, "removed chart");
        Ok(chart)
    }

    /// Removes the chart anchored at `anchor` from `group`. The chart stays
    /// owned by the dashboard; unknown anchors are ignored.
    pub fn deregister_chart(&mut self, anchor: &str, group: Option<&str>) -> Option<ChartId> {
        self.registry.deregister(anchor, group)
    }

    /// Empties `group`, or every group when `None`.
    pub fn deregister_all(&mut self, group: Option<&str>) {
        self.registry.clear(group);
    }

    /// Whether the chart is a member of any group.
    #[must_use]
    pub fn has_chart(&self, id: ChartId) -> bool {
        self.registry.has(id)
    }

    #[must_use]
    pub fn registry(&self) -> &ChartGroupRegistry {
        &self.registry
    }

    /// Charts of `group` in registration order.
    #[must_use]
    pub fn list(&self, group: Option<&str>) -> Vec<ChartId> {
        self.registry.list(group)
    }

    pub fn chart(&self, id: ChartId) -> ChartResult<&Chart> {
        self.charts.get(&id).ok_or(ChartError::UnknownChart(id))
    }

    pub fn chart_mut(&mut self, id: ChartId) -> ChartResult<&mut Chart> {
        self.charts.get_mut(&id).ok_or(ChartError::UnknownChart(id))
    }

    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.charts.values()
    }

    /// Re-anchors a chart; registry lookups by anchor follow.
    pub fn set_anchor(&mut self, id: ChartId, anchor: &str) -> ChartResult<()> {
        self.chart_mut(id)?.set_anchor(anchor);
        self.registry.rename_anchor(id, anchor);
        Ok(())
    }

    /// Moves a chart into `group`.
    pub fn set_chart_group(&mut self, id: ChartId, group: Option<&str>) -> ChartResult<()> {
        let anchor = self.chart(id)?.anchor().to_owned();
        self.registry.register(id, &anchor, group);
        Ok(())
    }

    #[must_use]
    pub fn chart_group(&self, id: ChartId) -> Option<&str> {
        self.registry.group_of(id)
    }

    /// Callback run once per `render_all`/`redraw_all` with the group name.
    pub fn set_renderlet(&mut self, renderlet: Option<Box<dyn FnMut(&str)>>) {
        self.renderlet = renderlet;
    }

    /// Virtual time since the dashboard was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Runs `action` now when `delay` is zero, otherwise makes it the single
    /// pending action, superseding any earlier one.
    pub fn trigger(
        &mut self,
        delay: Duration,
        action: impl FnOnce(&mut Dashboard) -> ChartResult<()> + 'static,
    ) -> ChartResult<()> {
        match self.throttle.trigger(Box::new(action), delay, self.clock) {
            Some(action) => action(self),
            None => Ok(()),
        }
    }

    /// Advances virtual time and runs the pending action if its timer is
    /// due. Returns how many actions ran.
    pub fn advance(&mut self, elapsed: Duration) -> ChartResult<usize> {
        self.clock += elapsed;
        let mut ran = 0;
        while let Some(action) = self.throttle.poll(self.clock) {
            trace!(now_ms = self.clock.as_millis() as u64, "running throttled action");
            action(self)?;
            ran += 1;
        }
        Ok(ran)
    }

    #[must_use]
    pub fn has_pending_action(&self) -> bool {
        self.throttle.has_pending()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.throttle.next_deadline()
    }

    pub(crate) fn event_delay(&self) -> Duration {
        self.config.event_delay()
    }

    /// Filters a chart and lets a linked focus chart follow.
    pub fn filter(&mut self, id: ChartId, command: FilterCommand) -> ChartResult<()> {
        self.chart_mut(id)?.apply_filter(command);
        self.after_filtered(id)
    }

    pub fn toggle_filter(&mut self, id: ChartId, filter: impl Into<Filter>) -> ChartResult<()> {
        self.filter(id, FilterCommand::Toggle(filter.into()))
    }

    pub fn replace_filter(&mut self, id: ChartId, filter: Option<Filter>) -> ChartResult<()> {
        self.chart_mut(id)?.replace_filter(filter);
        self.after_filtered(id)
    }

    pub fn filter_all(&mut self, id: ChartId) -> ChartResult<()> {
        self.filter(id, FilterCommand::Reset)
    }

    fn after_filtered(&mut self, id: ChartId) -> ChartResult<()> {
        let focus = self
            .chart(id)?
            .grid()
            .and_then(|grid| grid.focus_chart());
        match focus {
            Some(focus) => self.follow_range_chart(id, focus),
            None => Ok(()),
        }
    }

    pub fn render(&mut self, id: ChartId) -> ChartResult<()> {
        self.chart_mut(id)?.render()
    }

    pub fn redraw(&mut self, id: ChartId) -> ChartResult<()> {
        self.chart_mut(id)?.redraw()
    }

    /// Resets the filters of every chart in `group`.
    ///
    /// A linked chart failing to follow a reset is logged and the remaining
    /// members are still reset.
    pub fn filter_all_charts(&mut self, group: Option<&str>) -> ChartResult<()> {
        for id in self.registry.list(group) {
            if !self.charts.contains_key(&id) {
                continue;
            }
            if let Err(error) = self.filter_all(id) {
                warn!(chart = %id, %error, "chart failed while resetting group filters");
            }
        }
        Ok(())
    }

    pub fn render_all(&mut self, group: Option<&str>) -> GroupPassReport {
        self.group_pass(group, Chart::render)
    }

    pub fn redraw_all(&mut self, group: Option<&str>) -> GroupPassReport {
        self.group_pass(group, Chart::redraw)
    }

    /// Renders the group the chart belongs to.
    pub fn render_group(&mut self, id: ChartId) -> ChartResult<GroupPassReport> {
        let group = self.group_of_member(id)?;
        Ok(self.render_all(Some(&group)))
    }

    /// Redraws the group the chart belongs to.
    pub fn redraw_group(&mut self, id: ChartId) -> ChartResult<GroupPassReport> {
        let group = self.group_of_member(id)?;
        Ok(self.redraw_all(Some(&group)))
    }

    fn group_of_member(&self, id: ChartId) -> ChartResult<String> {
        self.chart(id)?;
        Ok(self
            .registry
            .group_of(id)
            .unwrap_or(group_name(None))
            .to_owned())
    }

    fn group_pass(
        &mut self,
        group: Option<&str>,
        pass: fn(&mut Chart) -> ChartResult<()>,
    ) -> GroupPassReport {
        let mut report = GroupPassReport {
            group: group_name(group).to_owned(),
            ..GroupPassReport::default()
        };
        for id in self.registry.list(group) {
            let Some(chart) = self.charts.get_mut(&id) else {
                continue;
            };
            report.charts += 1;
            if let Err(error) = pass(chart) {
                warn!(chart = %id, anchor = chart.anchor(), %error, "chart failed during group pass");
                report.failures.push((id, error));
            }
        }
        if let Some(renderlet) = self.renderlet.as_mut() {
            renderlet(&report.group);
        }
        report
    }
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("config", &self.config)
            .field("charts", &self.charts)
            .field("registry", &self.registry)
            .field("clock", &self.clock)
            .field("pending_action", &self.throttle.has_pending())
            .finish_non_exhaustive()
    }
}
