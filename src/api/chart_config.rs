use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Margins, StackOffset};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{BrushMode, EVENT_DELAY};

/// Dashboard-wide settings.
///
/// This type is serializable so hosts can persist a dashboard setup next to
/// their chart definitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Coalescing delay applied to gesture-driven redraws.
    #[serde(default = "default_event_delay_ms")]
    pub event_delay_ms: u64,
    /// Forces every transition duration to zero.
    #[serde(default)]
    pub disable_transitions: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            event_delay_ms: default_event_delay_ms(),
            disable_transitions: false,
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn event_delay(self) -> Duration {
        Duration::from_millis(self.event_delay_ms)
    }

    #[must_use]
    pub fn with_disable_transitions(mut self, disabled: bool) -> Self {
        self.disable_transitions = disabled;
        self
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

/// Per-chart sizing and transition settings shared by every chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_transition_duration_ms")]
    pub transition_duration_ms: u64,
    #[serde(default)]
    pub transition_delay_ms: u64,
    #[serde(default = "default_min_extent")]
    pub min_width: u32,
    #[serde(default = "default_min_extent")]
    pub min_height: u32,
    /// Fixed width; `None` sizes from the container.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            transition_duration_ms: default_transition_duration_ms(),
            transition_delay_ms: 0,
            min_width: default_min_extent(),
            min_height: default_min_extent(),
            width: None,
            height: None,
        }
    }
}

impl ChartConfig {
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_transition(mut self, duration_ms: u64, delay_ms: u64) -> Self {
        self.transition_duration_ms = duration_ms;
        self.transition_delay_ms = delay_ms;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.width == Some(0) || self.height == Some(0) {
            return Err(ChartError::InvalidData(
                "fixed chart size must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Allowed zoom factors relative to the original x domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomScaleExtent {
    pub min: f64,
    /// `None` means unbounded.
    #[serde(default)]
    pub max: Option<f64>,
}

impl Default for ZoomScaleExtent {
    fn default() -> Self {
        Self { min: 1.0, max: None }
    }
}

/// Settings specific to coordinate-grid charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub margins: Margins,
    #[serde(default = "default_true")]
    pub brush_on: bool,
    #[serde(default)]
    pub brush_mode: BrushMode,
    #[serde(default)]
    pub mouse_zoomable: bool,
    #[serde(default)]
    pub zoom_scale: ZoomScaleExtent,
    /// Keeps zoom and focus inside the original x domain.
    #[serde(default = "default_true")]
    pub zoom_out_restrict: bool,
    #[serde(default)]
    pub elastic_x: bool,
    #[serde(default)]
    pub elastic_y: bool,
    #[serde(default)]
    pub x_axis_padding: f64,
    #[serde(default)]
    pub y_axis_padding: f64,
    #[serde(default)]
    pub center_bar: bool,
    #[serde(default)]
    pub always_use_rounding: bool,
    /// Stacks every key, including those outside the current x domain.
    #[serde(default)]
    pub evade_domain_filter: bool,
    #[serde(default)]
    pub stack_offset: StackOffset,
    /// Lets the legend hide and show stacked layers.
    #[serde(default)]
    pub hidable_stacks: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            brush_on: true,
            brush_mode: BrushMode::X,
            mouse_zoomable: false,
            zoom_scale: ZoomScaleExtent::default(),
            zoom_out_restrict: true,
            elastic_x: false,
            elastic_y: false,
            x_axis_padding: 0.0,
            y_axis_padding: 0.0,
            center_bar: false,
            always_use_rounding: false,
            evade_domain_filter: false,
            stack_offset: StackOffset::Diverging,
            hidable_stacks: false,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub fn with_brush_on(mut self, brush_on: bool) -> Self {
        self.brush_on = brush_on;
        self
    }

    #[must_use]
    pub fn with_brush_mode(mut self, mode: BrushMode) -> Self {
        self.brush_mode = mode;
        self
    }

    #[must_use]
    pub fn with_mouse_zoomable(mut self, zoomable: bool) -> Self {
        self.mouse_zoomable = zoomable;
        self
    }

    #[must_use]
    pub fn with_zoom_scale(mut self, min: f64, max: Option<f64>) -> Self {
        self.zoom_scale = ZoomScaleExtent { min, max };
        self
    }

    #[must_use]
    pub fn with_zoom_out_restrict(mut self, restrict: bool) -> Self {
        self.zoom_out_restrict = restrict;
        self
    }

    #[must_use]
    pub fn with_elastic(mut self, elastic_x: bool, elastic_y: bool) -> Self {
        self.elastic_x = elastic_x;
        self.elastic_y = elastic_y;
        self
    }

    #[must_use]
    pub fn with_axis_padding(mut self, x_axis_padding: f64, y_axis_padding: f64) -> Self {
        self.x_axis_padding = x_axis_padding;
        self.y_axis_padding = y_axis_padding;
        self
    }

    #[must_use]
    pub fn with_center_bar(mut self, center_bar: bool) -> Self {
        self.center_bar = center_bar;
        self
    }

    #[must_use]
    pub fn with_always_use_rounding(mut self, always: bool) -> Self {
        self.always_use_rounding = always;
        self
    }

    #[must_use]
    pub fn with_evade_domain_filter(mut self, evade: bool) -> Self {
        self.evade_domain_filter = evade;
        self
    }

    #[must_use]
    pub fn with_stack_offset(mut self, offset: StackOffset) -> Self {
        self.stack_offset = offset;
        self
    }

    #[must_use]
    pub fn with_hidable_stacks(mut self, hidable: bool) -> Self {
        self.hidable_stacks = hidable;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        let margins = [
            self.margins.top,
            self.margins.right,
            self.margins.bottom,
            self.margins.left,
        ];
        if margins.iter().any(|margin| !margin.is_finite() || *margin < 0.0) {
            return Err(ChartError::InvalidData(
                "grid margins must be finite and non-negative".to_owned(),
            ));
        }
        if !self.zoom_scale.min.is_finite() || self.zoom_scale.min <= 0.0 {
            return Err(ChartError::InvalidData(
                "zoom scale minimum must be finite and > 0".to_owned(),
            ));
        }
        if let Some(max) = self.zoom_scale.max
            && (!max.is_finite() || max < self.zoom_scale.min)
        {
            return Err(ChartError::InvalidData(
                "zoom scale maximum must be finite and >= minimum".to_owned(),
            ));
        }
        if !self.x_axis_padding.is_finite() || !self.y_axis_padding.is_finite() {
            return Err(ChartError::InvalidData(
                "axis padding must be finite".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize grid config: {e}")))
    }

    /// Parses and validates a grid config.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse grid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_event_delay_ms() -> u64 {
    EVENT_DELAY.as_millis() as u64
}

fn default_transition_duration_ms() -> u64 {
    750
}

fn default_min_extent() -> u32 {
    200
}

fn default_true() -> bool {
    true
}
