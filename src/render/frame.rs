use serde::{Deserialize, Serialize};

use crate::core::{ChartId, Filter, FilterValue, GroupRow, Margins, StackPoint, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{BrushSelection, ZoomTransform};

/// Full rebuild or incremental update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderPass {
    Render,
    Redraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Transition {
    pub duration_ms: u64,
    pub delay_ms: u64,
}

/// X domain as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum XDomain {
    Continuous(f64, f64),
    Ordinal(Vec<FilterValue>),
}

/// One stacked layer ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerFrame {
    pub name: String,
    pub values: Vec<StackPoint>,
}

/// Axis-based part of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotFrame {
    pub margins: Margins,
    pub x_domain: XDomain,
    pub y_domain: (f64, f64),
    pub x_unit_count: usize,
    pub bandwidth: Option<f64>,
    pub layers: Vec<LayerFrame>,
    pub brush: Option<BrushSelection>,
    pub zoom: Option<ZoomTransform>,
    pub refocused: bool,
}

/// Backend-agnostic description of one chart pass.
///
/// The renderer decides how to draw it; everything a renderer needs from the
/// filter and interaction state is materialized here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub chart: ChartId,
    pub anchor: String,
    pub pass: RenderPass,
    pub viewport: Viewport,
    pub transition: Transition,
    pub filters: Vec<Filter>,
    pub rows: Vec<GroupRow>,
    pub plot: Option<PlotFrame>,
}

impl ChartFrame {
    #[must_use]
    pub fn has_filter(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Rejects frames carrying non-finite geometry.
    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidData(format!(
                "frame viewport must be positive, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }

        let Some(plot) = &self.plot else {
            return Ok(());
        };

        let mut values = vec![plot.y_domain.0, plot.y_domain.1];
        if let XDomain::Continuous(start, end) = plot.x_domain {
            values.extend([start, end]);
        }
        match plot.brush {
            Some(BrushSelection::X { x0, x1 }) => values.extend([x0, x1]),
            Some(BrushSelection::XY { x0, y0, x1, y1 }) => values.extend([x0, y0, x1, y1]),
            None => {}
        }
        for point in plot.layers.iter().flat_map(|layer| layer.values.iter()) {
            values.push(point.y0);
            values.extend(point.y);
            values.extend(point.y1);
        }

        if values.iter().all(|value| value.is_finite()) {
            Ok(())
        } else {
            Err(ChartError::InvalidData(
                "frame geometry must be finite".to_owned(),
            ))
        }
    }
}
