use serde::{Deserialize, Serialize};

use crate::core::primitives::finite_or_zero;
use crate::interaction::{GesturePhase, GestureSource};

/// Whether the brush selects an x interval or a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BrushMode {
    #[default]
    X,
    XY,
}

/// Brush selection in plot-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BrushSelection {
    X { x0: f64, x1: f64 },
    XY { x0: f64, y0: f64, x1: f64, y1: f64 },
}

impl BrushSelection {
    /// Copy with every coordinate coerced to a finite value.
    #[must_use]
    pub fn sanitized(self) -> Self {
        match self {
            Self::X { x0, x1 } => Self::X {
                x0: finite_or_zero(x0),
                x1: finite_or_zero(x1),
            },
            Self::XY { x0, y0, x1, y1 } => Self::XY {
                x0: finite_or_zero(x0),
                y0: finite_or_zero(y0),
                x1: finite_or_zero(x1),
                y1: finite_or_zero(y1),
            },
        }
    }
}

/// One `start | brush | end` callback from the brush gesture region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushEvent {
    pub phase: GesturePhase,
    pub selection: Option<BrushSelection>,
    pub source: GestureSource,
}

impl BrushEvent {
    /// Callback raised by a pointer drag.
    #[must_use]
    pub fn pointer(phase: GesturePhase, selection: Option<BrushSelection>) -> Self {
        Self {
            phase,
            selection,
            source: GestureSource::Pointer,
        }
    }

    /// Callback raised by moving the brush from code.
    #[must_use]
    pub fn programmatic(selection: Option<BrushSelection>) -> Self {
        Self {
            phase: GesturePhase::Move,
            selection,
            source: GestureSource::Programmatic,
        }
    }
}

/// Rendered state of the brush handles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BrushState {
    attached: bool,
    extent: (f64, f64),
    selection: Option<BrushSelection>,
    animated: bool,
    resize_pending: bool,
}

impl BrushState {
    /// Attaches the gesture region over the plot's inner extent.
    pub fn attach(&mut self, width: f64, height: f64) {
        self.attached = true;
        self.extent = (finite_or_zero(width).max(0.0), finite_or_zero(height).max(0.0));
        self.resize_pending = false;
    }

    pub fn detach(&mut self) {
        self.attached = false;
        self.selection = None;
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        self.extent
    }

    /// Marks the gesture region for resizing on the next handle redraw.
    pub fn request_resize(&mut self) {
        self.resize_pending = true;
    }

    #[must_use]
    pub fn resize_pending(&self) -> bool {
        self.resize_pending
    }

    /// Moves the handles; `None` hides them. Never raises a brush callback.
    pub fn move_to(&mut self, selection: Option<BrushSelection>, animate: bool) {
        self.selection = selection.map(BrushSelection::sanitized);
        self.animated = animate && selection.is_some();
    }

    #[must_use]
    pub fn selection(&self) -> Option<BrushSelection> {
        self.selection
    }

    #[must_use]
    pub fn last_move_animated(&self) -> bool {
        self.animated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_to_coerces_degenerate_pixels() {
        let mut brush = BrushState::default();
        brush.attach(400.0, 200.0);
        brush.move_to(Some(BrushSelection::X { x0: f64::NAN, x1: 40.0 }), true);
        assert_eq!(brush.selection(), Some(BrushSelection::X { x0: 0.0, x1: 40.0 }));
        assert!(brush.last_move_animated());

        brush.move_to(None, true);
        assert_eq!(brush.selection(), None);
        assert!(!brush.last_move_animated());
    }
}
