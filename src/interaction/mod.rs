//! Gesture tracks of coordinate-grid charts.
//!
//! Brush and zoom are independent tracks. Each only reacts to callbacks with
//! user provenance, so the programmatic moves one track performs never feed
//! back into the other (or into a linked chart).

mod brush;
mod gesture;
mod throttle;
mod zoom;

use serde::{Deserialize, Serialize};

pub use brush::{BrushEvent, BrushMode, BrushSelection, BrushState};
pub use gesture::{GesturePhase, GestureSource, SyntheticKind};
pub use throttle::{EVENT_DELAY, EventThrottle};
pub use zoom::{ZoomBehavior, ZoomEvent, ZoomGesture, ZoomTransform};

pub(crate) use gesture::admits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Brushing,
    Zooming,
}

/// Tracks which gesture, if any, is in progress on a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionState {
    mode: InteractionMode,
}

impl InteractionState {
    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    pub fn on_brush_phase(&mut self, phase: GesturePhase) {
        self.mode = match phase {
            GesturePhase::Start | GesturePhase::Move => InteractionMode::Brushing,
            GesturePhase::End => InteractionMode::Idle,
        };
    }

    pub fn on_zoom_phase(&mut self, phase: GesturePhase) {
        self.mode = match phase {
            GesturePhase::Start | GesturePhase::Move => InteractionMode::Zooming,
            GesturePhase::End => InteractionMode::Idle,
        };
    }
}
