use serde::{Deserialize, Serialize};
use tracing::trace;

/// Event type of a re-dispatched brush/zoom notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntheticKind {
    Start,
    Brush,
    Zoom,
    End,
}

/// Provenance of a brush or zoom callback.
///
/// Only the input adapter constructs `Pointer`, `Touch` or `Wheel`. Every
/// internal path that moves a brush or resets a zoom builds its callbacks as
/// `Programmatic`, which is what stops linked charts from re-triggering each
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureSource {
    Programmatic,
    Pointer,
    Touch,
    Wheel,
    /// Callback raised while another brush/zoom handler was dispatching.
    Synthetic(SyntheticKind),
}

impl GestureSource {
    #[must_use]
    pub fn is_user_gesture(self) -> bool {
        matches!(self, Self::Pointer | Self::Touch | Self::Wheel)
    }
}

/// Lifecycle phase of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GesturePhase {
    Start,
    Move,
    End,
}

/// Returns `true` when a callback may mutate filters.
pub(crate) fn admits(track: &'static str, source: GestureSource) -> bool {
    if source.is_user_gesture() {
        return true;
    }
    trace!(track, ?source, "ignoring gesture without user provenance");
    false
}
