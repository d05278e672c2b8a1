use serde::{Deserialize, Serialize};

use crate::core::LinearScale;
use crate::core::primitives::finite_or_zero;
use crate::interaction::{GesturePhase, GestureSource};

/// Horizontal zoom transform: `pixel' = pixel * k + x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self { k: 1.0, x: 0.0 };

    #[must_use]
    pub fn new(k: f64, x: f64) -> Self {
        Self { k, x }
    }

    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self {
            k: self.k * factor,
            x: self.x,
        }
    }

    /// Translation expressed in untransformed pixels.
    #[must_use]
    pub fn translate(self, tx: f64) -> Self {
        Self {
            k: self.k,
            x: self.x + self.k * tx,
        }
    }

    #[must_use]
    pub fn apply_x(self, pixel: f64) -> f64 {
        pixel * self.k + self.x
    }

    #[must_use]
    pub fn invert_x(self, pixel: f64) -> f64 {
        (pixel - self.x) / self.k
    }

    /// Domain visible through this transform when looking at `scale`.
    #[must_use]
    pub fn rescale_x(self, scale: LinearScale) -> (f64, f64) {
        let (r0, r1) = scale.range();
        (
            scale.invert(self.invert_x(r0)),
            scale.invert(self.invert_x(r1)),
        )
    }

    /// Transform that shows `domain` through `original`, the pre-zoom scale
    /// whose domain is the chart's original domain.
    #[must_use]
    pub fn for_domain(domain: (f64, f64), original: LinearScale) -> Self {
        let (o0, o1) = original.domain();
        let span = domain.1 - domain.0;
        if span == 0.0 || !span.is_finite() {
            return Self::IDENTITY;
        }
        let k = finite_or_zero((o1 - o0) / span);
        if k <= 0.0 {
            return Self::IDENTITY;
        }
        Self::IDENTITY.scale(k).translate(-original.apply(domain.0))
    }
}

/// Input delivered to the zoom track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoomGesture {
    /// Multiplies the scale around a pixel anchor.
    Wheel { anchor_px: f64, factor: f64 },
    /// Shifts the view by a pixel delta.
    Pan { dx_px: f64 },
    /// Replaces the whole transform.
    Transform(ZoomTransform),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomEvent {
    pub phase: GesturePhase,
    pub gesture: ZoomGesture,
    pub source: GestureSource,
}

impl ZoomEvent {
    #[must_use]
    pub fn wheel(anchor_px: f64, factor: f64) -> Self {
        Self {
            phase: GesturePhase::Move,
            gesture: ZoomGesture::Wheel { anchor_px, factor },
            source: GestureSource::Wheel,
        }
    }

    #[must_use]
    pub fn drag(dx_px: f64) -> Self {
        Self {
            phase: GesturePhase::Move,
            gesture: ZoomGesture::Pan { dx_px },
            source: GestureSource::Pointer,
        }
    }
}

/// Zoom behaviour attached to a plot: current transform plus the limits the
/// gestures are constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBehavior {
    transform: ZoomTransform,
    scale_extent: (f64, f64),
    viewport: (f64, f64),
    translate_extent: Option<(f64, f64)>,
}

impl Default for ZoomBehavior {
    fn default() -> Self {
        Self {
            transform: ZoomTransform::IDENTITY,
            scale_extent: (0.0, f64::INFINITY),
            viewport: (0.0, 0.0),
            translate_extent: None,
        }
    }
}

impl ZoomBehavior {
    /// `restrict` pins the translate extent to the viewport and floors the
    /// minimum scale at 1 so the view cannot leave the original domain.
    #[must_use]
    pub fn configured(scale_min: f64, scale_max: Option<f64>, width: f64, restrict: bool) -> Self {
        let width = finite_or_zero(width).max(0.0);
        let scale_max = scale_max.unwrap_or(f64::INFINITY);
        let (scale_min, translate_extent) = if restrict {
            (scale_min.max(1.0), Some((0.0, width)))
        } else {
            (scale_min, None)
        };
        Self {
            transform: ZoomTransform::IDENTITY,
            scale_extent: (scale_min, scale_max),
            viewport: (0.0, width),
            translate_extent,
        }
    }

    #[must_use]
    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    #[must_use]
    pub fn scale_extent(&self) -> (f64, f64) {
        self.scale_extent
    }

    #[must_use]
    pub fn translate_extent(&self) -> Option<(f64, f64)> {
        self.translate_extent
    }

    /// Programmatic transform update; raises no zoom callback.
    pub fn set_transform(&mut self, transform: ZoomTransform) {
        self.transform = transform;
    }

    /// Applies a gesture and returns the constrained transform.
    pub fn apply(&mut self, gesture: ZoomGesture) -> ZoomTransform {
        let current = self.transform;
        let next = match gesture {
            ZoomGesture::Wheel { anchor_px, factor } => {
                if !factor.is_finite() || factor <= 0.0 {
                    current
                } else {
                    let k = self.clamp_scale(current.k * factor);
                    let anchor_domain = current.invert_x(anchor_px);
                    ZoomTransform::new(k, anchor_px - anchor_domain * k)
                }
            }
            ZoomGesture::Pan { dx_px } => {
                ZoomTransform::new(current.k, current.x + finite_or_zero(dx_px))
            }
            ZoomGesture::Transform(transform) => {
                ZoomTransform::new(self.clamp_scale(transform.k), finite_or_zero(transform.x))
            }
        };
        self.transform = self.constrain(next);
        self.transform
    }

    fn clamp_scale(&self, k: f64) -> f64 {
        let k = if k.is_finite() { k } else { self.transform.k };
        k.clamp(self.scale_extent.0, self.scale_extent.1.max(self.scale_extent.0))
    }

    fn constrain(&self, transform: ZoomTransform) -> ZoomTransform {
        let Some((t0, t1)) = self.translate_extent else {
            return transform;
        };
        let dx0 = transform.invert_x(self.viewport.0) - t0;
        let dx1 = transform.invert_x(self.viewport.1) - t1;
        let shift = if dx1 > dx0 {
            (dx0 + dx1) / 2.0
        } else if dx0 < 0.0 {
            dx0
        } else {
            dx1.max(0.0)
        };
        transform.translate(shift)
    }
}
