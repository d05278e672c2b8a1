use serde::{Deserialize, Serialize};

use crate::core::FilterValue;
use crate::core::primitives::finite_or_zero;
use crate::error::{ChartError, ChartResult};

/// Continuous domain <-> pixel mapping.
///
/// A zero-width domain is accepted: it maps every value to the middle of the
/// range, which keeps single-sample charts drawable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        validate_domain(domain_start, domain_end)?;
        Ok(Self {
            domain_start,
            domain_end,
            range_start: 0.0,
            range_end: 1.0,
        })
    }

    #[must_use]
    pub fn with_range(mut self, range_start: f64, range_end: f64) -> Self {
        self.set_range(range_start, range_end);
        self
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    pub fn set_domain(&mut self, domain_start: f64, domain_end: f64) -> ChartResult<()> {
        validate_domain(domain_start, domain_end)?;
        self.domain_start = domain_start;
        self.domain_end = domain_end;
        Ok(())
    }

    /// Non-finite pixel bounds collapse to zero.
    pub fn set_range(&mut self, range_start: f64, range_end: f64) {
        self.range_start = finite_or_zero(range_start);
        self.range_end = finite_or_zero(range_end);
    }

    /// Maps a domain value to a pixel coordinate.
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = if span == 0.0 {
            0.5
        } else {
            (value - self.domain_start) / span
        };
        finite_or_zero(self.range_start + normalized * (self.range_end - self.range_start))
    }

    /// Maps a pixel coordinate back to the domain.
    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let pixel_span = self.range_end - self.range_start;
        if pixel_span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / pixel_span;
        finite_or_zero(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }
}

fn validate_domain(start: f64, end: f64) -> ChartResult<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(ChartError::InvalidData(
            "scale domain must be finite".to_owned(),
        ));
    }
    Ok(())
}

/// Band scale for categorical x axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalScale {
    domain: Vec<FilterValue>,
    range_start: f64,
    range_end: f64,
    padding_inner: f64,
    padding_outer: f64,
}

impl OrdinalScale {
    #[must_use]
    pub fn new(domain: Vec<FilterValue>) -> Self {
        Self {
            domain,
            range_start: 0.0,
            range_end: 1.0,
            padding_inner: 0.0,
            padding_outer: 0.0,
        }
    }

    #[must_use]
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.clamp(0.0, 1.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    #[must_use]
    pub fn domain(&self) -> &[FilterValue] {
        &self.domain
    }

    pub fn set_domain(&mut self, domain: Vec<FilterValue>) {
        self.domain = domain;
    }

    pub fn set_range(&mut self, range_start: f64, range_end: f64) {
        self.range_start = finite_or_zero(range_start);
        self.range_end = finite_or_zero(range_end);
    }

    fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let span = (self.range_end - self.range_start).abs();
        span / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0)
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding_inner)
    }

    /// Left edge of the band holding `key`.
    #[must_use]
    pub fn apply(&self, key: &FilterValue) -> Option<f64> {
        let index = self.domain.iter().position(|entry| entry == key)?;
        let n = self.domain.len() as f64;
        let step = self.step();
        let (start, stop) = if self.range_end < self.range_start {
            (self.range_end, self.range_start)
        } else {
            (self.range_start, self.range_end)
        };
        let first = start + (stop - start - step * (n - self.padding_inner)) * 0.5;
        Some(first + step * index as f64)
    }
}

/// X axis scale of a coordinate-grid chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum XScale {
    Linear(LinearScale),
    Ordinal(OrdinalScale),
}

impl XScale {
    pub fn linear(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        Ok(Self::Linear(LinearScale::new(domain_start, domain_end)?))
    }

    #[must_use]
    pub fn ordinal(domain: Vec<FilterValue>) -> Self {
        Self::Ordinal(OrdinalScale::new(domain))
    }

    #[must_use]
    pub fn is_ordinal(&self) -> bool {
        matches!(self, Self::Ordinal(_))
    }

    #[must_use]
    pub fn as_linear(&self) -> Option<LinearScale> {
        match self {
            Self::Linear(scale) => Some(*scale),
            Self::Ordinal(_) => None,
        }
    }

    /// Continuous domain, `None` for ordinal scales.
    #[must_use]
    pub fn continuous_domain(&self) -> Option<(f64, f64)> {
        self.as_linear().map(LinearScale::domain)
    }

    pub fn set_range(&mut self, range_start: f64, range_end: f64) {
        match self {
            Self::Linear(scale) => scale.set_range(range_start, range_end),
            Self::Ordinal(scale) => scale.set_range(range_start, range_end),
        }
    }
}

/// Counts how many units (bars, bins) fit in an x domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum XUnits {
    #[default]
    Integers,
    Ordinal,
    FloatPrecision(f64),
}

impl XUnits {
    /// `ordinal_len` is only consulted for `Ordinal` units.
    #[must_use]
    pub fn count(self, start: f64, end: f64, ordinal_len: usize) -> usize {
        match self {
            Self::Integers => finite_or_zero((end - start).abs()) as usize,
            Self::Ordinal => ordinal_len,
            Self::FloatPrecision(precision) => {
                if precision <= 0.0 || !precision.is_finite() {
                    return 0;
                }
                let units = finite_or_zero(((end - start) / precision).abs());
                if units - units.floor() < 1e-10 {
                    units.floor() as usize
                } else {
                    units.ceil() as usize
                }
            }
        }
    }
}
