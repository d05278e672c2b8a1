use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{FilterValue, GroupRow};

/// Baseline policy for stacked layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StackOffset {
    /// Every value stacks on the running sum, whatever its sign.
    None,
    /// Positive values stack upward from zero, negative values downward.
    #[default]
    Diverging,
}

/// One `(key, value)` sample of a layer. `None` values do not stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSample {
    pub x: FilterValue,
    pub y: Option<f64>,
}

impl LayerSample {
    #[must_use]
    pub fn new(x: impl Into<FilterValue>, y: Option<f64>) -> Self {
        Self { x: x.into(), y }
    }
}

/// Point of a chart layer after stacking, still tied to its source row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackPoint {
    pub x: FilterValue,
    pub y: Option<f64>,
    pub y0: f64,
    pub y1: Option<f64>,
    pub data: GroupRow,
}

/// Stacked position of one layer at one key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackCell {
    pub y: Option<f64>,
    pub y0: f64,
    pub y1: Option<f64>,
}

/// Result of [`stack_layers`]: one row of cells per key, cells in layer
/// order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackLayout {
    rows: IndexMap<FilterValue, Vec<StackCell>>,
}

impl StackLayout {
    pub fn rows(&self) -> impl Iterator<Item = (&FilterValue, &[StackCell])> {
        self.rows.iter().map(|(key, cells)| (key, cells.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row(&self, key: &FilterValue) -> Option<&[StackCell]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn cell(&self, key: &FilterValue, layer: usize) -> Option<StackCell> {
        self.rows.get(key).and_then(|cells| cells.get(layer).copied())
    }

    /// `(min, max)` over every present cell's `y0` and `y0 + y`.
    #[must_use]
    pub fn extent(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for cell in self.rows.values().flatten() {
            let Some(y) = cell.y else {
                continue;
            };
            let low = cell.y0.min(cell.y0 + y);
            let high = cell.y0.max(cell.y0 + y);
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(low), max.max(high)),
                None => (low, high),
            });
        }
        bounds
    }
}

/// Stacks layers that share a key domain.
///
/// Pass one gathers one row per key (first-appearance order across layers);
/// a layer without a sample at a key gets an empty cell there, nothing is
/// interpolated. Pass two walks each row in layer order and assigns
/// `y0` = sum of the preceding layers (split by sign for
/// [`StackOffset::Diverging`]) and `y1 = y0 + y`.
#[must_use]
pub fn stack_layers(layers: &[Vec<LayerSample>], offset: StackOffset) -> StackLayout {
    let mut columns: IndexMap<FilterValue, Vec<Option<f64>>> = IndexMap::new();
    for (layer_index, samples) in layers.iter().enumerate() {
        for sample in samples {
            let column = columns
                .entry(sample.x.clone())
                .or_insert_with(|| vec![None; layers.len()]);
            column[layer_index] = sample.y.filter(|y| y.is_finite());
        }
    }

    let rows = columns
        .into_iter()
        .map(|(key, values)| {
            let cells = stack_column(&values, offset);
            (key, cells)
        })
        .collect();

    StackLayout { rows }
}

fn stack_column(values: &[Option<f64>], offset: StackOffset) -> Vec<StackCell> {
    let mut positive = 0.0;
    let mut negative = 0.0;

    values
        .iter()
        .map(|value| match *value {
            None => StackCell {
                y: None,
                y0: positive,
                y1: None,
            },
            Some(y) => {
                let y0 = match offset {
                    StackOffset::Diverging if y < 0.0 => {
                        let y0 = negative;
                        negative += y;
                        y0
                    }
                    _ => {
                        let y0 = positive;
                        positive += y;
                        y0
                    }
                };
                StackCell {
                    y: Some(y),
                    y0,
                    y1: Some(y0 + y),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(values: &[(f64, f64)]) -> Vec<LayerSample> {
        values
            .iter()
            .map(|&(x, y)| LayerSample::new(x, Some(y)))
            .collect()
    }

    #[test]
    fn missing_keys_leave_empty_cells_without_breaking_baseline() {
        let layout = stack_layers(
            &[
                layer(&[(1.0, 2.0), (2.0, 3.0)]),
                layer(&[(1.0, 4.0)]),
                layer(&[(1.0, 1.0), (2.0, 1.0)]),
            ],
            StackOffset::None,
        );
        let key = FilterValue::number(2.0);
        let gap = layout.cell(&key, 1).expect("cell");
        assert_eq!(gap.y, None);
        assert_eq!(gap.y1, None);
        let top = layout.cell(&key, 2).expect("cell");
        assert_eq!(top.y0, 3.0);
    }

    #[test]
    fn no_offset_stacks_negative_values_on_running_sum() {
        let layout = stack_layers(
            &[layer(&[(0.0, 5.0)]), layer(&[(0.0, -2.0)])],
            StackOffset::None,
        );
        let cell = layout.cell(&FilterValue::number(0.0), 1).expect("cell");
        assert_eq!(cell.y0, 5.0);
        assert_eq!(cell.y1, Some(3.0));
    }
}
