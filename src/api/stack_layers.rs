use std::fmt;

use tracing::trace;

use crate::core::{
    FilterValue, GroupHandle, GroupRow, LayerSample, StackLayout, StackOffset, StackPoint,
    stack_layers,
};
use crate::render::LayerFrame;

use super::{KeyAccessor, ValueAccessor};

/// One stacked series of a coordinate-grid chart.
#[derive(Clone)]
pub struct StackLayer {
    pub group: GroupHandle,
    pub name: String,
    pub accessor: Option<ValueAccessor>,
    pub hidden: bool,
}

impl fmt::Debug for StackLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackLayer")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("custom_accessor", &self.accessor.is_some())
            .finish_non_exhaustive()
    }
}

/// Raw, unstacked points of one visible layer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawLayer {
    pub name: String,
    pub points: Vec<RawPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawPoint {
    pub x: FilterValue,
    pub y: Option<f64>,
    pub row: GroupRow,
}

/// Ordered layers of a chart; the first one is the chart's own group.
#[derive(Debug, Clone, Default)]
pub struct StackLayers {
    layers: Vec<StackLayer>,
}

impl StackLayers {
    /// Replaces every layer with a single base layer.
    pub fn set_base(&mut self, group: GroupHandle, name: Option<&str>) {
        self.layers.clear();
        self.stack(group, name, None);
    }

    /// Appends a layer above the existing ones. Unnamed layers are named by
    /// their registration index.
    pub fn stack(&mut self, group: GroupHandle, name: Option<&str>, accessor: Option<ValueAccessor>) {
        let name = name.map_or_else(|| self.layers.len().to_string(), str::to_owned);
        trace!(layer = %name, index = self.layers.len(), "stacking layer");
        self.layers.push(StackLayer {
            group,
            name,
            accessor,
            hidden: false,
        });
    }

    /// Returns `false` when no layer has that name.
    pub fn hide_stack(&mut self, name: &str) -> bool {
        self.set_hidden(name, true)
    }

    pub fn show_stack(&mut self, name: &str) -> bool {
        self.set_hidden(name, false)
    }

    fn set_hidden(&mut self, name: &str, hidden: bool) -> bool {
        match self.layers.iter_mut().find(|layer| layer.name == name) {
            Some(layer) => {
                layer.hidden = hidden;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn layers(&self) -> &[StackLayer] {
        &self.layers
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[must_use]
    pub fn base_group(&self) -> Option<&GroupHandle> {
        self.layers.first().map(|layer| &layer.group)
    }

    pub(crate) fn raw_layers(&self, key: &KeyAccessor, value: &ValueAccessor) -> Vec<RawLayer> {
        self.layers
            .iter()
            .filter(|layer| !layer.hidden)
            .map(|layer| {
                let accessor = layer.accessor.as_ref().unwrap_or(value);
                let points = layer
                    .group
                    .all()
                    .into_iter()
                    .map(|row| RawPoint {
                        x: key(&row),
                        y: accessor(&row),
                        row,
                    })
                    .collect();
                RawLayer {
                    name: layer.name.clone(),
                    points,
                }
            })
            .collect()
    }
}

/// `(min, max)` of the numeric keys across layers.
pub(crate) fn x_extent(layers: &[RawLayer]) -> Option<(f64, f64)> {
    layers
        .iter()
        .flat_map(|layer| layer.points.iter())
        .filter_map(|point| point.x.as_f64())
        .filter(|x| x.is_finite())
        .fold(None, |bounds, x| match bounds {
            Some((min, max)) => Some((f64::min(min, x), f64::max(max, x))),
            None => Some((x, x)),
        })
}

/// Distinct keys in first-appearance order, for ordinal axes.
pub(crate) fn ordinal_keys(layers: &[RawLayer]) -> Vec<FilterValue> {
    let mut keys: Vec<FilterValue> = Vec::new();
    for point in layers.iter().flat_map(|layer| layer.points.iter()) {
        if !keys.contains(&point.x) {
            keys.push(point.x.clone());
        }
    }
    keys
}

/// Applies the inclusive x-domain filter, when given, and stacks the layers.
pub(crate) fn stack_frames(
    layers: Vec<RawLayer>,
    domain: Option<(f64, f64)>,
    offset: StackOffset,
) -> (Vec<LayerFrame>, StackLayout) {
    let layers: Vec<RawLayer> = match domain {
        Some((start, end)) => layers
            .into_iter()
            .map(|mut layer| {
                layer.points.retain(|point| {
                    point
                        .x
                        .as_f64()
                        .is_some_and(|x| x >= start && x <= end)
                });
                layer
            })
            .collect(),
        None => layers,
    };

    let samples: Vec<Vec<LayerSample>> = layers
        .iter()
        .map(|layer| {
            layer
                .points
                .iter()
                .map(|point| LayerSample::new(point.x.clone(), point.y))
                .collect()
        })
        .collect();
    let layout = stack_layers(&samples, offset);

    let frames = layers
        .into_iter()
        .enumerate()
        .map(|(index, layer)| {
            let values = layer
                .points
                .into_iter()
                .map(|point| {
                    let cell = layout.cell(&point.x, index);
                    StackPoint {
                        y: cell.and_then(|cell| cell.y),
                        y0: cell.map_or(0.0, |cell| cell.y0),
                        y1: cell.and_then(|cell| cell.y1),
                        x: point.x,
                        data: point.row,
                    }
                })
                .collect();
            LayerFrame {
                name: layer.name,
                values,
            }
        })
        .collect();

    (frames, layout)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::core::StaticGroup;

    fn raw(name: &str, pairs: &[(f64, f64)]) -> RawLayer {
        RawLayer {
            name: name.to_owned(),
            points: pairs
                .iter()
                .map(|&(x, y)| RawPoint {
                    x: x.into(),
                    y: Some(y),
                    row: GroupRow::new(x, y),
                })
                .collect(),
        }
    }

    #[test]
    fn domain_filter_keeps_both_bounds() {
        let (frames, _) = stack_frames(
            vec![raw("0", &[(0.0, 1.0), (5.0, 2.0), (10.0, 3.0), (11.0, 4.0)])],
            Some((0.0, 10.0)),
            StackOffset::Diverging,
        );
        let keys: Vec<_> = frames[0].values.iter().map(|point| point.x.clone()).collect();
        assert_eq!(
            keys,
            vec![
                FilterValue::number(0.0),
                FilterValue::number(5.0),
                FilterValue::number(10.0)
            ]
        );
    }

    #[test]
    fn unnamed_layers_keep_their_registration_index() {
        let mut layers = StackLayers::default();
        layers.set_base(Rc::new(StaticGroup::default()), None);
        layers.stack(Rc::new(StaticGroup::default()), None, None);
        layers.stack(Rc::new(StaticGroup::default()), Some("extra"), None);
        assert!(layers.hide_stack("1"));
        assert!(!layers.hide_stack("missing"));
        let names: Vec<_> = layers.layers().iter().map(|layer| layer.name.as_str()).collect();
        assert_eq!(names, vec!["0", "1", "extra"]);
    }
}
