use std::cell::RefCell;
use std::rc::Rc;

use approx::{assert_relative_eq, relative_eq};
use linked_charts::api::{Chart, GridConfig};
use linked_charts::core::{
    FilterValue, GroupRow, LayerSample, RecordingDimension, StackOffset, StaticGroup, XScale,
    stack_layers,
};
use linked_charts::render::{NullRenderer, PlotFrame};
use proptest::prelude::*;

proptest! {
    #[test]
    fn top_of_stack_equals_the_column_sum(
        columns in proptest::collection::vec(proptest::collection::vec(0.0f64..1_000.0, 1..6), 1..12)
    ) {
        let depth = columns.iter().map(Vec::len).max().unwrap_or(0);
        let layers: Vec<Vec<LayerSample>> = (0..depth)
            .map(|layer| {
                columns
                    .iter()
                    .enumerate()
                    .filter_map(|(key, values)| {
                        values
                            .get(layer)
                            .map(|&y| LayerSample::new(key as f64, Some(y)))
                    })
                    .collect()
            })
            .collect();

        let layout = stack_layers(&layers, StackOffset::None);

        prop_assert_eq!(layout.len(), columns.len());
        for (key, values) in columns.iter().enumerate() {
            let key = FilterValue::number(key as f64);
            let first = layout.cell(&key, 0).expect("first layer cell");
            prop_assert_eq!(first.y0, 0.0);
            let last = layout.cell(&key, values.len() - 1).expect("last layer cell");
            let total: f64 = values.iter().sum();
            let top = last.y1.expect("present value");
            prop_assert!(relative_eq!(top, total, epsilon = 1e-9, max_relative = 1e-12));
        }
    }

    #[test]
    fn diverging_offset_splits_signs_around_zero(
        values in proptest::collection::vec(-100.0f64..100.0, 1..8)
    ) {
        let layers: Vec<Vec<LayerSample>> = values
            .iter()
            .map(|&y| vec![LayerSample::new(0.0, Some(y))])
            .collect();
        let layout = stack_layers(&layers, StackOffset::Diverging);
        let key = FilterValue::number(0.0);
        for (index, value) in values.iter().enumerate() {
            let cell = layout.cell(&key, index).expect("cell");
            if *value < 0.0 {
                prop_assert!(cell.y0 <= 0.0);
            } else {
                prop_assert!(cell.y0 >= 0.0);
            }
        }
    }
}

fn plot(chart: &mut Chart, renderer: &Rc<RefCell<NullRenderer>>) -> PlotFrame {
    chart.render().expect("render");
    renderer
        .borrow()
        .last_frame
        .as_ref()
        .and_then(|frame| frame.plot.clone())
        .expect("grid plot")
}

fn stacked_chart(config: GridConfig) -> (Chart, Rc<RefCell<NullRenderer>>) {
    let renderer = Rc::new(RefCell::new(NullRenderer::default()));
    let mut chart =
        Chart::coordinate_grid("#stacked", Rc::clone(&renderer), config).expect("valid grid");
    chart.set_dimension(RecordingDimension::shared(Vec::new()));
    chart.set_group(
        Rc::new(StaticGroup::from_pairs(&[(1.0, 2.0), (2.0, 4.0), (12.0, 9.0)])),
        Some("base"),
    );
    let grid = chart.grid_mut().expect("grid chart");
    grid.set_x(XScale::linear(0.0, 10.0).expect("valid scale"));
    grid.stack(
        Rc::new(StaticGroup::from_pairs(&[(1.0, 1.0), (2.0, 1.0), (12.0, 1.0)])),
        Some("extra"),
        None,
    );
    (chart, renderer)
}

#[test]
fn layers_stack_on_the_base_group_inside_the_domain() {
    let (mut chart, renderer) = stacked_chart(GridConfig::default());

    let plot = plot(&mut chart, &renderer);

    assert_eq!(plot.layers.len(), 2);
    assert_eq!(plot.layers[0].name, "base");
    let extra = &plot.layers[1];
    assert_eq!(extra.name, "extra");
    assert_eq!(extra.values.len(), 2);
    assert_eq!(extra.values[1].y0, 4.0);
    assert_eq!(extra.values[1].y1, Some(5.0));
    assert_eq!(extra.values[1].data, GroupRow::new(2.0, 1.0));
}

#[test]
fn evading_the_domain_filter_keeps_out_of_domain_keys() {
    let (mut chart, renderer) = stacked_chart(GridConfig::default().with_evade_domain_filter(true));

    let plot = plot(&mut chart, &renderer);

    assert_eq!(plot.layers[0].values.len(), 3);
    assert_eq!(plot.layers[1].values[2].y0, 9.0);
}

#[test]
fn hidden_layers_drop_out_of_the_stack() {
    let (mut chart, renderer) = stacked_chart(GridConfig::default().with_hidable_stacks(true));
    assert!(chart.grid_mut().expect("grid chart").hide_stack("base"));

    let plot = plot(&mut chart, &renderer);

    assert_eq!(plot.layers.len(), 1);
    assert_eq!(plot.layers[0].name, "extra");
    assert_eq!(plot.layers[0].values[0].y0, 0.0);

    assert!(chart.grid_mut().expect("grid chart").show_stack("base"));
    assert_eq!(plot_layers(&mut chart, &renderer), 2);
}

#[test]
fn layers_cannot_be_hidden_unless_allowed() {
    let (mut chart, _renderer) = stacked_chart(GridConfig::default());
    assert!(!chart.grid_mut().expect("grid chart").hide_stack("base"));
}

#[test]
fn custom_accessor_reads_a_field_of_the_reduced_value() {
    let renderer = Rc::new(RefCell::new(NullRenderer::default()));
    let mut chart = Chart::coordinate_grid("#fields", Rc::clone(&renderer), GridConfig::default())
        .expect("valid grid");
    chart.set_dimension(RecordingDimension::shared(Vec::new()));
    let rows = vec![
        GroupRow::new(1.0, serde_json::json!({ "count": 3, "total": 30.0 })),
        GroupRow::new(2.0, serde_json::json!({ "count": 5, "total": 20.0 })),
    ];
    let group = Rc::new(StaticGroup::new(rows));
    chart.set_group(group.clone(), None);
    chart.set_value_accessor(|row: &GroupRow| row.value.get("count").and_then(|v| v.as_f64()));
    let grid = chart.grid_mut().expect("grid chart");
    grid.set_x(XScale::linear(0.0, 3.0).expect("valid scale"));
    grid.stack(
        group,
        Some("total"),
        Some(Rc::new(|row: &GroupRow| {
            row.value.get("total").and_then(|v| v.as_f64())
        })),
    );

    let plot = plot(&mut chart, &renderer);

    let total = &plot.layers[1].values[0];
    assert_relative_eq!(total.y0, 3.0);
    assert_eq!(total.y1, Some(33.0));
}

fn plot_layers(chart: &mut Chart, renderer: &Rc<RefCell<NullRenderer>>) -> usize {
    plot(chart, renderer).layers.len()
}
