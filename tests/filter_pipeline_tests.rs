use std::cell::RefCell;
use std::rc::Rc;

use linked_charts::api::{Chart, ChartEvent, Dashboard, FilterChange, FilterCommand};
use linked_charts::core::{ChartId, Dimension, DimensionCall, Filter, FilterValue, RecordingDimension};
use linked_charts::render::NullRenderer;

fn region_keys() -> Vec<FilterValue> {
    ["east", "west", "north", "south"]
        .into_iter()
        .map(FilterValue::text)
        .collect()
}

fn chart_with_dimension() -> (Dashboard, ChartId, Rc<RefCell<RecordingDimension>>) {
    let dimension = RecordingDimension::shared(region_keys());
    let mut chart = Chart::new("#regions", NullRenderer::default());
    chart.set_dimension(dimension.clone());
    let mut dashboard = Dashboard::default();
    let id = dashboard.add_chart(chart, None);
    (dashboard, id, dimension)
}

fn filters(dashboard: &Dashboard, id: ChartId) -> Vec<Filter> {
    dashboard.chart(id).expect("known chart").filters().to_vec()
}

#[test]
fn single_exact_filter_uses_the_dimension_exact_match() {
    let (mut dashboard, id, dimension) = chart_with_dimension();
    dashboard.toggle_filter(id, "east").expect("known chart");

    let dimension = dimension.borrow();
    assert_eq!(
        dimension.last_call(),
        Some(&DimensionCall::Exact(FilterValue::text("east")))
    );
    assert_eq!(dimension.selected_keys(), vec![FilterValue::text("east")]);
}

#[test]
fn several_filters_install_an_any_of_predicate() {
    let (mut dashboard, id, dimension) = chart_with_dimension();
    dashboard
        .filter(
            id,
            FilterCommand::ToggleEach(vec![Filter::exact("east"), Filter::exact("south")]),
        )
        .expect("known chart");

    let dimension = dimension.borrow();
    assert_eq!(dimension.last_call(), Some(&DimensionCall::Function));
    assert_eq!(
        dimension.selected_keys(),
        vec![FilterValue::text("east"), FilterValue::text("south")]
    );
}

#[test]
fn single_range_filter_uses_the_dimension_range() {
    let dimension = RecordingDimension::shared((0..10i64).map(FilterValue::from).collect());
    let mut chart = Chart::new("#range", NullRenderer::default());
    chart.set_dimension(dimension.clone());
    let mut dashboard = Dashboard::default();
    let id = dashboard.add_chart(chart, None);
    dashboard
        .toggle_filter(id, Filter::ranged(2.0, 5.0))
        .expect("known chart");

    let dimension = dimension.borrow();
    assert_eq!(
        dimension.last_call(),
        Some(&DimensionCall::Range(
            FilterValue::number(2.0),
            FilterValue::number(5.0)
        ))
    );
    let selected: Vec<_> = dimension
        .selected_keys()
        .iter()
        .filter_map(FilterValue::as_f64)
        .collect();
    assert_eq!(selected, vec![2.0, 3.0, 4.0]);
}

#[test]
fn reset_clears_the_dimension() {
    let (mut dashboard, id, dimension) = chart_with_dimension();
    dashboard.toggle_filter(id, "west").expect("known chart");
    dashboard.filter_all(id).expect("known chart");

    assert!(filters(&dashboard, id).is_empty());
    let dimension = dimension.borrow();
    assert_eq!(dimension.last_call(), Some(&DimensionCall::Clear));
    assert!(!dimension.is_filtered());
}

#[test]
fn replace_filter_touches_the_dimension_once() {
    let (mut dashboard, id, dimension) = chart_with_dimension();
    dashboard.toggle_filter(id, "west").expect("known chart");
    dashboard.toggle_filter(id, "north").expect("known chart");
    let before = dimension.borrow().calls().len();

    dashboard
        .replace_filter(id, Some(Filter::exact("east")))
        .expect("known chart");

    assert_eq!(filters(&dashboard, id), vec![Filter::exact("east")]);
    let dimension = dimension.borrow();
    assert_eq!(dimension.calls().len(), before + 1);
    assert_eq!(
        dimension.last_call(),
        Some(&DimensionCall::Exact(FilterValue::text("east")))
    );
}

#[test]
fn filter_handler_result_becomes_the_canonical_list() {
    let (mut dashboard, id, dimension) = chart_with_dimension();
    dashboard
        .chart_mut(id)
        .expect("known chart")
        .set_filter_handler(|dimension: &mut dyn Dimension, filters: Vec<Filter>| {
            dimension.clear_filter();
            filters
                .into_iter()
                .map(|filter| match filter {
                    Filter::Exact(FilterValue::Text(text)) => Filter::exact(text.to_uppercase()),
                    other => other,
                })
                .collect()
        });

    dashboard.toggle_filter(id, "east").expect("known chart");

    assert_eq!(filters(&dashboard, id), vec![Filter::exact("EAST")]);
    assert_eq!(dimension.borrow().last_call(), Some(&DimensionCall::Clear));
}

#[test]
fn custom_add_handler_can_keep_a_single_selection() {
    let (mut dashboard, id, _dimension) = chart_with_dimension();
    dashboard
        .chart_mut(id)
        .expect("known chart")
        .set_add_filter_handler(|_filters: Vec<Filter>, filter: Filter| vec![filter]);

    dashboard.toggle_filter(id, "east").expect("known chart");
    dashboard.toggle_filter(id, "west").expect("known chart");

    assert_eq!(filters(&dashboard, id), vec![Filter::exact("west")]);
}

#[test]
fn filtered_listeners_see_the_toggled_value_and_the_result() {
    let (mut dashboard, id, _dimension) = chart_with_dimension();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    dashboard
        .chart_mut(id)
        .expect("known chart")
        .on("filtered.monitor", move |event| {
            if let ChartEvent::Filtered { change, filters, .. } = event {
                sink.borrow_mut().push((change.clone(), filters.len()));
            }
        })
        .expect("valid listener spec");

    dashboard.toggle_filter(id, "east").expect("known chart");
    dashboard.toggle_filter(id, "west").expect("known chart");
    dashboard.filter_all(id).expect("known chart");

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![
            (FilterChange::Toggled(Filter::exact("east")), 1),
            (FilterChange::Toggled(Filter::exact("west")), 2),
            (FilterChange::Reset, 0),
        ]
    );
}

#[test]
fn filters_without_a_dimension_are_still_recorded() {
    let mut dashboard = Dashboard::default();
    let id = dashboard.add_chart(Chart::new("#detached", NullRenderer::default()), None);
    dashboard.toggle_filter(id, 3.0).expect("known chart");
    assert_eq!(filters(&dashboard, id), vec![Filter::exact(3.0)]);
}

#[test]
fn listener_namespaces_are_independent() {
    let mut dashboard = Dashboard::default();
    let id = dashboard.add_chart(Chart::new("#events", NullRenderer::default()), None);
    let count = Rc::new(RefCell::new(0));
    for spec in ["filtered", "filtered.a"] {
        let count = Rc::clone(&count);
        dashboard
            .chart_mut(id)
            .expect("known chart")
            .on(spec, move |_| *count.borrow_mut() += 1)
            .expect("valid listener spec");
    }
    dashboard.toggle_filter(id, "x").expect("known chart");
    assert_eq!(*count.borrow(), 2);

    let chart = dashboard.chart_mut(id).expect("known chart");
    assert!(chart.off("filtered.a").expect("valid listener spec"));
    dashboard.toggle_filter(id, "x").expect("known chart");
    assert_eq!(*count.borrow(), 3);

    let chart = dashboard.chart_mut(id).expect("known chart");
    assert!(chart.on("unknownEvent", |_| {}).is_err());
}
