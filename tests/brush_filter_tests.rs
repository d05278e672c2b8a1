use std::cell::RefCell;
use std::rc::Rc;

use linked_charts::api::{Chart, ChartConfig, Dashboard, GridConfig};
use linked_charts::core::{
    ChartId, DimensionCall, Filter, FilterValue, RecordingDimension, StaticGroup, XScale,
};
use linked_charts::interaction::{
    BrushEvent, BrushMode, BrushSelection, EVENT_DELAY, GesturePhase, GestureSource,
    InteractionMode, SyntheticKind, ZoomEvent, ZoomGesture,
};
use linked_charts::render::NullRenderer;

struct Fixture {
    dashboard: Dashboard,
    id: ChartId,
    renderer: Rc<RefCell<NullRenderer>>,
    dimension: Rc<RefCell<RecordingDimension>>,
}

// 480px wide with the default 30/50 margins leaves a 400px plot.
fn fixture(config: GridConfig) -> Fixture {
    let renderer = Rc::new(RefCell::new(NullRenderer::default()));
    let dimension = RecordingDimension::shared((0..100i64).map(FilterValue::from).collect());
    let mut chart = Chart::coordinate_grid("#brush", Rc::clone(&renderer), config)
        .expect("valid grid");
    chart
        .set_config(ChartConfig::default().with_size(480, 240))
        .expect("valid size");
    chart.set_dimension(dimension.clone());
    chart.set_group(
        Rc::new(StaticGroup::from_pairs(&[(10.0, 1.0), (50.0, 2.0), (90.0, 3.0)])),
        None,
    );
    chart
        .grid_mut()
        .expect("grid chart")
        .set_x(XScale::linear(0.0, 100.0).expect("valid scale"));

    let mut dashboard = Dashboard::default();
    let id = dashboard.add_chart(chart, None);
    dashboard.render(id).expect("initial render");
    Fixture {
        dashboard,
        id,
        renderer,
        dimension,
    }
}

fn drag(x0: f64, x1: f64) -> BrushEvent {
    BrushEvent::pointer(GesturePhase::Move, Some(BrushSelection::X { x0, x1 }))
}

#[test]
fn pixel_selection_becomes_a_ranged_filter() {
    let mut fx = fixture(GridConfig::default());

    fx.dashboard.brush(fx.id, drag(80.0, 240.0)).expect("brush");
    assert!(fx.dashboard.has_pending_action());
    assert_eq!(fx.dashboard.advance(EVENT_DELAY).expect("advance"), 1);

    let chart = fx.dashboard.chart(fx.id).expect("known chart");
    let filter = chart.filter().expect("brush filter");
    assert_eq!(*filter, Filter::ranged(20.0, 60.0));
    assert!(filter.is_filtered(&FilterValue::number(20.0)));
    assert!(!filter.is_filtered(&FilterValue::number(60.0)));
    assert!(!filter.is_filtered(&FilterValue::number(19.9)));
    assert_eq!(
        fx.dimension.borrow().last_call(),
        Some(&DimensionCall::Range(
            FilterValue::number(20.0),
            FilterValue::number(60.0)
        ))
    );
    assert_eq!(fx.renderer.borrow().redraw_count, 1);
}

#[test]
fn brush_updates_are_coalesced_until_the_delay_elapses() {
    let mut fx = fixture(GridConfig::default());

    fx.dashboard.brush(fx.id, drag(0.0, 40.0)).expect("brush");
    fx.dashboard
        .advance(EVENT_DELAY / 2)
        .expect("advance half way");
    fx.dashboard.brush(fx.id, drag(0.0, 80.0)).expect("brush");
    fx.dashboard.brush(fx.id, drag(0.0, 120.0)).expect("brush");
    assert!(fx.dashboard.chart(fx.id).expect("known chart").filters().is_empty());

    fx.dashboard.advance(EVENT_DELAY).expect("advance");

    let chart = fx.dashboard.chart(fx.id).expect("known chart");
    assert_eq!(chart.filters(), &[Filter::ranged(0.0, 30.0)]);
    assert_eq!(fx.renderer.borrow().redraw_count, 1);
}

#[test]
fn empty_selection_clears_the_filter() {
    let mut fx = fixture(GridConfig::default());
    fx.dashboard.brush(fx.id, drag(80.0, 240.0)).expect("brush");
    fx.dashboard.advance(EVENT_DELAY).expect("advance");

    fx.dashboard
        .brush(fx.id, BrushEvent::pointer(GesturePhase::End, None))
        .expect("brush");
    fx.dashboard.advance(EVENT_DELAY).expect("advance");

    let chart = fx.dashboard.chart(fx.id).expect("known chart");
    assert!(chart.filters().is_empty());
    assert_eq!(fx.dimension.borrow().last_call(), Some(&DimensionCall::Clear));
    let grid = chart.grid().expect("grid chart");
    assert_eq!(grid.brush().selection(), None);
    assert_eq!(grid.interaction_mode(), InteractionMode::Idle);
}

#[test]
fn callbacks_without_user_provenance_change_nothing() {
    let mut fx = fixture(GridConfig::default().with_mouse_zoomable(true));
    let calls_before = fx.dimension.borrow().calls().len();
    let synthetic = [
        BrushEvent::programmatic(Some(BrushSelection::X { x0: 80.0, x1: 240.0 })),
        BrushEvent {
            source: GestureSource::Synthetic(SyntheticKind::Brush),
            ..drag(80.0, 240.0)
        },
        BrushEvent {
            source: GestureSource::Synthetic(SyntheticKind::Zoom),
            ..drag(10.0, 20.0)
        },
    ];
    for event in synthetic {
        fx.dashboard.brush(fx.id, event).expect("brush");
    }
    fx.dashboard
        .zoom(
            fx.id,
            ZoomEvent {
                source: GestureSource::Programmatic,
                ..ZoomEvent::wheel(100.0, 2.0)
            },
        )
        .expect("zoom");
    fx.dashboard
        .zoom(
            fx.id,
            ZoomEvent {
                source: GestureSource::Synthetic(SyntheticKind::Brush),
                phase: GesturePhase::Move,
                gesture: ZoomGesture::Pan { dx_px: 15.0 },
            },
        )
        .expect("zoom");
    fx.dashboard.advance(EVENT_DELAY * 4).expect("advance");

    let chart = fx.dashboard.chart(fx.id).expect("known chart");
    assert!(chart.filters().is_empty());
    assert!(!chart.grid().expect("grid chart").refocused());
    assert_eq!(fx.dimension.borrow().calls().len(), calls_before);
    assert_eq!(fx.renderer.borrow().redraw_count, 0);
    assert!(!fx.dashboard.has_pending_action());
}

#[test]
fn brushing_is_ignored_when_disabled() {
    let mut fx = fixture(GridConfig::default().with_brush_on(false));
    fx.dashboard.brush(fx.id, drag(80.0, 240.0)).expect("brush");
    assert!(!fx.dashboard.has_pending_action());
}

#[test]
fn rounding_snaps_both_brush_edges() {
    let mut fx = fixture(GridConfig::default());
    fx.dashboard
        .chart_mut(fx.id)
        .expect("known chart")
        .grid_mut()
        .expect("grid chart")
        .set_round(Some(Rc::new(|value: f64| (value / 10.0).round() * 10.0)));

    fx.dashboard.brush(fx.id, drag(90.0, 226.0)).expect("brush");
    fx.dashboard.advance(EVENT_DELAY).expect("advance");

    let chart = fx.dashboard.chart(fx.id).expect("known chart");
    assert_eq!(chart.filters(), &[Filter::ranged(20.0, 60.0)]);
    let selection = chart.grid().expect("grid chart").brush().selection();
    assert_eq!(selection, Some(BrushSelection::X { x0: 80.0, x1: 240.0 }));
}

#[test]
fn rectangle_brush_produces_a_two_dimensional_filter() {
    let mut fx = fixture(GridConfig::default().with_brush_mode(BrushMode::XY));
    // Plot is 200px tall (240 minus the 10/30 margins) over y in [0, 1].
    let selection = BrushSelection::XY {
        x0: 80.0,
        y0: 50.0,
        x1: 240.0,
        y1: 150.0,
    };
    fx.dashboard
        .brush(fx.id, BrushEvent::pointer(GesturePhase::End, Some(selection)))
        .expect("brush");
    fx.dashboard.advance(EVENT_DELAY).expect("advance");

    let chart = fx.dashboard.chart(fx.id).expect("known chart");
    let filter = chart.filter().expect("rectangle filter");
    assert_eq!(*filter, Filter::ranged_two_dimensional([20.0, 0.25], [60.0, 0.75]));
    assert!(filter.is_filtered(&FilterValue::point(30.0, 0.5)));
    assert!(!filter.is_filtered(&FilterValue::point(30.0, 0.8)));
    assert_eq!(fx.dimension.borrow().last_call(), Some(&DimensionCall::Function));
}

#[test]
fn redraw_moves_the_brush_to_the_active_filter() {
    let mut fx = fixture(GridConfig::default());
    fx.dashboard
        .replace_filter(fx.id, Some(Filter::ranged(25.0, 50.0)))
        .expect("filter");
    fx.dashboard.redraw(fx.id).expect("redraw");

    let renderer = fx.renderer.borrow();
    let plot = renderer
        .last_frame
        .as_ref()
        .and_then(|frame| frame.plot.as_ref())
        .expect("grid plot");
    assert_eq!(plot.brush, Some(BrushSelection::X { x0: 100.0, x1: 200.0 }));
}
