use std::rc::Rc;

use linked_charts::api::{
    Chart, ChartConfig, DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1, Dashboard, DashboardConfig,
    DashboardSnapshot, GridConfig,
};
use linked_charts::core::{Filter, RecordingDimension, StackOffset, StaticGroup, XScale};
use linked_charts::interaction::{BrushMode, BrushSelection, InteractionMode};
use linked_charts::render::NullRenderer;

#[test]
fn grid_config_json_round_trip() {
    let config = GridConfig::default()
        .with_brush_mode(BrushMode::XY)
        .with_mouse_zoomable(true)
        .with_zoom_scale(1.0, Some(16.0))
        .with_elastic(true, false)
        .with_axis_padding(2.0, 0.5)
        .with_stack_offset(StackOffset::None)
        .with_hidable_stacks(true);

    let json = config.to_json_pretty().expect("serialize");
    let parsed = GridConfig::from_json_str(&json).expect("parse");

    assert_eq!(parsed, config);
}

#[test]
fn missing_fields_take_their_defaults() {
    let parsed = GridConfig::from_json_str(r#"{ "mouse_zoomable": true }"#).expect("parse");
    assert_eq!(parsed, GridConfig::default().with_mouse_zoomable(true));
    assert!(parsed.brush_on);
    assert!(parsed.zoom_out_restrict);

    let dashboard = DashboardConfig::from_json_str("{}").expect("parse");
    assert_eq!(dashboard.event_delay_ms, 40);
    assert!(!dashboard.disable_transitions);
}

#[test]
fn invalid_grid_config_is_rejected_on_parse() {
    let error = GridConfig::from_json_str(r#"{ "zoom_scale": { "min": 0.0 } }"#)
        .expect_err("zero zoom minimum");
    assert!(error.to_string().contains("zoom scale minimum"));
    assert!(GridConfig::from_json_str("not json").is_err());
}

#[test]
fn chart_config_rejects_zero_fixed_size() {
    let mut chart = Chart::new("#sized", NullRenderer::default());
    assert!(chart.set_config(ChartConfig::default().with_size(0, 100)).is_err());
    assert!(chart.set_config(ChartConfig::default().with_size(320, 100)).is_ok());
    assert_eq!(chart.width(), 320);
}

fn dashboard_with_filtered_grid() -> Dashboard {
    let mut chart = Chart::coordinate_grid("#snap", NullRenderer::default(), GridConfig::default())
        .expect("valid grid");
    chart
        .set_config(ChartConfig::default().with_size(480, 240))
        .expect("valid size");
    chart.set_dimension(RecordingDimension::shared(Vec::new()));
    chart.set_group(Rc::new(StaticGroup::from_pairs(&[(5.0, 1.0)])), None);
    chart
        .grid_mut()
        .expect("grid chart")
        .set_x(XScale::linear(0.0, 100.0).expect("valid scale"));

    let mut dashboard = Dashboard::default();
    let id = dashboard.add_chart(chart, Some("main"));
    dashboard.render(id).expect("render");
    dashboard
        .replace_filter(id, Some(Filter::ranged(20.0, 60.0)))
        .expect("filter");
    dashboard.redraw(id).expect("redraw");
    dashboard
}

#[test]
fn snapshot_reports_filters_domains_and_brush() {
    let dashboard = dashboard_with_filtered_grid();
    let snapshot = dashboard.snapshot();

    assert_eq!(snapshot.now_ms, 0);
    assert!(!snapshot.pending_action);
    let (group, members) = snapshot.groups.first().expect("one group");
    assert_eq!(group, "main");
    assert_eq!(members.len(), 1);

    let chart = snapshot.chart(members[0]).expect("chart snapshot");
    assert_eq!(chart.anchor, "#snap");
    assert_eq!(chart.group.as_deref(), Some("main"));
    assert_eq!(chart.filters, vec![Filter::ranged(20.0, 60.0)]);
    assert_eq!(chart.x_domain, Some((0.0, 100.0)));
    assert_eq!(chart.x_original_domain, Some((0.0, 100.0)));
    assert!(!chart.refocused);
    assert_eq!(chart.brush, Some(BrushSelection::X { x0: 80.0, x1: 240.0 }));
    assert_eq!(chart.interaction_mode, Some(InteractionMode::Idle));
}

#[test]
fn snapshot_contract_v1_accepts_wrapped_and_bare_payloads() {
    let snapshot = dashboard_with_filtered_grid().snapshot();

    let wrapped = snapshot.to_json_contract_v1_pretty().expect("serialize");
    assert!(wrapped.contains(&format!(
        "\"schema_version\": {DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1}"
    )));
    let parsed = DashboardSnapshot::from_json_compat_str(&wrapped).expect("parse wrapped");
    assert_eq!(parsed, snapshot);

    let bare = serde_json::to_string(&snapshot).expect("serialize bare");
    let parsed = DashboardSnapshot::from_json_compat_str(&bare).expect("parse bare");
    assert_eq!(parsed, snapshot);
}

#[test]
fn snapshot_contract_rejects_unknown_schema_versions() {
    let snapshot = dashboard_with_filtered_grid().snapshot();
    let payload = serde_json::json!({
        "schema_version": 99,
        "snapshot": snapshot,
    });

    let error = DashboardSnapshot::from_json_compat_str(&payload.to_string())
        .expect_err("unsupported version");
    assert!(error.to_string().contains("unsupported snapshot schema version"));
}
