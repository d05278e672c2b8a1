use std::rc::Rc;

use criterion::{Criterion, criterion_group, criterion_main};
use linked_charts::api::{Chart, ChartConfig, Dashboard, GridConfig};
use linked_charts::core::{
    Filter, FilterValue, LayerSample, LinearScale, RecordingDimension, StackOffset, StaticGroup,
    XScale, stack_layers,
};
use linked_charts::render::NullRenderer;
use std::hint::black_box;

fn bench_linear_scale_round_trip(c: &mut Criterion) {
    let scale = LinearScale::new(0.0, 10_000.0)
        .expect("valid scale")
        .with_range(0.0, 1_920.0);

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale.apply(black_box(4_321.123));
            let _ = scale.invert(px);
        })
    });
}

fn bench_stack_layers_16x2k(c: &mut Criterion) {
    let layers: Vec<Vec<LayerSample>> = (0..16)
        .map(|layer| {
            (0..2_000i64)
                .map(|key| {
                    let y = ((key + layer) % 7) as f64 - 3.0;
                    LayerSample::new(key, Some(y))
                })
                .collect()
        })
        .collect();

    c.bench_function("stack_layers_16x2k_diverging", |b| {
        b.iter(|| {
            let layout = stack_layers(black_box(&layers), StackOffset::Diverging);
            let _ = layout.extent();
        })
    });
}

fn bench_filter_predicates_10k(c: &mut Criterion) {
    let keys: Vec<FilterValue> = (0..10_000i64).map(FilterValue::from).collect();
    let ranged = Filter::ranged(2_500.0, 7_500.0);
    let exact: Vec<Filter> = (0..32i64).map(|key| Filter::exact(key * 300)).collect();

    c.bench_function("ranged_filter_10k", |b| {
        b.iter(|| {
            keys.iter()
                .filter(|key| ranged.is_filtered(black_box(key)))
                .count()
        })
    });

    c.bench_function("any_of_32_filters_10k", |b| {
        b.iter(|| {
            keys.iter()
                .filter(|key| exact.iter().any(|filter| filter.is_filtered(black_box(key))))
                .count()
        })
    });
}

fn bench_dashboard_snapshot_json_64(c: &mut Criterion) {
    let mut dashboard = Dashboard::default();
    for index in 0..64 {
        let mut chart = Chart::coordinate_grid(
            format!("#chart-{index}"),
            NullRenderer::default(),
            GridConfig::default(),
        )
        .expect("valid grid");
        chart
            .set_config(ChartConfig::default().with_size(640, 240))
            .expect("valid size");
        chart.set_dimension(RecordingDimension::shared(Vec::new()));
        chart.set_group(
            Rc::new(StaticGroup::from_pairs(&[(10.0, 1.0), (50.0, 2.0)])),
            None,
        );
        chart
            .grid_mut()
            .expect("grid chart")
            .set_x(XScale::linear(0.0, 100.0).expect("valid scale"));
        let id = dashboard.add_chart(chart, Some(if index % 2 == 0 { "even" } else { "odd" }));
        dashboard
            .replace_filter(id, Some(Filter::ranged(10.0, 60.0)))
            .expect("filter");
    }

    c.bench_function("dashboard_snapshot_json_64", |b| {
        b.iter(|| {
            let _ = dashboard
                .snapshot()
                .to_json_contract_v1_pretty()
                .expect("snapshot json should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_linear_scale_round_trip,
    bench_stack_layers_16x2k,
    bench_filter_predicates_10k,
    bench_dashboard_snapshot_json_64
);
criterion_main!(benches);
