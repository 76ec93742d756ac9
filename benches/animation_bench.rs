//! Benchmarks for easing, classification and the per-frame tick.
#![allow(missing_docs)]

use auto_animate::animation::{classify, ClassifyRules};
use auto_animate::snapshot::{Geometry, Rect, Snapshot};
use auto_animate::{
    AnimateOptions, Controller, Easing, ElementId, LayoutHost, VirtualDom,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use web_time::{Duration, Instant};

fn easing_benchmark(c: &mut Criterion) {
    let hermite = Easing::CubicHermite { c1: 0.33, c2: 1.0 };
    c.bench_function("cubic_hermite_easing", |b| {
        b.iter(|| black_box(hermite.evaluate(black_box(0.5))))
    });
    let bezier = Easing::EASE_IN_OUT;
    c.bench_function("cubic_bezier_easing", |b| {
        b.iter(|| black_box(bezier.evaluate(black_box(0.37))))
    });
}

fn classify_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for count in [10_u64, 100, 1_000] {
        let previous: Vec<ElementId> = (0..count).map(ElementId).collect();
        // Drop the first element, append a new one: everyone shifts up
        let current: Vec<ElementId> = (1..=count).map(ElementId).collect();
        let mut from = Snapshot::new();
        let mut to = Snapshot::new();
        for (i, &e) in previous.iter().enumerate() {
            from.insert(
                e,
                Geometry::settled(Rect::new(0.0, i as f32 * 40.0, 100.0, 40.0), 1.0),
            );
        }
        for (i, &e) in current.iter().enumerate() {
            to.insert(
                e,
                Geometry::settled(Rect::new(0.0, i as f32 * 40.0, 100.0, 40.0), 1.0),
            );
        }
        let rules = ClassifyRules::default();

        group.bench_function(format!("{count}_children"), |b| {
            b.iter(|| {
                black_box(classify(&previous, &current, &from, &to, None, &rules))
            })
        });
    }
    group.finish();
}

fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [10, 100, 500] {
        let mut dom = VirtualDom::new();
        let list = dom.create_container(Vec2::ZERO);
        for _ in 0..count {
            let item = dom.create_element(Vec2::new(100.0, 40.0));
            dom.append(list, item);
        }
        let Ok(mut ctrl) =
            Controller::attach(&mut dom, list, AnimateOptions::with_duration_ms(1e9))
        else {
            continue;
        };
        let mut order = dom.children(list);
        order.reverse();
        let _ = dom.set_order(list, &order);
        let start = Instant::now();
        let _ = ctrl.tick(&mut dom, start);

        let mut frame = 0_u32;
        group.bench_function(format!("{count}_animating"), |b| {
            b.iter(|| {
                frame += 1;
                black_box(ctrl.tick(
                    &mut dom,
                    start + Duration::from_millis(u64::from(frame)),
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, easing_benchmark, classify_benchmark, tick_benchmark);
criterion_main!(benches);
