//! Surface benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glyphgrid::model::effect::{Blink, Fade, PerCell, Recolor};
use glyphgrid::{CellSurface, Color, EffectHandle};

fn bench_surface_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface");

    let line = "Hello, World! ".repeat(6);

    group.bench_function("print_rows", |b| {
        b.iter(|| {
            let mut surface = CellSurface::new(80, 25).unwrap();
            for y in 0..25 {
                surface.print(0, y, &line).unwrap();
            }
            black_box(surface)
        })
    });

    group.finish();
}

fn bench_update_shared_effect(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface");

    // One fade bound to every cell
    group.bench_function("update_shared_fade", |b| {
        let mut surface = CellSurface::new(80, 25).unwrap();
        let fade = EffectHandle::new(
            Fade::new()
                .with_foreground(Color::RED)
                .with_duration(1.0)
                .with_repeat(true),
        );
        surface.fill(Color::WHITE, Color::BLACK, '#' as u32, Some(&fade));
        b.iter(|| black_box(surface.update_effects(black_box(1.0 / 60.0))))
    });

    group.finish();
}

fn bench_update_per_cell_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface");

    // One recolor clone per cell
    group.bench_function("update_per_cell_recolor", |b| {
        let mut surface = CellSurface::new(80, 25).unwrap();
        let recolor = EffectHandle::new(PerCell(Recolor::new(Some(Color::CYAN), None).with_duration(10.0)));
        surface.fill(Color::WHITE, Color::BLACK, '#' as u32, Some(&recolor));
        b.iter(|| black_box(surface.update_effects(black_box(1.0 / 60.0))))
    });

    group.finish();
}

fn bench_shift_with_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface");

    group.bench_function("shift_rows_up", |b| {
        b.iter(|| {
            let mut surface = CellSurface::new(80, 25).unwrap();
            let blink = EffectHandle::new(Blink::new());
            for y in 0..25 {
                surface.set_effect(y, y, Some(&blink)).unwrap();
            }
            for _ in 0..25 {
                surface.shift_rows_up(1);
            }
            black_box(surface)
        })
    });

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface");

    group.bench_function("resize", |b| {
        b.iter(|| {
            let mut surface = CellSurface::new(80, 25).unwrap();
            surface.print(0, 0, &"Hello, World!".repeat(40)).unwrap();
            surface.resize(120, 40).unwrap();
            surface.resize(80, 25).unwrap();
            surface.resize(132, 50).unwrap();
            black_box(surface)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_surface_print,
    bench_update_shared_effect,
    bench_update_per_cell_effects,
    bench_shift_with_effects,
    bench_resize
);
criterion_main!(benches);
