//! Property tests for the surface model.
//!
//! Random operation sequences must leave the effect binding table and the
//! per-cell effect ids in agreement: every bound cell points back at an
//! effect that lists it, and no effect is kept with an empty cell set.

use glyphgrid_core::effect::{Blink, Delay, Fade, PerCell, Recolor};
use glyphgrid_core::{CellSurface, Color, EffectHandle, Rect};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Bind { x: usize, y: usize, effect: usize },
    Unbind { x: usize, y: usize },
    BindBatch { indices: Vec<usize>, effect: usize },
    Fill { effect: Option<usize> },
    ClearCell { x: usize, y: usize },
    Clear,
    ShiftUp(usize),
    ShiftDown(usize),
    Resize { width: usize, height: usize },
    Update(f64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..12usize, 0..8usize, 0..4usize).prop_map(|(x, y, effect)| Op::Bind { x, y, effect }),
        (0..12usize, 0..8usize).prop_map(|(x, y)| Op::Unbind { x, y }),
        (prop::collection::vec(0..96usize, 0..6), 0..4usize)
            .prop_map(|(indices, effect)| Op::BindBatch { indices, effect }),
        prop::option::of(0..4usize).prop_map(|effect| Op::Fill { effect }),
        (0..12usize, 0..8usize).prop_map(|(x, y)| Op::ClearCell { x, y }),
        Just(Op::Clear),
        (0..4usize).prop_map(Op::ShiftUp),
        (0..4usize).prop_map(Op::ShiftDown),
        (1..12usize, 1..8usize).prop_map(|(width, height)| Op::Resize { width, height }),
        (0.0..1.5f64).prop_map(Op::Update),
    ]
}

fn effect_pool() -> Vec<EffectHandle> {
    vec![
        EffectHandle::new(Fade::new().with_foreground(Color::RED).with_duration(0.5)),
        EffectHandle::new(Blink::new().with_speed(0.2).with_count(2)),
        EffectHandle::new(PerCell(Recolor::new(Some(Color::BLUE), None).with_duration(0.3))),
        EffectHandle::new(Delay::new(0.4)),
    ]
}

fn apply(surface: &mut CellSurface, pool: &[EffectHandle], op: &Op) {
    // Out-of-range coordinates are expected to fail cleanly
    match op {
        Op::Bind { x, y, effect } => {
            let _ = surface.set_effect(*x, *y, Some(&pool[*effect]));
        }
        Op::Unbind { x, y } => {
            let _ = surface.set_effect(*x, *y, None);
        }
        Op::BindBatch { indices, effect } => {
            let _ = surface.set_effect_cells(indices, Some(&pool[*effect]));
        }
        Op::Fill { effect } => {
            surface.fill(Color::WHITE, Color::BLACK, '#' as u32, effect.map(|i| &pool[i]));
        }
        Op::ClearCell { x, y } => {
            let _ = surface.clear_cell(*x, *y);
        }
        Op::Clear => surface.clear(),
        Op::ShiftUp(rows) => surface.shift_rows_up(*rows),
        Op::ShiftDown(rows) => surface.shift_rows_down(*rows),
        Op::Resize { width, height } => {
            let _ = surface.resize(*width, *height);
        }
        Op::Update(elapsed) => {
            surface.update_effects(*elapsed);
        }
    }
}

proptest! {
    #[test]
    fn test_bindings_stay_consistent(ops in prop::collection::vec(op(), 1..40)) {
        let pool = effect_pool();
        let mut surface = CellSurface::new(8, 4).unwrap();

        for op in &ops {
            apply(&mut surface, &pool, op);
            prop_assert!(surface.is_consistent(), "inconsistent after {:?}", op);
        }

        for handle in surface.effects() {
            prop_assert!(!surface.bindings().cells_of(handle).is_empty());
        }
    }

    #[test]
    fn test_bound_cells_match_cell_ids(ops in prop::collection::vec(op(), 1..30)) {
        let pool = effect_pool();
        let mut surface = CellSurface::new(6, 3).unwrap();
        for op in &ops {
            apply(&mut surface, &pool, op);
        }

        let bound = surface.cells().iter().filter(|cell| cell.effect().is_some()).count();
        prop_assert_eq!(bound, surface.bindings().bound_cell_count());
    }

    #[test]
    fn test_print_then_read_back(text in "[ -~]{0,30}", x in 0..10usize, y in 0..3usize) {
        let mut surface = CellSurface::new(10, 3).unwrap();
        surface.print(x, y, &text).unwrap();

        let start = y * 10 + x;
        let fits = text.chars().count().min(surface.len() - start);
        let expected: String = text.chars().take(fits).collect();
        prop_assert_eq!(surface.get_string(start, fits), expected);
    }

    #[test]
    fn test_shift_up_then_down_keeps_middle_rows(rows in 0..4usize) {
        let mut surface = CellSurface::new(3, 4).unwrap();
        surface.print(0, 0, "aaabbbcccddd").unwrap();
        surface.shift_rows_up(rows);
        surface.shift_rows_down(rows);

        // Rows that went up and came back down are untouched
        let original = "aaabbbcccddd";
        prop_assert_eq!(
            surface.get_string(rows * 3, (4 - rows) * 3),
            original[rows * 3..].to_string()
        );
        prop_assert_eq!(surface.times_shifted_up(), rows);
    }
}

fn per_cell_recolor() -> EffectHandle {
    EffectHandle::new(PerCell(Recolor::new(Some(Color::BLUE), None).with_duration(0.3)))
}

#[test]
fn test_copy_region_clones_per_instance_effects() {
    let effect = per_cell_recolor();
    let mut source = CellSurface::new(4, 3).unwrap();
    source
        .fill_area(Rect::new(1, 1, 2, 1), Color::WHITE, Color::BLACK, '#' as u32, Some(&effect))
        .unwrap();
    assert_eq!(source.effect_count(), 2);

    let mut destination = CellSurface::new(5, 5).unwrap();
    source
        .copy_region_to_at(Rect::new(0, 1, 4, 2), &mut destination, 2, 3)
        .unwrap();

    // (1, 1) and (2, 1) land on (3, 3) and (4, 3); (3, 1) falls off the edge
    assert_eq!(destination.effect_count(), 2);
    let copied = destination.effect(3, 3).unwrap().cloned().unwrap();
    let original = source.effect(1, 1).unwrap().cloned().unwrap();
    assert_ne!(copied, original);
    assert_ne!(copied, effect);
    assert_ne!(Some(&copied), destination.effect(4, 3).unwrap());
    assert_eq!(destination.get_string_at(3, 3, 2), "##");

    assert!(source.is_consistent());
    assert!(destination.is_consistent());

    destination.remove_all_effects();
    assert_eq!(source.effect_count(), 2);
    assert!(source.is_consistent());
}

#[test]
fn test_copy_from_clones_per_instance_effects() {
    let effect = per_cell_recolor();
    let mut source = CellSurface::new(4, 3).unwrap();
    source.set_effect(1, 1, Some(&effect)).unwrap();
    source.set_effect(2, 1, Some(&effect)).unwrap();

    let mut destination = CellSurface::new(3, 2).unwrap();
    source.copy_from_to(1, 1, &mut destination).unwrap();

    assert_eq!(destination.effect_count(), 2);
    let first = destination.effect(0, 0).unwrap().cloned().unwrap();
    let second = destination.effect(1, 0).unwrap().cloned().unwrap();
    assert_ne!(first, second);
    assert_ne!(Some(&first), source.effect(1, 1).unwrap());
    assert!(destination.effect(2, 0).unwrap().is_none());

    assert!(source.is_consistent());
    assert!(destination.is_consistent());
    assert_eq!(source.effect_count(), 2);
}

proptest! {
    #[test]
    fn test_copy_region_keeps_both_surfaces_consistent(
        x in 0..6usize,
        y in 0..4usize,
        width in 0..6usize,
        height in 0..4usize,
        dest_x in 0..8usize,
        dest_y in 0..6usize,
        shared in any::<bool>(),
    ) {
        let effect = if shared {
            EffectHandle::new(Delay::new(0.4))
        } else {
            per_cell_recolor()
        };
        let mut source = CellSurface::new(6, 4).unwrap();
        source.fill(Color::WHITE, Color::BLACK, '#' as u32, Some(&effect));
        let mut destination = CellSurface::new(5, 5).unwrap();

        let region = Rect::new(x, y, width, height);
        let result = source.copy_region_to_at(region, &mut destination, dest_x, dest_y);
        prop_assert_eq!(result.is_ok(), source.area().contains_rect(&region));

        prop_assert!(source.is_consistent());
        prop_assert!(destination.is_consistent());
        let bound = destination.bindings().bound_cell_count();
        if shared {
            prop_assert!(destination.effect_count() <= 1);
        } else {
            prop_assert_eq!(destination.effect_count(), bound);
        }
    }
}
