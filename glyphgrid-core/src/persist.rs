//! Persisted surface state
//!
//! Cells are stored by desired appearance in row-major order. Effect
//! bindings are stored per effect as a list of cell positions, since
//! positions survive a resize and indices do not. Loading replays one
//! batched bind per effect.

use serde::{Deserialize, Serialize};

use crate::cell::Appearance;
use crate::color::Color;
use crate::effect::{EffectRegistry, SerializedEffect};
use crate::error::{Error, Result};
use crate::surface::CellSurface;
use crate::Point;

/// One effect and the cells it is bound to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundEffectState {
    pub effect: SerializedEffect,
    pub positions: Vec<Point>,
}

/// Everything needed to rebuild a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceState {
    pub width: usize,
    pub height: usize,
    pub default_foreground: Color,
    pub default_background: Color,
    #[serde(default)]
    pub default_glyph: u32,
    pub cells: Vec<Appearance>,
    #[serde(default)]
    pub effects: Vec<BoundEffectState>,
}

impl SurfaceState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl CellSurface {
    /// Capture the surface for persistence
    pub fn save_state(&self) -> Result<SurfaceState> {
        let width = self.width();
        let mut effects = Vec::with_capacity(self.effect_count());
        for (handle, indices) in self.bindings().entries() {
            effects.push(BoundEffectState {
                effect: handle.save()?,
                positions: indices
                    .into_iter()
                    .map(|index| Point::from_index(index, width))
                    .collect(),
            });
        }
        // Stable output regardless of hash order
        effects.sort_by_key(|entry| entry.positions.first().map(|p| p.to_index(width)));

        Ok(SurfaceState {
            width,
            height: self.height(),
            default_foreground: self.default_foreground(),
            default_background: self.default_background(),
            default_glyph: self.default_glyph(),
            cells: self.cells().iter().map(|cell| *cell.desired()).collect(),
            effects,
        })
    }

    /// Rebuild a surface from saved state.
    ///
    /// Effects are decoded through `registry`. Positions outside the surface
    /// are skipped with a warning.
    pub fn restore(state: &SurfaceState, registry: &EffectRegistry) -> Result<CellSurface> {
        let mut surface = CellSurface::with_defaults(
            state.width,
            state.height,
            state.default_foreground,
            state.default_background,
        )?;
        surface.set_default_glyph(state.default_glyph);

        if state.cells.len() != surface.len() {
            return Err(Error::IndexOutOfRange {
                index: state.cells.len(),
                len: surface.len(),
            });
        }
        for (index, appearance) in state.cells.iter().enumerate() {
            let point = Point::from_index(index, state.width);
            surface.set_appearance(point.x, point.y, appearance)?;
        }

        for entry in &state.effects {
            let handle = registry.decode_handle(&entry.effect)?;
            let mut indices = Vec::with_capacity(entry.positions.len());
            for point in &entry.positions {
                match surface.index_of(point.x, point.y) {
                    Ok(index) => indices.push(index),
                    Err(_) => log::warn!(
                        "skipping {} effect position ({}, {}) outside {}x{} surface",
                        entry.effect.kind,
                        point.x,
                        point.y,
                        state.width,
                        state.height
                    ),
                }
            }
            surface.set_effect_cells(&indices, Some(&handle))?;
        }

        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Mirror;
    use crate::effect::{EffectHandle, Fade, PerCell, Recolor, Sharing};

    #[test]
    fn test_save_and_restore() {
        let mut surface = CellSurface::with_defaults(3, 2, Color::GRAY, Color::BLACK).unwrap();
        surface.print(0, 0, "abcdef").unwrap();
        surface.set_mirror(2, 1, Mirror::Both).unwrap();
        let fade = EffectHandle::new(Fade::new().with_foreground(Color::RED).with_duration(2.0));
        surface.set_effect_cells(&[1, 4], Some(&fade)).unwrap();

        let state = surface.save_state().unwrap();
        assert_eq!(state.effects.len(), 1);
        assert_eq!(
            state.effects[0].positions,
            vec![Point::new(1, 0), Point::new(1, 1)]
        );

        let json = state.to_json().unwrap();
        let parsed = SurfaceState::from_json(&json).unwrap();
        let restored = CellSurface::restore(&parsed, &EffectRegistry::with_builtin()).unwrap();

        assert_eq!(restored.get_string(0, 6), "abcdef");
        assert_eq!(restored.cells()[5].mirror(), Mirror::Both);
        assert_eq!(restored.default_foreground(), Color::GRAY);
        assert_eq!(restored.effect_count(), 1);
        let handle = restored.effect(1, 1).unwrap().cloned();
        assert!(handle.is_some_and(|h| h.kind() == "fade"));
        assert!(restored.is_consistent());
    }

    #[test]
    fn test_per_instance_effects_restore_separately() {
        let mut surface = CellSurface::new(2, 1).unwrap();
        let recolor = EffectHandle::new(PerCell(Recolor::new(Some(Color::RED), None)));
        surface.fill(Color::WHITE, Color::BLACK, 0, Some(&recolor));
        assert_eq!(surface.effect_count(), 2);

        let state = surface.save_state().unwrap();
        assert!(state
            .effects
            .iter()
            .all(|e| e.effect.sharing == Sharing::PerInstance));
        let restored = CellSurface::restore(&state, &EffectRegistry::with_builtin()).unwrap();
        assert_eq!(restored.effect_count(), 2);
    }

    #[test]
    fn test_restore_skips_positions_outside() {
        let mut state = CellSurface::new(2, 2).unwrap().save_state().unwrap();
        state.effects.push(BoundEffectState {
            effect: saved_delay(),
            positions: vec![Point::new(0, 0), Point::new(5, 5)],
        });
        let restored = CellSurface::restore(&state, &EffectRegistry::with_builtin()).unwrap();
        assert_eq!(restored.bindings().bound_cell_count(), 1);
    }

    #[test]
    fn test_restore_rejects_wrong_cell_count() {
        let mut state = CellSurface::new(2, 2).unwrap().save_state().unwrap();
        state.cells.pop();
        assert!(CellSurface::restore(&state, &EffectRegistry::new()).is_err());
    }

    #[test]
    fn test_restore_unknown_effect() {
        let mut state = CellSurface::new(1, 1).unwrap().save_state().unwrap();
        state.effects.push(BoundEffectState {
            effect: SerializedEffect {
                kind: "warp".to_string(),
                sharing: Sharing::Shared,
                state: serde_json::Value::Null,
            },
            positions: vec![Point::new(0, 0)],
        });
        assert!(matches!(
            CellSurface::restore(&state, &EffectRegistry::with_builtin()),
            Err(Error::UnknownEffect(_))
        ));
    }

    fn saved_delay() -> SerializedEffect {
        SerializedEffect {
            kind: "delay".to_string(),
            sharing: Sharing::Shared,
            state: serde_json::json!({ "duration": 1.0 }),
        }
    }
}
