//! Effect to cell binding table
//!
//! Two maps kept in lockstep:
//! - effect id -> handle plus the set of bound cell indices
//! - cell index -> effect id
//!
//! and, mirrored on the cells themselves, `Cell::effect()`. A cell is bound
//! to at most one effect, and an effect entry never outlives its last cell.
//!
//! The table never fails. Unknown cells or effects are no-ops, since effects
//! are an optional overlay that must not take down a render loop.

use std::collections::{BTreeSet, HashMap};

use crate::cell::Cell;
use crate::effect::{EffectHandle, EffectId, Sharing};

#[derive(Debug)]
struct BoundEffect {
    handle: EffectHandle,
    cells: BTreeSet<usize>,
}

/// Binding table owned by a [`CellSurface`](crate::CellSurface)
#[derive(Debug, Default)]
pub struct EffectBindings {
    effects: HashMap<EffectId, BoundEffect>,
    cells: HashMap<usize, EffectId>,
}

impl EffectBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct live effects
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Number of bound cells
    pub fn bound_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Effect bound to the cell at `index`
    pub fn effect_of(&self, index: usize) -> Option<&EffectHandle> {
        let id = self.cells.get(&index)?;
        self.effects.get(id).map(|bound| &bound.handle)
    }

    pub fn handle(&self, id: EffectId) -> Option<&EffectHandle> {
        self.effects.get(&id).map(|bound| &bound.handle)
    }

    /// Every live effect
    pub fn handles(&self) -> impl Iterator<Item = &EffectHandle> + '_ {
        self.effects.values().map(|bound| &bound.handle)
    }

    /// Cells bound to `effect`, ascending
    pub fn cells_of(&self, effect: &EffectHandle) -> Vec<usize> {
        self.effects
            .get(&effect.id())
            .map(|bound| bound.cells.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every live effect with its bound cells
    pub fn entries(&self) -> impl Iterator<Item = (&EffectHandle, Vec<usize>)> + '_ {
        self.effects
            .values()
            .map(|bound| (&bound.handle, bound.cells.iter().copied().collect()))
    }

    /// Bind `effect` to every index in `indices`.
    ///
    /// Shared effects bind the same instance everywhere, and a cell already
    /// bound to that instance is left alone so its phase is kept.
    /// Per-instance effects bind a fresh clone to each cell.
    pub(crate) fn attach(&mut self, cells: &mut [Cell], indices: &[usize], effect: &EffectHandle) {
        let sharing = effect.sharing();
        for &index in indices {
            if index >= cells.len() {
                continue;
            }
            let handle = match sharing {
                Sharing::Shared => effect.clone(),
                Sharing::PerInstance => effect.duplicate(),
            };
            let id = handle.id();
            if self.cells.get(&index) == Some(&id) {
                continue;
            }

            self.detach(cells, index);
            self.effects
                .entry(id)
                .or_insert_with(|| BoundEffect {
                    handle,
                    cells: BTreeSet::new(),
                })
                .cells
                .insert(index);
            self.cells.insert(index, id);
            cells[index].set_effect_id(Some(id));
        }
    }

    /// Detach whatever effect the cell at `index` is bound to.
    /// Returns true if a binding was removed.
    pub(crate) fn detach(&mut self, cells: &mut [Cell], index: usize) -> bool {
        let Some(id) = self.cells.remove(&index) else {
            return false;
        };

        if let Some(bound) = self.effects.get_mut(&id) {
            if let (Some(cell), Some(effect)) = (cells.get_mut(index), bound.handle.try_borrow()) {
                effect.clear(cell);
            }
            bound.cells.remove(&index);
            if bound.cells.is_empty() {
                self.effects.remove(&id);
                log::trace!("pruned effect {id:?}");
            }
        }

        if let Some(cell) = cells.get_mut(index) {
            cell.set_effect_id(None);
        }
        true
    }

    /// Detach `effect` from every cell it is bound to
    pub(crate) fn remove(&mut self, cells: &mut [Cell], effect: &EffectHandle) {
        for index in self.cells_of(effect) {
            self.detach(cells, index);
        }
    }

    /// Detach every effect
    pub(crate) fn clear(&mut self, cells: &mut [Cell]) {
        let bound: Vec<usize> = self.cells.keys().copied().collect();
        for index in bound {
            self.detach(cells, index);
        }
    }

    /// Move bindings to new cell indices after the cell array was rebuilt.
    ///
    /// `map` gives the new index of an old one, or None if the cell is gone.
    /// Cells that are gone should have been detached beforehand so their
    /// effect got a chance to clear.
    pub(crate) fn remap(&mut self, cells: &mut [Cell], map: impl Fn(usize) -> Option<usize>) {
        let old_cells = std::mem::take(&mut self.cells);
        for bound in self.effects.values_mut() {
            bound.cells.clear();
        }

        for (old_index, id) in old_cells {
            let Some(new_index) = map(old_index).filter(|&i| i < cells.len()) else {
                continue;
            };
            if let Some(bound) = self.effects.get_mut(&id) {
                bound.cells.insert(new_index);
                self.cells.insert(new_index, id);
            }
        }

        self.effects.retain(|id, bound| {
            let keep = !bound.cells.is_empty();
            if !keep {
                log::trace!("pruned effect {id:?} on remap");
            }
            keep
        });

        for (index, cell) in cells.iter_mut().enumerate() {
            cell.set_effect_id(self.cells.get(&index).copied());
        }
    }

    /// Advance every effect once and re-apply it to its cells.
    ///
    /// Finished effects flagged remove-on-finished are cleared from and
    /// unbound from all their cells. Returns true if any cell changed.
    pub(crate) fn update(&mut self, cells: &mut [Cell], elapsed: f64) -> bool {
        let Self {
            effects,
            cells: cell_map,
        } = self;
        let mut dirty = false;

        for (id, bound) in effects.iter_mut() {
            let Some(mut effect) = bound.handle.try_borrow_mut() else {
                log::warn!("effect {id:?} is borrowed elsewhere, skipping this frame");
                continue;
            };

            effect.update(elapsed);
            for &index in &bound.cells {
                if let Some(cell) = cells.get_mut(index) {
                    dirty |= effect.apply(cell);
                }
            }

            if effect.is_finished() && effect.remove_on_finished() {
                log::debug!(
                    "{} effect finished, unbinding {} cells",
                    effect.kind(),
                    bound.cells.len()
                );
                for index in std::mem::take(&mut bound.cells) {
                    if let Some(cell) = cells.get_mut(index) {
                        effect.clear(cell);
                        cell.set_effect_id(None);
                    }
                    cell_map.remove(&index);
                    dirty = true;
                }
            }
        }

        effects.retain(|_, bound| !bound.cells.is_empty());
        dirty
    }

    /// Check the table against the cells it manages:
    /// - a cell has an effect iff the cell map has it iff the effect's set has it
    /// - no effect entry has an empty cell set
    pub fn is_consistent(&self, cells: &[Cell]) -> bool {
        let symmetric = cells.iter().enumerate().all(|(index, cell)| {
            match (cell.effect(), self.cells.get(&index)) {
                (None, None) => true,
                (Some(id), Some(&mapped)) if id == mapped => self
                    .effects
                    .get(&id)
                    .map_or(false, |bound| bound.cells.contains(&index)),
                _ => false,
            }
        });
        let no_strays = self.effects.values().all(|bound| {
            !bound.cells.is_empty()
                && bound
                    .cells
                    .iter()
                    .all(|index| self.cells.get(index) == Some(&bound.handle.id()))
        });
        symmetric && no_strays && self.cells.keys().all(|&index| index < cells.len())
    }
}
