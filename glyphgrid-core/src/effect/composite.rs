//! Effects built from other effects
//!
//! Children are owned by value. A composite is bound like any other effect;
//! its children never appear in a surface's binding table.

use serde::{Deserialize, Serialize};

use super::{BoxedEffect, CellEffect, EffectRegistry, EffectTiming, SerializedEffect, Timed};
use crate::cell::Cell;
use crate::error::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CompositeState {
    effects: Vec<SerializedEffect>,
    repeat: bool,
    active: usize,
    timing: EffectTiming,
}

fn save_children(effects: &[BoxedEffect]) -> Result<Vec<SerializedEffect>> {
    effects.iter().map(|effect| effect.save()).collect()
}

fn load_children(
    registry: &EffectRegistry,
    saved: &[SerializedEffect],
) -> Result<Vec<BoxedEffect>> {
    saved.iter().map(|effect| registry.decode(effect)).collect()
}

/// Runs child effects one after another
#[derive(Debug, Clone, Default)]
pub struct EffectsChain {
    effects: Vec<BoxedEffect>,
    /// Start over from the first child after the last one finishes
    pub repeat: bool,
    pub timing: EffectTiming,
    active: usize,
}

impl EffectsChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child effect
    pub fn then<E: CellEffect>(mut self, effect: E) -> Self {
        self.effects.push(Box::new(effect));
        self
    }

    pub fn push(&mut self, effect: BoxedEffect) {
        self.effects.push(effect);
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn effects(&self) -> &[BoxedEffect] {
        &self.effects
    }

    /// Index of the child currently running
    pub fn active_index(&self) -> usize {
        self.active
    }

    pub(crate) fn from_serialized(
        registry: &EffectRegistry,
        saved: &SerializedEffect,
    ) -> Result<Self> {
        let state: CompositeState = saved.decode()?;
        let effects = load_children(registry, &state.effects)?;
        Ok(Self {
            active: state.active.min(effects.len()),
            effects,
            repeat: state.repeat,
            timing: state.timing,
        })
    }
}

impl Timed for EffectsChain {
    fn timing(&self) -> &EffectTiming {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut EffectTiming {
        &mut self.timing
    }
}

impl CellEffect for EffectsChain {
    const KIND: &'static str = "chain";

    fn update(&mut self, elapsed: f64) {
        if self.timing.is_finished() || !self.timing.advance(elapsed) {
            return;
        }
        let step = self.timing.elapsed();
        self.timing.reset_elapsed();

        let Some(current) = self.effects.get_mut(self.active) else {
            self.timing.finish();
            return;
        };
        current.update(step);
        if !current.is_finished() {
            return;
        }

        self.active += 1;
        if self.active < self.effects.len() {
            self.effects[self.active].restart();
        } else if self.repeat {
            self.active = 0;
            for effect in &mut self.effects {
                effect.restart();
            }
        } else {
            self.active = self.effects.len().saturating_sub(1);
            self.timing.finish();
        }
    }

    fn apply(&self, cell: &mut Cell) -> bool {
        let before = *cell.actual();
        cell.reset_actual();
        if let Some(current) = self.effects.get(self.active) {
            current.apply(cell);
        }
        *cell.actual() != before
    }

    fn clear(&self, cell: &mut Cell) {
        match self.effects.get(self.active) {
            Some(current) => current.clear(cell),
            None => cell.reset_actual(),
        }
    }

    fn is_finished(&self) -> bool {
        self.timing.is_finished()
    }

    fn remove_on_finished(&self) -> bool {
        self.timing.remove_on_finished
    }

    fn restart(&mut self) {
        self.timing.restart();
        self.active = 0;
        for effect in &mut self.effects {
            effect.restart();
        }
    }

    fn save(&self) -> Result<SerializedEffect> {
        let state = CompositeState {
            effects: save_children(&self.effects)?,
            repeat: self.repeat,
            active: self.active,
            timing: self.timing.clone(),
        };
        Ok(SerializedEffect {
            kind: Self::KIND.to_string(),
            sharing: Self::SHARING,
            state: serde_json::to_value(state)?,
        })
    }
}

/// Runs child effects at the same time; finished once every child is
#[derive(Debug, Clone, Default)]
pub struct ConcurrentEffect {
    effects: Vec<BoxedEffect>,
    pub timing: EffectTiming,
}

impl ConcurrentEffect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<E: CellEffect>(mut self, effect: E) -> Self {
        self.effects.push(Box::new(effect));
        self
    }

    pub fn push(&mut self, effect: BoxedEffect) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[BoxedEffect] {
        &self.effects
    }

    pub(crate) fn from_serialized(
        registry: &EffectRegistry,
        saved: &SerializedEffect,
    ) -> Result<Self> {
        let state: CompositeState = saved.decode()?;
        Ok(Self {
            effects: load_children(registry, &state.effects)?,
            timing: state.timing,
        })
    }
}

impl Timed for ConcurrentEffect {
    fn timing(&self) -> &EffectTiming {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut EffectTiming {
        &mut self.timing
    }
}

impl CellEffect for ConcurrentEffect {
    const KIND: &'static str = "concurrent";

    fn update(&mut self, elapsed: f64) {
        if self.timing.is_finished() || !self.timing.advance(elapsed) {
            return;
        }
        let step = self.timing.elapsed();
        self.timing.reset_elapsed();

        for effect in self.effects.iter_mut().filter(|e| !e.is_finished()) {
            effect.update(step);
        }
        if self.effects.iter().all(|e| e.is_finished()) {
            self.timing.finish();
        }
    }

    fn apply(&self, cell: &mut Cell) -> bool {
        let mut changed = false;
        for effect in &self.effects {
            changed |= effect.apply(cell);
        }
        changed
    }

    fn clear(&self, cell: &mut Cell) {
        cell.reset_actual();
        for effect in &self.effects {
            effect.clear(cell);
        }
    }

    fn is_finished(&self) -> bool {
        self.timing.is_finished()
    }

    fn remove_on_finished(&self) -> bool {
        self.timing.remove_on_finished
    }

    fn restart(&mut self) {
        self.timing.restart();
        for effect in &mut self.effects {
            effect.restart();
        }
    }

    fn save(&self) -> Result<SerializedEffect> {
        let state = CompositeState {
            effects: save_children(&self.effects)?,
            timing: self.timing.clone(),
            ..CompositeState::default()
        };
        Ok(SerializedEffect {
            kind: Self::KIND.to_string(),
            sharing: Self::SHARING,
            state: serde_json::to_value(state)?,
        })
    }
}
