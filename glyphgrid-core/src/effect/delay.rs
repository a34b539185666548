use serde::{Deserialize, Serialize};

use super::{CellEffect, EffectTiming, SerializedEffect, Timed};
use crate::cell::Cell;
use crate::error::Result;

/// Does nothing for a number of seconds. Mostly useful inside an
/// [`EffectsChain`](super::EffectsChain).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Delay {
    pub duration: f64,
    pub timing: EffectTiming,
}

impl Delay {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            timing: EffectTiming::default(),
        }
    }
}

impl Timed for Delay {
    fn timing(&self) -> &EffectTiming {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut EffectTiming {
        &mut self.timing
    }
}

impl CellEffect for Delay {
    const KIND: &'static str = "delay";

    fn update(&mut self, elapsed: f64) {
        if self.timing.is_finished() {
            return;
        }
        if self.timing.advance(elapsed) && self.timing.elapsed() >= self.duration {
            self.timing.finish();
        }
    }

    fn apply(&self, _cell: &mut Cell) -> bool {
        false
    }

    fn is_finished(&self) -> bool {
        self.timing.is_finished()
    }

    fn remove_on_finished(&self) -> bool {
        self.timing.remove_on_finished
    }

    fn restart(&mut self) {
        self.timing.restart();
    }

    fn save(&self) -> Result<SerializedEffect> {
        SerializedEffect::encode(self)
    }
}
