use serde::{Deserialize, Serialize};

use super::{CellEffect, EffectTiming, SerializedEffect, Timed};
use crate::cell::Cell;
use crate::color::Color;
use crate::error::Result;

/// Overrides the foreground and/or background of bound cells.
///
/// A zero duration makes the recolor a one-shot: it finishes on its first
/// update. Combined with `permanent` and `remove_on_finished` that writes the
/// colors into the cells for good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Recolor {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    /// Seconds to hold the override, 0 finishes immediately
    pub duration: f64,
    pub timing: EffectTiming,
}

impl Recolor {
    pub fn new(foreground: Option<Color>, background: Option<Color>) -> Self {
        Self {
            foreground,
            background,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }
}

impl Timed for Recolor {
    fn timing(&self) -> &EffectTiming {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut EffectTiming {
        &mut self.timing
    }
}

impl CellEffect for Recolor {
    const KIND: &'static str = "recolor";

    fn update(&mut self, elapsed: f64) {
        if self.timing.is_finished() {
            return;
        }
        if self.timing.advance(elapsed) && self.timing.elapsed() >= self.duration {
            self.timing.finish();
        }
    }

    fn apply(&self, cell: &mut Cell) -> bool {
        if !self.timing.delay_finished() {
            return false;
        }
        let before = *cell.actual();
        if let Some(color) = self.foreground {
            cell.actual_mut().foreground = color;
        }
        if let Some(color) = self.background {
            cell.actual_mut().background = color;
        }
        *cell.actual() != before
    }

    fn clear(&self, cell: &mut Cell) {
        cell.reset_actual();
        if self.timing.permanent {
            if let Some(color) = self.foreground {
                cell.set_foreground(color);
            }
            if let Some(color) = self.background {
                cell.set_background(color);
            }
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
    }

    fn save(&self) -> Result<SerializedEffect> {
        SerializedEffect::encode(self)
    }
}
