//! Blinking effects

use serde::{Deserialize, Deserializer, Serialize};

use super::{CellEffect, EffectTiming, SerializedEffect, Timed};
use crate::cell::Cell;
use crate::color::Color;
use crate::error::Result;

/// On/off duty cycle shared by the blink effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct BlinkCycle {
    /// Seconds per on or off phase, finite and positive
    #[serde(deserialize_with = "deserialize_speed")]
    speed: f64,
    /// Number of full on/off cycles, -1 blinks forever
    count: i32,
    is_on: bool,
    toggles: i64,
    phase_elapsed: f64,
}

fn is_valid_speed(seconds: f64) -> bool {
    seconds.is_finite() && seconds > 0.0
}

fn deserialize_speed<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let speed = f64::deserialize(deserializer)?;
    if is_valid_speed(speed) {
        Ok(speed)
    } else {
        Err(serde::de::Error::custom(format!(
            "blink speed must be a positive number of seconds, got {speed}"
        )))
    }
}

impl Default for BlinkCycle {
    fn default() -> Self {
        Self {
            speed: 0.5,
            count: -1,
            is_on: true,
            toggles: 0,
            phase_elapsed: 0.0,
        }
    }
}

impl BlinkCycle {
    /// Advance the cycle; returns true when the requested count ran out
    fn advance(&mut self, elapsed: f64) -> bool {
        self.phase_elapsed += elapsed;
        if !is_valid_speed(self.speed) {
            return self.count >= 0;
        }
        if !self.phase_elapsed.is_finite() {
            self.phase_elapsed = 0.0;
            return false;
        }
        let phases = (self.phase_elapsed / self.speed).floor();
        if phases < 1.0 {
            return false;
        }
        self.phase_elapsed %= self.speed;

        if self.count >= 0 {
            let left = (i64::from(self.count) * 2 - self.toggles).max(0);
            if phases >= left as f64 {
                self.toggles = i64::from(self.count) * 2;
                self.is_on = true;
                return true;
            }
            // phases < left here, so it fits
            self.toggles += phases as i64;
        }
        if phases % 2.0 == 1.0 {
            self.is_on = !self.is_on;
        }
        false
    }

    fn set_speed(&mut self, seconds: f64) {
        if is_valid_speed(seconds) {
            self.speed = seconds;
        } else {
            log::warn!("ignoring blink speed {seconds}, keeping {}", self.speed);
        }
    }

    fn restart(&mut self) {
        self.is_on = true;
        self.toggles = 0;
        self.phase_elapsed = 0.0;
    }
}

/// Hides the glyph (or swaps its foreground) on a duty cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Blink {
    /// Foreground shown during the off phase; hides the glyph when unset
    pub blink_out_color: Option<Color>,
    #[serde(flatten)]
    cycle: BlinkCycle,
    pub timing: EffectTiming,
}

impl Blink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds per phase; zero, negative and non-finite values are ignored
    pub fn with_speed(mut self, seconds: f64) -> Self {
        self.cycle.set_speed(seconds);
        self
    }

    /// Full on/off cycles before finishing, -1 for forever
    pub fn with_count(mut self, count: i32) -> Self {
        self.cycle.count = count;
        self
    }

    pub fn with_blink_out_color(mut self, color: Color) -> Self {
        self.blink_out_color = Some(color);
        self
    }

    pub fn speed(&self) -> f64 {
        self.cycle.speed
    }

    pub fn count(&self) -> i32 {
        self.cycle.count
    }

    pub fn is_on(&self) -> bool {
        self.cycle.is_on
    }
}

impl Timed for Blink {
    fn timing(&self) -> &EffectTiming {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut EffectTiming {
        &mut self.timing
    }
}

impl CellEffect for Blink {
    const KIND: &'static str = "blink";

    fn update(&mut self, elapsed: f64) {
        if self.timing.is_finished() || !self.timing.advance(elapsed) {
            return;
        }
        let step = self.timing.elapsed();
        self.timing.reset_elapsed();
        if self.cycle.advance(step) {
            self.timing.finish();
        }
    }

    fn apply(&self, cell: &mut Cell) -> bool {
        let before = *cell.actual();
        let desired = *cell.desired();
        let actual = cell.actual_mut();

        if self.cycle.is_on {
            actual.visible = desired.visible;
            actual.foreground = desired.foreground;
        } else {
            match self.blink_out_color {
                Some(color) => actual.foreground = color,
                None => actual.visible = false,
            }
        }

        *cell.actual() != before
    }

    fn is_finished(&self) -> bool {
        self.timing.is_finished()
    }

    fn remove_on_finished(&self) -> bool {
        self.timing.remove_on_finished
    }

    fn restart(&mut self) {
        self.timing.restart();
        self.cycle.restart();
    }

    fn save(&self) -> Result<SerializedEffect> {
        SerializedEffect::encode(self)
    }
}

/// Swaps the glyph for another one on a duty cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BlinkGlyph {
    /// Glyph drawn during the off phase
    pub glyph: u32,
    #[serde(flatten)]
    cycle: BlinkCycle,
    pub timing: EffectTiming,
}

impl BlinkGlyph {
    pub fn new(glyph: u32) -> Self {
        Self {
            glyph,
            ..Self::default()
        }
    }

    pub fn with_speed(mut self, seconds: f64) -> Self {
        self.cycle.set_speed(seconds);
        self
    }

    pub fn with_count(mut self, count: i32) -> Self {
        self.cycle.count = count;
        self
    }

    pub fn is_on(&self) -> bool {
        self.cycle.is_on
    }
}

impl Timed for BlinkGlyph {
    fn timing(&self) -> &EffectTiming {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut EffectTiming {
        &mut self.timing
    }
}

impl CellEffect for BlinkGlyph {
    const KIND: &'static str = "blink_glyph";

    fn update(&mut self, elapsed: f64) {
        if self.timing.is_finished() || !self.timing.advance(elapsed) {
            return;
        }
        let step = self.timing.elapsed();
        self.timing.reset_elapsed();
        if self.cycle.advance(step) {
            self.timing.finish();
        }
    }

    fn apply(&self, cell: &mut Cell) -> bool {
        let glyph = if self.cycle.is_on {
            cell.glyph()
        } else {
            self.glyph
        };
        let changed = cell.actual().glyph != glyph;
        cell.actual_mut().glyph = glyph;
        changed
    }

    fn is_finished(&self) -> bool {
        self.timing.is_finished()
    }

    fn remove_on_finished(&self) -> bool {
        self.timing.remove_on_finished
    }

    fn restart(&mut self) {
        self.timing.restart();
        self.cycle.restart();
    }

    fn save(&self) -> Result<SerializedEffect> {
        SerializedEffect::encode(self)
    }
}
