//! Gradient fade

use serde::{Deserialize, Serialize};

use super::{CellEffect, EffectTiming, SerializedEffect, Timed};
use crate::cell::Cell;
use crate::color::Color;
use crate::error::Result;
use crate::gradient::ColorGradient;

/// Fades the foreground and/or background along a gradient.
///
/// With `use_cell_foreground` (or background) set, the first stop of the
/// gradient is replaced by the cell's own desired color, so a two stop
/// gradient fades from whatever the cell shows to the second stop. With
/// `use_cell_destination_reverse` the last stop is replaced instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fade {
    pub foreground: ColorGradient,
    pub background: ColorGradient,
    pub fade_foreground: bool,
    pub fade_background: bool,
    pub use_cell_foreground: bool,
    pub use_cell_background: bool,
    pub use_cell_destination_reverse: bool,
    /// Seconds for one pass along the gradient
    pub duration: f64,
    pub repeat: bool,
    /// Run back down the gradient after reaching the end
    pub auto_reverse: bool,
    pub timing: EffectTiming,
    value: f64,
    going_down: bool,
}

impl Default for Fade {
    fn default() -> Self {
        Self {
            foreground: ColorGradient::from(Color::TRANSPARENT),
            background: ColorGradient::from(Color::TRANSPARENT),
            fade_foreground: false,
            fade_background: false,
            use_cell_foreground: true,
            use_cell_background: true,
            use_cell_destination_reverse: false,
            duration: 1.0,
            repeat: false,
            auto_reverse: false,
            timing: EffectTiming::default(),
            value: 0.0,
            going_down: false,
        }
    }
}

impl Fade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fade the foreground along `gradient`
    pub fn with_foreground(mut self, gradient: impl Into<ColorGradient>) -> Self {
        self.foreground = gradient.into();
        self.fade_foreground = true;
        self
    }

    /// Fade the background along `gradient`
    pub fn with_background(mut self, gradient: impl Into<ColorGradient>) -> Self {
        self.background = gradient.into();
        self.fade_background = true;
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_auto_reverse(mut self, auto_reverse: bool) -> Self {
        self.auto_reverse = auto_reverse;
        self
    }

    /// Whether the cell's own colors replace a gradient endpoint
    pub fn with_use_cell_colors(mut self, foreground: bool, background: bool) -> Self {
        self.use_cell_foreground = foreground;
        self.use_cell_background = background;
        self
    }

    pub fn with_cell_destination_reverse(mut self, reverse: bool) -> Self {
        self.use_cell_destination_reverse = reverse;
        self
    }

    /// Position along the gradient, 0.0..=1.0
    pub fn value(&self) -> f64 {
        self.value
    }

    fn cell_stop(&self, gradient: &ColorGradient) -> usize {
        if self.use_cell_destination_reverse {
            gradient.stops().len().saturating_sub(1)
        } else {
            0
        }
    }

    fn sample(&self, gradient: &ColorGradient, use_cell: bool, cell_color: Color) -> Color {
        let amount = self.value as f32;
        if use_cell {
            gradient.lerp_replacing(amount, self.cell_stop(gradient), cell_color)
        } else {
            gradient.lerp(amount)
        }
    }

    fn end_color(&self, gradient: &ColorGradient, use_cell: bool, cell_color: Color) -> Color {
        if use_cell && self.use_cell_destination_reverse {
            cell_color
        } else {
            gradient.last()
        }
    }
}

impl Timed for Fade {
    fn timing(&self) -> &EffectTiming {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut EffectTiming {
        &mut self.timing
    }
}

impl CellEffect for Fade {
    const KIND: &'static str = "fade";

    fn update(&mut self, elapsed: f64) {
        if !self.timing.advance(elapsed) {
            return;
        }
        if self.timing.is_finished() && !self.repeat {
            return;
        }

        if self.duration <= 0.0 {
            self.value = if self.auto_reverse { 0.0 } else { 1.0 };
            if !self.repeat {
                self.timing.finish();
            }
            return;
        }

        if self.timing.elapsed() >= self.duration {
            if self.auto_reverse && !self.going_down {
                self.going_down = true;
                self.timing.reset_elapsed();
            } else if !self.repeat {
                self.value = if self.auto_reverse { 0.0 } else { 1.0 };
                self.timing.finish();
                self.timing.reset_elapsed();
                log::trace!("fade finished");
                return;
            } else {
                self.timing.reset_elapsed();
                self.going_down = false;
            }
        }

        let progress = self.timing.elapsed() / self.duration;
        self.value = if self.going_down {
            1.0 - progress
        } else {
            progress
        };
    }

    fn apply(&self, cell: &mut Cell) -> bool {
        let before = *cell.actual();

        if self.fade_foreground {
            let color = self.sample(&self.foreground, self.use_cell_foreground, cell.foreground());
            cell.actual_mut().foreground = color;
        }
        if self.fade_background {
            let color = self.sample(&self.background, self.use_cell_background, cell.background());
            cell.actual_mut().background = color;
        }

        *cell.actual() != before
    }

    fn clear(&self, cell: &mut Cell) {
        cell.reset_actual();
        if !self.timing.permanent {
            return;
        }
        if self.fade_foreground {
            let color = self.end_color(&self.foreground, self.use_cell_foreground, cell.foreground());
            cell.set_foreground(color);
        }
        if self.fade_background {
            let color = self.end_color(&self.background, self.use_cell_background, cell.background());
            cell.set_background(color);
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
        self.value = 0.0;
        self.going_down = false;
    }

    fn save(&self) -> Result<SerializedEffect> {
        SerializedEffect::encode(self)
    }
}
