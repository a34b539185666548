//! Glyph cell representation
//!
//! Each cell in a surface carries two appearances:
//! - the desired appearance, which is what the caller asked for
//! - the actual appearance, which is what renderers draw
//!
//! Setters write both. Effects only ever write the actual appearance, and
//! detaching an effect copies desired back over actual.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::effect::EffectId;

/// Horizontal/vertical flip applied when the glyph is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mirror {
    #[default]
    None,
    FlipHorizontal,
    FlipVertical,
    Both,
}

/// Everything that decides how a cell looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub foreground: Color,
    pub background: Color,
    /// Glyph index into the font atlas; plain text uses the char value
    pub glyph: u32,
    pub mirror: Mirror,
    pub visible: bool,
}

impl Appearance {
    /// Appearance with the given colors and glyph 0
    pub fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
            glyph: 0,
            mirror: Mirror::None,
            visible: true,
        }
    }

    /// Builder-style glyph setter
    pub fn with_glyph(mut self, glyph: u32) -> Self {
        self.glyph = glyph;
        self
    }

    /// Builder-style mirror setter
    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = mirror;
        self
    }

    /// Glyph as a character, `'\0'` substitutes for non-char glyph indices
    pub fn glyph_char(&self) -> char {
        char::from_u32(self.glyph).unwrap_or('\0')
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self::new(Color::WHITE, Color::TRANSPARENT)
    }
}

/// A single cell in a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    desired: Appearance,
    actual: Appearance,
    /// Effect this cell is bound to; maintained by the surface's binding table
    effect: Option<EffectId>,
}

impl Cell {
    /// Create a blank cell (white on transparent, glyph 0)
    pub fn new() -> Self {
        Self::with_appearance(Appearance::default())
    }

    /// Create a cell with the given appearance
    pub fn with_appearance(appearance: Appearance) -> Self {
        Self {
            desired: appearance,
            actual: appearance,
            effect: None,
        }
    }

    /// Appearance requested by the caller
    pub fn desired(&self) -> &Appearance {
        &self.desired
    }

    /// Appearance renderers should draw
    pub fn actual(&self) -> &Appearance {
        &self.actual
    }

    /// Mutable actual appearance, for effects
    pub fn actual_mut(&mut self) -> &mut Appearance {
        &mut self.actual
    }

    /// Copy desired over actual, dropping anything an effect wrote
    pub fn reset_actual(&mut self) {
        self.actual = self.desired;
    }

    pub fn foreground(&self) -> Color {
        self.desired.foreground
    }

    pub fn set_foreground(&mut self, color: Color) {
        self.desired.foreground = color;
        self.actual.foreground = color;
    }

    pub fn background(&self) -> Color {
        self.desired.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.desired.background = color;
        self.actual.background = color;
    }

    pub fn glyph(&self) -> u32 {
        self.desired.glyph
    }

    pub fn set_glyph(&mut self, glyph: u32) {
        self.desired.glyph = glyph;
        self.actual.glyph = glyph;
    }

    pub fn mirror(&self) -> Mirror {
        self.desired.mirror
    }

    pub fn set_mirror(&mut self, mirror: Mirror) {
        self.desired.mirror = mirror;
        self.actual.mirror = mirror;
    }

    pub fn is_visible(&self) -> bool {
        self.desired.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.desired.visible = visible;
        self.actual.visible = visible;
    }

    /// Replace the whole desired appearance (and actual with it)
    pub fn set_appearance(&mut self, appearance: &Appearance) {
        self.desired = *appearance;
        self.actual = *appearance;
    }

    /// Copy foreground, background, glyph and mirror to another cell
    pub fn copy_appearance_to(&self, other: &mut Cell) {
        other.set_foreground(self.desired.foreground);
        other.set_background(self.desired.background);
        other.set_glyph(self.desired.glyph);
        other.set_mirror(self.desired.mirror);
    }

    /// Reset to blank with the given colors. Does not touch the effect binding.
    pub fn reset(&mut self, foreground: Color, background: Color) {
        self.set_appearance(&Appearance::new(foreground, background));
    }

    /// Effect currently bound to this cell
    pub fn effect(&self) -> Option<EffectId> {
        self.effect
    }

    pub(crate) fn set_effect_id(&mut self, effect: Option<EffectId>) {
        self.effect = effect;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}
