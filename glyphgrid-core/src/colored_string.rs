//! Colored strings
//!
//! A colored string is a run of glyphs that each carry their own colors,
//! mirror and optional effect. The format parser produces them and
//! `CellSurface::print_colored` consumes them.

use std::ops::{Add, Index, IndexMut};

use crate::cell::{Appearance, Cell, Mirror};
use crate::color::Color;
use crate::effect::EffectHandle;
use crate::error::{Error, Result};
use crate::gradient::ColorGradient;

/// One styled glyph
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredGlyph {
    pub glyph: u32,
    pub foreground: Color,
    pub background: Color,
    pub mirror: Mirror,
    pub effect: Option<EffectHandle>,
}

impl ColoredGlyph {
    pub fn new(glyph: u32, foreground: Color, background: Color) -> Self {
        Self {
            glyph,
            foreground,
            background,
            mirror: Mirror::None,
            effect: None,
        }
    }

    /// Styled glyph carrying a cell's desired appearance
    pub fn from_cell(cell: &Cell) -> Self {
        Self::from_appearance(cell.desired())
    }

    pub fn from_appearance(appearance: &Appearance) -> Self {
        Self {
            glyph: appearance.glyph,
            foreground: appearance.foreground,
            background: appearance.background,
            mirror: appearance.mirror,
            effect: None,
        }
    }

    pub fn glyph_char(&self) -> char {
        char::from_u32(self.glyph).unwrap_or('\0')
    }

    pub fn set_glyph_char(&mut self, ch: char) {
        self.glyph = ch as u32;
    }

    /// The glyph's appearance (always visible)
    pub fn appearance(&self) -> Appearance {
        Appearance::new(self.foreground, self.background)
            .with_glyph(self.glyph)
            .with_mirror(self.mirror)
    }
}

impl Default for ColoredGlyph {
    fn default() -> Self {
        Self::new(0, Color::WHITE, Color::TRANSPARENT)
    }
}

/// A sequence of styled glyphs.
///
/// The `ignore_*` flags tell consumers which parts of each glyph to leave
/// untouched when printing onto a surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColoredString {
    glyphs: Vec<ColoredGlyph>,
    pub ignore_glyph: bool,
    pub ignore_foreground: bool,
    pub ignore_background: bool,
    pub ignore_effect: bool,
    pub ignore_mirror: bool,
}

impl ColoredString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_glyphs(glyphs: Vec<ColoredGlyph>) -> Self {
        Self {
            glyphs,
            ..Self::default()
        }
    }

    /// Text with default (white on transparent) glyphs
    pub fn from_text(text: &str) -> Self {
        let mut string = Self::new();
        string.set_string(text);
        string
    }

    /// Text where only the glyphs matter; every other channel is ignored
    pub fn plain(text: &str) -> Self {
        Self {
            ignore_foreground: true,
            ignore_background: true,
            ignore_effect: true,
            ignore_mirror: true,
            ..Self::from_text(text)
        }
    }

    /// Text with one pair of colors
    pub fn with_colors(text: &str, foreground: Color, background: Color) -> Self {
        let glyphs = text
            .chars()
            .map(|ch| ColoredGlyph::new(ch as u32, foreground, background))
            .collect();
        Self::from_glyphs(glyphs)
    }

    /// Text whose foreground runs along `gradient`
    pub fn from_gradient(gradient: &ColorGradient, text: &str) -> Self {
        let count = text.chars().count();
        let glyphs = text
            .chars()
            .zip(gradient.to_color_array(count))
            .map(|(ch, color)| ColoredGlyph::new(ch as u32, color, Color::TRANSPARENT))
            .collect();
        Self::from_glyphs(glyphs)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[ColoredGlyph] {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut [ColoredGlyph] {
        &mut self.glyphs
    }

    pub fn get(&self, index: usize) -> Option<&ColoredGlyph> {
        self.glyphs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColoredGlyph> {
        self.glyphs.iter()
    }

    pub fn push(&mut self, glyph: ColoredGlyph) {
        self.glyphs.push(glyph);
    }

    /// The glyphs as text
    pub fn string(&self) -> String {
        self.glyphs.iter().map(ColoredGlyph::glyph_char).collect()
    }

    /// Replace the text, keeping each position's styling. Extra characters
    /// copy the styling of the current last glyph.
    pub fn set_string(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let template = self.glyphs.last().cloned().unwrap_or_default();
        self.glyphs.resize(chars.len(), template);
        for (glyph, ch) in self.glyphs.iter_mut().zip(chars) {
            glyph.set_glyph_char(ch);
        }
    }

    /// `count` glyphs starting at `index`, with the same ignore flags
    pub fn substring(&self, index: usize, count: usize) -> Result<ColoredString> {
        let end = index
            .checked_add(count)
            .filter(|&end| end <= self.glyphs.len())
            .ok_or(Error::IndexOutOfRange {
                index: index.saturating_add(count),
                len: self.glyphs.len(),
            })?;
        Ok(self.with_glyphs(self.glyphs[index..end].to_vec()))
    }

    /// Everything from `index` to the end
    pub fn substring_from(&self, index: usize) -> Result<ColoredString> {
        self.substring(index, self.glyphs.len().saturating_sub(index))
    }

    fn with_glyphs(&self, glyphs: Vec<ColoredGlyph>) -> ColoredString {
        ColoredString {
            glyphs,
            ..self.flags_only()
        }
    }

    fn flags_only(&self) -> ColoredString {
        ColoredString {
            glyphs: Vec::new(),
            ignore_glyph: self.ignore_glyph,
            ignore_foreground: self.ignore_foreground,
            ignore_background: self.ignore_background,
            ignore_effect: self.ignore_effect,
            ignore_mirror: self.ignore_mirror,
        }
    }

    pub fn set_foreground(&mut self, color: Color) {
        self.glyphs.iter_mut().for_each(|g| g.foreground = color);
    }

    pub fn set_background(&mut self, color: Color) {
        self.glyphs.iter_mut().for_each(|g| g.background = color);
    }

    pub fn set_glyph(&mut self, glyph: u32) {
        self.glyphs.iter_mut().for_each(|g| g.glyph = glyph);
    }

    pub fn set_mirror(&mut self, mirror: Mirror) {
        self.glyphs.iter_mut().for_each(|g| g.mirror = mirror);
    }

    pub fn set_effect(&mut self, effect: Option<&EffectHandle>) {
        self.glyphs
            .iter_mut()
            .for_each(|g| g.effect = effect.cloned());
    }

    /// Re-map the blank defaults (white on transparent) onto a surface's
    /// default colors
    pub fn normalize_defaults(&mut self, foreground: Color, background: Color) {
        let blank = ColoredGlyph::default();
        for glyph in &mut self.glyphs {
            if glyph.foreground == blank.foreground {
                glyph.foreground = foreground;
            }
            if glyph.background == blank.background {
                glyph.background = background;
            }
        }
    }
}

impl Index<usize> for ColoredString {
    type Output = ColoredGlyph;

    fn index(&self, index: usize) -> &ColoredGlyph {
        &self.glyphs[index]
    }
}

impl IndexMut<usize> for ColoredString {
    fn index_mut(&mut self, index: usize) -> &mut ColoredGlyph {
        &mut self.glyphs[index]
    }
}

impl<'a> IntoIterator for &'a ColoredString {
    type Item = &'a ColoredGlyph;
    type IntoIter = std::slice::Iter<'a, ColoredGlyph>;

    fn into_iter(self) -> Self::IntoIter {
        self.glyphs.iter()
    }
}

impl FromIterator<ColoredGlyph> for ColoredString {
    fn from_iter<I: IntoIterator<Item = ColoredGlyph>>(iter: I) -> Self {
        Self::from_glyphs(iter.into_iter().collect())
    }
}

/// Concatenation; a channel stays ignored only if both sides ignore it
impl Add<&ColoredString> for &ColoredString {
    type Output = ColoredString;

    fn add(self, other: &ColoredString) -> ColoredString {
        let mut glyphs = Vec::with_capacity(self.len() + other.len());
        glyphs.extend_from_slice(&self.glyphs);
        glyphs.extend_from_slice(&other.glyphs);
        ColoredString {
            glyphs,
            ignore_glyph: self.ignore_glyph && other.ignore_glyph,
            ignore_foreground: self.ignore_foreground && other.ignore_foreground,
            ignore_background: self.ignore_background && other.ignore_background,
            ignore_effect: self.ignore_effect && other.ignore_effect,
            ignore_mirror: self.ignore_mirror && other.ignore_mirror,
        }
    }
}

impl Add for ColoredString {
    type Output = ColoredString;

    fn add(self, other: ColoredString) -> ColoredString {
        &self + &other
    }
}

/// Append text styled like the last glyph
impl Add<&str> for &ColoredString {
    type Output = ColoredString;

    fn add(self, text: &str) -> ColoredString {
        let template = self.glyphs.last().cloned().unwrap_or_default();
        let mut result = self.clone();
        result.glyphs.extend(text.chars().map(|ch| ColoredGlyph {
            glyph: ch as u32,
            ..template.clone()
        }));
        result
    }
}

impl Add<&str> for ColoredString {
    type Output = ColoredString;

    fn add(self, text: &str) -> ColoredString {
        &self + text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Delay;

    #[test]
    fn test_string_round_trip() {
        let mut text = ColoredString::new();
        text.set_string("héllo [world]");
        assert_eq!(text.string(), "héllo [world]");
        assert_eq!(text.len(), 13);
    }

    #[test]
    fn test_set_string_grows_with_last_style() {
        let mut text = ColoredString::with_colors("ab", Color::RED, Color::BLUE);
        text[1].foreground = Color::LIME;
        text.set_string("abcd");
        assert_eq!(text[3].foreground, Color::LIME);
        assert_eq!(text[3].background, Color::BLUE);
        assert_eq!(text[0].foreground, Color::RED);

        text.set_string("a");
        assert_eq!(text.len(), 1);
        text.set_string("");
        assert!(text.is_empty());
    }

    #[test]
    fn test_substring() {
        let mut text = ColoredString::from_text("abcdef");
        text.ignore_background = true;
        let sub = text.substring(2, 3).unwrap();
        assert_eq!(sub.string(), "cde");
        assert!(sub.ignore_background);
        assert_eq!(text.substring_from(4).unwrap().string(), "ef");
        assert!(text.substring(4, 3).is_err());
        assert!(text.substring(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_add_ands_ignore_flags() {
        let mut left = ColoredString::plain("ab");
        let right = ColoredString::from_text("cd");
        left.ignore_glyph = true;
        let joined = &left + &right;
        assert_eq!(joined.string(), "abcd");
        assert!(!joined.ignore_foreground);
        assert!(!joined.ignore_glyph);

        let both = ColoredString::plain("x") + ColoredString::plain("y");
        assert!(both.ignore_foreground);
        assert!(both.ignore_effect);
    }

    #[test]
    fn test_add_str_uses_last_glyph_style() {
        let text = ColoredString::with_colors("a", Color::RED, Color::BLACK) + "bc";
        assert_eq!(text.string(), "abc");
        assert_eq!(text[2].foreground, Color::RED);
        assert_eq!(text[2].background, Color::BLACK);

        let from_empty = &ColoredString::new() + "z";
        assert_eq!(from_empty[0].foreground, Color::WHITE);
    }

    #[test]
    fn test_from_gradient() {
        let gradient = ColorGradient::between(Color::BLACK, Color::WHITE);
        let text = ColoredString::from_gradient(&gradient, "abc");
        assert_eq!(text[0].foreground, Color::BLACK);
        assert_eq!(text[1].foreground, Color::rgb(128, 128, 128));
        assert_eq!(text[2].foreground, Color::WHITE);
    }

    #[test]
    fn test_bulk_setters() {
        let mut text = ColoredString::from_text("abc");
        let effect = EffectHandle::new(Delay::new(1.0));
        text.set_foreground(Color::ORANGE);
        text.set_mirror(Mirror::FlipVertical);
        text.set_effect(Some(&effect));
        assert!(text.iter().all(|g| g.foreground == Color::ORANGE));
        assert!(text.iter().all(|g| g.mirror == Mirror::FlipVertical));
        assert!(text
            .iter()
            .all(|g| g.effect.as_ref().is_some_and(|e| e.ptr_eq(&effect))));
    }

    #[test]
    fn test_normalize_defaults() {
        let mut text = ColoredString::from_text("ab");
        text[1].foreground = Color::RED;
        text.normalize_defaults(Color::GRAY, Color::BLACK);
        assert_eq!(text[0].foreground, Color::GRAY);
        assert_eq!(text[0].background, Color::BLACK);
        assert_eq!(text[1].foreground, Color::RED);
    }
}
