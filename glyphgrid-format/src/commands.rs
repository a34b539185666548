//! Formatting commands
//!
//! A command is built once from its bracket text and then asked to style
//! each following glyph until it expires or is undone.

use std::fmt;

use glyphgrid_core::effect::Blink;
use glyphgrid_core::{CellSurface, Color, ColorGradient, ColoredGlyph, EffectHandle, Mirror};

use crate::color_spec::ColorSpec;
use crate::error::{CommandError, Result};
use crate::stacks::{ParseCommandStacks, UndoTarget};

/// Blink speed used when `[c:b]` gives none
pub const DEFAULT_BLINK_SPEED: f64 = 0.35;

/// Which part of a glyph a command styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Foreground,
    Background,
    Glyph,
    Mirror,
    Effect,
    /// Acts when parsed and styles nothing
    Pure,
}

impl CommandKind {
    /// Order in which stacks are applied to each glyph
    pub const BUILD_ORDER: [CommandKind; 5] = [
        CommandKind::Foreground,
        CommandKind::Background,
        CommandKind::Glyph,
        CommandKind::Mirror,
        CommandKind::Effect,
    ];
}

/// Returned by [`ParseCommand::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Active,
    /// The command has styled its last glyph and leaves its stacks
    Expired,
}

/// What a command can see while it is built or applied
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// Glyphs produced so far
    pub glyphs: &'a [ColoredGlyph],
    /// Surface the text will be printed on
    pub surface: Option<&'a CellSurface>,
    /// Surface cell under the current glyph
    pub surface_index: Option<usize>,
}

impl<'a> CommandContext<'a> {
    pub fn new(glyphs: &'a [ColoredGlyph]) -> Self {
        Self {
            glyphs,
            surface: None,
            surface_index: None,
        }
    }

    pub fn default_foreground(&self) -> Color {
        self.surface
            .map_or(Color::WHITE, CellSurface::default_foreground)
    }

    pub fn default_background(&self) -> Color {
        self.surface
            .map_or(Color::TRANSPARENT, CellSurface::default_background)
    }

    fn default_for(&self, target: ColorTarget) -> Color {
        match target {
            ColorTarget::Foreground => self.default_foreground(),
            ColorTarget::Background => self.default_background(),
        }
    }
}

/// A formatting command living on the command stacks
pub trait ParseCommand: fmt::Debug {
    fn kind(&self) -> CommandKind;

    /// Style one glyph
    fn build(&mut self, glyph: &mut ColoredGlyph, context: &CommandContext<'_>) -> CommandStatus;
}

/// How many glyphs a command still styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counter {
    remaining: Option<u32>,
}

impl Counter {
    pub const UNLIMITED: Counter = Counter { remaining: None };

    pub fn new(glyphs: u32) -> Self {
        Self {
            remaining: Some(glyphs),
        }
    }

    /// Empty text means unlimited
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::UNLIMITED);
        }
        match text.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self::new(n)),
            _ => Err(CommandError::InvalidCounter(text.to_string())),
        }
    }

    fn parse_opt(text: Option<&str>) -> Result<Self> {
        text.map_or(Ok(Self::UNLIMITED), Self::parse)
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// Count one styled glyph
    pub fn tick(&mut self) -> CommandStatus {
        match self.remaining.as_mut() {
            Some(n) => {
                *n = n.saturating_sub(1);
                if *n == 0 {
                    CommandStatus::Expired
                } else {
                    CommandStatus::Active
                }
            }
            None => CommandStatus::Active,
        }
    }
}

/// Color channel addressed by `f` or `b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Foreground,
    Background,
}

impl ColorTarget {
    fn parse(text: &str) -> Result<Self> {
        match text.trim() {
            "f" | "F" => Ok(ColorTarget::Foreground),
            "b" | "B" => Ok(ColorTarget::Background),
            other => Err(CommandError::UnknownSelector(other.to_string())),
        }
    }

    fn kind(self) -> CommandKind {
        match self {
            ColorTarget::Foreground => CommandKind::Foreground,
            ColorTarget::Background => CommandKind::Background,
        }
    }

    fn get(self, glyph: &ColoredGlyph) -> Color {
        match self {
            ColorTarget::Foreground => glyph.foreground,
            ColorTarget::Background => glyph.background,
        }
    }

    fn set(self, glyph: &mut ColoredGlyph, color: Color) {
        match self {
            ColorTarget::Foreground => glyph.foreground = color,
            ColorTarget::Background => glyph.background = color,
        }
    }
}

// ============================================================================
// Built-in commands
// ============================================================================

/// `[c:r f|b:color[:N]]`
#[derive(Debug, Clone, PartialEq)]
pub struct Recolor {
    pub target: ColorTarget,
    pub color: ColorSpec,
    pub counter: Counter,
}

impl Recolor {
    pub fn parse(params: &str) -> Result<Self> {
        let parts: Vec<&str> = params.split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(CommandError::MissingParameters {
                command: "recolor",
                params: params.to_string(),
            });
        }
        Ok(Self {
            target: ColorTarget::parse(parts[0])?,
            color: ColorSpec::parse(parts[1])?,
            counter: Counter::parse_opt(parts.get(2).copied())?,
        })
    }
}

impl ParseCommand for Recolor {
    fn kind(&self) -> CommandKind {
        self.target.kind()
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, context: &CommandContext<'_>) -> CommandStatus {
        let current = self.target.get(glyph);
        let color = self
            .color
            .resolve(current, context.default_for(self.target));
        self.target.set(glyph, color);
        self.counter.tick()
    }
}

/// `[c:m n|h|v|b[:N]]`
#[derive(Debug, Clone, PartialEq)]
pub struct SetMirror {
    pub mirror: Mirror,
    pub counter: Counter,
}

impl SetMirror {
    pub fn parse(params: &str) -> Result<Self> {
        let mut parts = params.split(':');
        let value = parts.next().unwrap_or_default().trim();
        let mirror = match value.to_ascii_lowercase().as_str() {
            "n" | "none" => Mirror::None,
            "h" | "horizontal" | "fliphorizontal" | "fliphorizontally" => Mirror::FlipHorizontal,
            "v" | "vertical" | "flipvertical" | "flipvertically" => Mirror::FlipVertical,
            "b" | "both" => Mirror::Both,
            _ => return Err(CommandError::InvalidMirror(value.to_string())),
        };
        Ok(Self {
            mirror,
            counter: Counter::parse_opt(parts.next())?,
        })
    }
}

impl ParseCommand for SetMirror {
    fn kind(&self) -> CommandKind {
        CommandKind::Mirror
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &CommandContext<'_>) -> CommandStatus {
        glyph.mirror = self.mirror;
        self.counter.tick()
    }
}

/// `[c:u [N][:f|b|g|e|m|a]]`, runs when parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Undo {
    pub count: usize,
    pub target: UndoTarget,
}

impl Undo {
    pub fn parse(params: &str) -> Result<Self> {
        let mut parts = params.splitn(3, ':');
        let count = match parts.next().map(str::trim) {
            None | Some("") => 1,
            Some(text) => text.parse::<usize>().map_err(|_| CommandError::InvalidValue {
                command: "undo",
                value: text.to_string(),
            })?,
        };
        let target = match parts.next() {
            Some(text) => UndoTarget::parse(text)?,
            None => UndoTarget::All,
        };
        Ok(Self { count, target })
    }

    /// Pop commands off `stacks`
    pub fn run(&self, stacks: &mut ParseCommandStacks) -> usize {
        stacks.undo(self.count, self.target)
    }
}

impl ParseCommand for Undo {
    fn kind(&self) -> CommandKind {
        CommandKind::Pure
    }

    fn build(&mut self, _glyph: &mut ColoredGlyph, _context: &CommandContext<'_>) -> CommandStatus {
        CommandStatus::Expired
    }
}

/// `[c:g f|b:color:color[:color..]:N]`, spreads a gradient over N glyphs
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub target: ColorTarget,
    gradient: ColorGradient,
    length: u32,
    counter: Counter,
}

impl Gradient {
    pub fn parse(params: &str, context: &CommandContext<'_>) -> Result<Self> {
        let parts: Vec<&str> = params.split(':').collect();
        let (target, length, stops) = match parts.as_slice() {
            [target, stops @ .., length] if stops.len() >= 2 => (target, length.trim(), stops),
            _ => {
                return Err(CommandError::MissingParameters {
                    command: "grad",
                    params: params.to_string(),
                })
            }
        };
        let target = ColorTarget::parse(target)?;
        let length = match length.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(CommandError::InvalidCounter(length.to_string())),
        };

        let default = context.default_for(target);
        let stops = stops
            .iter()
            .map(|stop| ColorSpec::parse(stop).map(|spec| spec.to_color(default)))
            .collect::<Result<Vec<Color>>>()?;
        let gradient = ColorGradient::new(&stops).map_err(|e| CommandError::InvalidValue {
            command: "grad",
            value: e.to_string(),
        })?;

        Ok(Self {
            target,
            gradient,
            length,
            counter: Counter::new(length),
        })
    }

    /// Color of glyph `step` out of the gradient's length
    fn color_at(&self, step: u32) -> Color {
        let last = self.length.saturating_sub(1).max(1);
        self.gradient.lerp(step as f32 / last as f32)
    }
}

impl ParseCommand for Gradient {
    fn kind(&self) -> CommandKind {
        self.target.kind()
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &CommandContext<'_>) -> CommandStatus {
        let remaining = self.counter.remaining().unwrap_or(0);
        if remaining > 0 {
            let step = self.length - remaining;
            self.target.set(glyph, self.color_at(step));
        }
        self.counter.tick()
    }
}

/// `[c:b [N][:speed]]`, one blink effect shared by every styled glyph
#[derive(Debug, Clone, PartialEq)]
pub struct BlinkGlyphs {
    effect: EffectHandle,
    counter: Counter,
}

impl BlinkGlyphs {
    pub fn parse(params: &str) -> Result<Self> {
        let mut parts = params.split(':');
        let counter = Counter::parse_opt(parts.next())?;
        let speed = match parts.next().map(str::trim) {
            None | Some("") => DEFAULT_BLINK_SPEED,
            Some(text) => match text.parse::<f64>() {
                Ok(speed) if speed.is_finite() && speed > 0.0 => speed,
                _ => {
                    return Err(CommandError::InvalidValue {
                        command: "blink",
                        value: text.to_string(),
                    })
                }
            },
        };
        Ok(Self {
            effect: EffectHandle::new(Blink::new().with_speed(speed)),
            counter,
        })
    }

    pub fn effect(&self) -> &EffectHandle {
        &self.effect
    }
}

impl ParseCommand for BlinkGlyphs {
    fn kind(&self) -> CommandKind {
        CommandKind::Effect
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &CommandContext<'_>) -> CommandStatus {
        glyph.effect = Some(self.effect.clone());
        self.counter.tick()
    }
}

/// `[c:sg glyph[:N]]`; a single character is taken literally, anything
/// longer as a glyph number
#[derive(Debug, Clone, PartialEq)]
pub struct SetGlyph {
    pub glyph: u32,
    pub counter: Counter,
}

impl SetGlyph {
    pub fn parse(params: &str) -> Result<Self> {
        // Split at the last colon so `[c:sg ::2]` can set a colon
        let (value, counter) = match params.rsplit_once(':') {
            Some((value, counter)) if !value.is_empty() => (value, Some(counter)),
            _ => (params, None),
        };
        let mut chars = value.chars();
        let glyph = match (chars.next(), chars.next()) {
            (Some(ch), None) => ch as u32,
            _ => value
                .trim()
                .parse::<u32>()
                .map_err(|_| CommandError::InvalidValue {
                    command: "sglyph",
                    value: value.to_string(),
                })?,
        };
        Ok(Self {
            glyph,
            counter: Counter::parse_opt(counter)?,
        })
    }
}

impl ParseCommand for SetGlyph {
    fn kind(&self) -> CommandKind {
        CommandKind::Glyph
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &CommandContext<'_>) -> CommandStatus {
        glyph.glyph = self.glyph;
        self.counter.tick()
    }
}

/// `[c:ce [N]]`, strips effects from the following glyphs
#[derive(Debug, Clone, PartialEq)]
pub struct ClearEffect {
    pub counter: Counter,
}

impl ClearEffect {
    pub fn parse(params: &str) -> Result<Self> {
        Ok(Self {
            counter: Counter::parse(params)?,
        })
    }
}

impl ParseCommand for ClearEffect {
    fn kind(&self) -> CommandKind {
        CommandKind::Effect
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &CommandContext<'_>) -> CommandStatus {
        glyph.effect = None;
        self.counter.tick()
    }
}

/// Build a built-in command by name. None when the name is not built in.
///
/// Undo runs against `stacks` right away; blink and clear-effect switch
/// effect output on.
pub fn builtin(
    name: &str,
    params: &str,
    context: &CommandContext<'_>,
    stacks: &mut ParseCommandStacks,
) -> Option<Result<Box<dyn ParseCommand>>> {
    let command: Result<Box<dyn ParseCommand>> = match name {
        "recolor" | "r" => Recolor::parse(params).map(|c| Box::new(c) as Box<dyn ParseCommand>),
        "mirror" | "m" => SetMirror::parse(params).map(|c| Box::new(c) as Box<dyn ParseCommand>),
        "undo" | "u" => Undo::parse(params).map(|undo| {
            undo.run(stacks);
            Box::new(undo) as Box<dyn ParseCommand>
        }),
        "grad" | "g" => {
            Gradient::parse(params, context).map(|c| Box::new(c) as Box<dyn ParseCommand>)
        }
        "blink" | "b" => BlinkGlyphs::parse(params).map(|c| {
            stacks.turn_on_effects = true;
            Box::new(c) as Box<dyn ParseCommand>
        }),
        "sglyph" | "sg" => SetGlyph::parse(params).map(|c| Box::new(c) as Box<dyn ParseCommand>),
        "ceffect" | "ce" => ClearEffect::parse(params).map(|c| {
            stacks.turn_on_effects = true;
            Box::new(c) as Box<dyn ParseCommand>
        }),
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph() -> ColoredGlyph {
        ColoredGlyph::new('a' as u32, Color::WHITE, Color::BLACK)
    }

    #[test]
    fn test_counter() {
        let mut counter = Counter::parse("2").unwrap();
        assert_eq!(counter.tick(), CommandStatus::Active);
        assert_eq!(counter.tick(), CommandStatus::Expired);

        let mut unlimited = Counter::parse("").unwrap();
        for _ in 0..100 {
            assert_eq!(unlimited.tick(), CommandStatus::Active);
        }

        assert!(Counter::parse("0").is_err());
        assert!(Counter::parse("-1").is_err());
        assert!(Counter::parse("x").is_err());
    }

    #[test]
    fn test_recolor_parse() {
        let recolor = Recolor::parse("b:red:3").unwrap();
        assert_eq!(recolor.target, ColorTarget::Background);
        assert_eq!(recolor.color, ColorSpec::Fixed(Color::RED));
        assert_eq!(recolor.counter.remaining(), Some(3));

        assert!(matches!(
            Recolor::parse("q:red"),
            Err(CommandError::UnknownSelector(_))
        ));
        assert!(matches!(
            Recolor::parse("f"),
            Err(CommandError::MissingParameters { .. })
        ));
    }

    #[test]
    fn test_recolor_default_uses_context() {
        let mut recolor = Recolor::parse("f:default").unwrap();
        let mut g = glyph();
        recolor.build(&mut g, &CommandContext::new(&[]));
        assert_eq!(g.foreground, Color::WHITE);

        let surface = CellSurface::with_defaults(1, 1, Color::GRAY, Color::BLUE).unwrap();
        let context = CommandContext {
            surface: Some(&surface),
            ..CommandContext::new(&[])
        };
        let mut recolor = Recolor::parse("b:default").unwrap();
        recolor.build(&mut g, &context);
        assert_eq!(g.background, Color::BLUE);
    }

    #[test]
    fn test_mirror_parse() {
        assert_eq!(SetMirror::parse("h").unwrap().mirror, Mirror::FlipHorizontal);
        assert_eq!(
            SetMirror::parse("FlipVertically:2").unwrap().mirror,
            Mirror::FlipVertical
        );
        assert!(matches!(
            SetMirror::parse("sideways"),
            Err(CommandError::InvalidMirror(_))
        ));
    }

    #[test]
    fn test_undo_parse() {
        assert_eq!(
            Undo::parse("").unwrap(),
            Undo {
                count: 1,
                target: UndoTarget::All
            }
        );
        assert_eq!(
            Undo::parse("2:f").unwrap(),
            Undo {
                count: 2,
                target: UndoTarget::Only(CommandKind::Foreground)
            }
        );
        assert!(matches!(
            Undo::parse("1:z"),
            Err(CommandError::InvalidUndoTarget(_))
        ));
    }

    #[test]
    fn test_gradient_steps() {
        let mut gradient = Gradient::parse("f:black:white:3", &CommandContext::new(&[])).unwrap();
        let mut colors = Vec::new();
        let mut status = CommandStatus::Active;
        for _ in 0..3 {
            let mut g = glyph();
            status = gradient.build(&mut g, &CommandContext::new(&[]));
            colors.push(g.foreground);
        }
        assert_eq!(colors[0], Color::BLACK);
        assert_eq!(colors[2], Color::WHITE);
        assert_eq!(status, CommandStatus::Expired);
    }

    #[test]
    fn test_gradient_requires_length() {
        assert!(Gradient::parse("f:red:blue", &CommandContext::new(&[])).is_err());
        assert!(Gradient::parse("f:red:blue:0", &CommandContext::new(&[])).is_err());
    }

    #[test]
    fn test_gradient_huge_length_is_lazy() {
        let context = CommandContext::new(&[]);
        let mut gradient = Gradient::parse("f:red:blue:4000000000", &context).unwrap();
        assert_eq!(gradient.counter.remaining(), Some(4_000_000_000));

        let mut first = glyph();
        assert_eq!(gradient.build(&mut first, &context), CommandStatus::Active);
        assert_eq!(first.foreground, Color::RED);

        let mut second = glyph();
        gradient.build(&mut second, &context);
        assert_eq!(second.foreground, Color::RED);
        assert_eq!(gradient.color_at(3_999_999_999), Color::BLUE);
    }

    #[test]
    fn test_gradient_single_glyph() {
        let context = CommandContext::new(&[]);
        let mut gradient = Gradient::parse("b:red:blue:1", &context).unwrap();
        let mut g = glyph();
        assert_eq!(gradient.build(&mut g, &context), CommandStatus::Expired);
        assert_eq!(g.background, Color::RED);
    }

    #[test]
    fn test_blink_shares_one_effect() {
        let mut blink = BlinkGlyphs::parse("2").unwrap();
        let (mut a, mut b) = (glyph(), glyph());
        blink.build(&mut a, &CommandContext::new(&[]));
        let status = blink.build(&mut b, &CommandContext::new(&[]));
        assert_eq!(status, CommandStatus::Expired);
        assert_eq!(a.effect, b.effect);
        assert!(a.effect.is_some_and(|e| e.kind() == "blink"));
    }

    #[test]
    fn test_set_glyph() {
        assert_eq!(SetGlyph::parse("@").unwrap().glyph, '@' as u32);
        assert_eq!(SetGlyph::parse("176:4").unwrap().glyph, 176);
        assert_eq!(SetGlyph::parse("::2").unwrap().glyph, ':' as u32);
        assert!(SetGlyph::parse("abc").is_err());
    }

    #[test]
    fn test_builtin_unknown_name() {
        let mut stacks = ParseCommandStacks::new();
        assert!(builtin("nope", "", &CommandContext::new(&[]), &mut stacks).is_none());
    }

    #[test]
    fn test_builtin_blink_turns_on_effects() {
        let mut stacks = ParseCommandStacks::new();
        let command = builtin("b", "3", &CommandContext::new(&[]), &mut stacks);
        assert!(matches!(command, Some(Ok(_))));
        assert!(stacks.turn_on_effects);
    }

    #[test]
    fn test_blink_rejects_bad_speed() {
        assert!(BlinkGlyphs::parse("2:0").is_err());
        assert!(BlinkGlyphs::parse("2:-1").is_err());
        assert!(BlinkGlyphs::parse("2:inf").is_err());
        assert!(BlinkGlyphs::parse("2:NaN").is_err());
    }
}
