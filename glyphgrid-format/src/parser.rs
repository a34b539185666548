//! Colored-string parser
//!
//! Scans text one character at a time. `[c:name params]` brackets push
//! commands onto the command stacks and produce no glyphs; every other
//! character becomes one glyph styled by the top command of each stack, in
//! the order foreground, background, glyph, mirror, effect.
//!
//! A backtick right before `[` prints the bracket literally. A bracket that
//! does not form a valid command is printed as text.

use std::fmt;

use glyphgrid_core::{CellSurface, ColoredGlyph, ColoredString};

use crate::commands::{self, CommandContext, CommandKind, ParseCommand};
use crate::error::Result;
use crate::stacks::ParseCommandStacks;

/// Hook for commands beyond the built-in ones.
///
/// Consulted before the built-ins, so it can also override them. Return
/// None to fall through.
pub trait CommandResolver {
    fn resolve(
        &self,
        name: &str,
        params: &str,
        context: &CommandContext<'_>,
        stacks: &mut ParseCommandStacks,
    ) -> Option<Result<Box<dyn ParseCommand>>>;
}

impl<F> CommandResolver for F
where
    F: Fn(
        &str,
        &str,
        &CommandContext<'_>,
        &mut ParseCommandStacks,
    ) -> Option<Result<Box<dyn ParseCommand>>>,
{
    fn resolve(
        &self,
        name: &str,
        params: &str,
        context: &CommandContext<'_>,
        stacks: &mut ParseCommandStacks,
    ) -> Option<Result<Box<dyn ParseCommand>>> {
        self(name, params, context, stacks)
    }
}

/// Parses formatted text into colored strings
#[derive(Default)]
pub struct Parser {
    resolver: Option<Box<dyn CommandResolver>>,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that asks `resolver` first for every command name
    pub fn with_resolver(resolver: impl CommandResolver + 'static) -> Self {
        Self {
            resolver: Some(Box::new(resolver)),
        }
    }

    /// Parse without a target surface
    pub fn parse(&self, text: &str) -> ColoredString {
        self.parse_with(text, None, &mut ParseCommandStacks::new())
    }

    /// Parse text that will be printed on `surface` starting at flat cell
    /// `index`. Glyphs start from the appearance of the cells they land on.
    pub fn parse_for_surface(&self, text: &str, surface: &CellSurface, index: usize) -> ColoredString {
        self.parse_with(text, Some((surface, index)), &mut ParseCommandStacks::new())
    }

    /// Parse with caller-owned stacks, which keep their commands afterwards
    pub fn parse_with(
        &self,
        text: &str,
        target: Option<(&CellSurface, usize)>,
        stacks: &mut ParseCommandStacks,
    ) -> ColoredString {
        let chars: Vec<char> = text.chars().collect();
        let mut glyphs: Vec<ColoredGlyph> = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];

            if ch == '`' && chars.get(i + 1) == Some(&'[') {
                self.emit('[', &mut glyphs, target, stacks);
                i += 2;
                continue;
            }

            if ch == '[' {
                if let Some(end) = self.command(&chars, i, &glyphs, target, stacks) {
                    i = end + 1;
                    continue;
                }
            }

            self.emit(ch, &mut glyphs, target, stacks);
            i += 1;
        }

        let mut string = ColoredString::from_glyphs(glyphs);
        string.ignore_effect = !stacks.turn_on_effects;
        string
    }

    /// Try to read a command at `start`. Returns the index of its closing
    /// bracket when a command was accepted.
    fn command(
        &self,
        chars: &[char],
        start: usize,
        glyphs: &[ColoredGlyph],
        target: Option<(&CellSurface, usize)>,
        stacks: &mut ParseCommandStacks,
    ) -> Option<usize> {
        if start + 4 >= chars.len() || chars[start + 1] != 'c' || chars[start + 2] != ':' {
            return None;
        }
        let end = start + 2 + chars[start + 2..].iter().position(|&c| c == ']')?;
        let body: String = chars[start + 3..end].iter().collect();
        let (name, params) = match body.split_once(' ') {
            Some((name, params)) => (name.to_lowercase(), params),
            None => (body.to_lowercase(), ""),
        };

        let context = context_for(glyphs, target);
        let resolved = self
            .resolver
            .as_ref()
            .and_then(|resolver| resolver.resolve(&name, params, &context, stacks))
            .or_else(|| commands::builtin(&name, params, &context, stacks));

        match resolved {
            Some(Ok(command)) => {
                log::trace!("format command [c:{body}] as {:?}", command.kind());
                stacks.push(command);
                Some(end)
            }
            Some(Err(err)) => {
                log::debug!("format command [c:{body}] kept as text: {err}");
                None
            }
            None => {
                log::debug!("unknown format command {name:?} kept as text");
                None
            }
        }
    }

    fn emit(
        &self,
        ch: char,
        glyphs: &mut Vec<ColoredGlyph>,
        target: Option<(&CellSurface, usize)>,
        stacks: &mut ParseCommandStacks,
    ) {
        let context = context_for(glyphs, target);
        let mut glyph = context
            .surface_index
            .zip(context.surface)
            .and_then(|(index, surface)| surface.cell(index))
            .map(ColoredGlyph::from_cell)
            .unwrap_or_default();
        glyph.set_glyph_char(ch);

        for kind in CommandKind::BUILD_ORDER {
            stacks.build(kind, &mut glyph, &context);
        }
        glyphs.push(glyph);
    }
}

/// Context for the glyph about to be produced
fn context_for<'a>(
    glyphs: &'a [ColoredGlyph],
    target: Option<(&'a CellSurface, usize)>,
) -> CommandContext<'a> {
    let surface_index = target
        .map(|(surface, start)| (surface, start + glyphs.len()))
        .filter(|(surface, index)| surface.is_valid_index(*index))
        .map(|(_, index)| index);
    CommandContext {
        glyphs,
        surface: target.map(|(surface, _)| surface),
        surface_index,
    }
}

/// Parse `text` with the built-in commands only
pub fn parse(text: &str) -> ColoredString {
    Parser::new().parse(text)
}
