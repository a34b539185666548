//! Command stacks
//!
//! Every active command sits on the stack for the glyph part it styles and,
//! in push order, on the combined "all" stack. Only the top of each part's
//! stack styles a glyph. Undo pops from either side and keeps the other in
//! step.

use glyphgrid_core::ColoredGlyph;

use crate::commands::{CommandContext, CommandKind, CommandStatus, ParseCommand};
use crate::error::{CommandError, Result};

/// Which stack an undo pops from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoTarget {
    /// The most recent command of any kind
    All,
    /// The most recent command of one kind
    Only(CommandKind),
}

impl UndoTarget {
    /// `f`, `b`, `g`, `e`, `m` or `a`
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim() {
            "f" => Ok(UndoTarget::Only(CommandKind::Foreground)),
            "b" => Ok(UndoTarget::Only(CommandKind::Background)),
            "g" => Ok(UndoTarget::Only(CommandKind::Glyph)),
            "e" => Ok(UndoTarget::Only(CommandKind::Effect)),
            "m" => Ok(UndoTarget::Only(CommandKind::Mirror)),
            "a" => Ok(UndoTarget::All),
            other => Err(CommandError::InvalidUndoTarget(other.to_string())),
        }
    }
}

#[derive(Debug)]
struct StackEntry {
    id: u64,
    command: Box<dyn ParseCommand>,
}

/// Active formatting commands while a string is parsed
#[derive(Debug, Default)]
pub struct ParseCommandStacks {
    foreground: Vec<StackEntry>,
    background: Vec<StackEntry>,
    glyph: Vec<StackEntry>,
    mirror: Vec<StackEntry>,
    effect: Vec<StackEntry>,
    all: Vec<(CommandKind, u64)>,
    next_id: u64,
    /// Set by commands that attach or strip effects; the parsed string only
    /// carries effects when this is on
    pub turn_on_effects: bool,
}

impl ParseCommandStacks {
    pub fn new() -> Self {
        Self::default()
    }

    fn stack(&self, kind: CommandKind) -> Option<&Vec<StackEntry>> {
        match kind {
            CommandKind::Foreground => Some(&self.foreground),
            CommandKind::Background => Some(&self.background),
            CommandKind::Glyph => Some(&self.glyph),
            CommandKind::Mirror => Some(&self.mirror),
            CommandKind::Effect => Some(&self.effect),
            CommandKind::Pure => None,
        }
    }

    fn stack_mut(&mut self, kind: CommandKind) -> Option<&mut Vec<StackEntry>> {
        match kind {
            CommandKind::Foreground => Some(&mut self.foreground),
            CommandKind::Background => Some(&mut self.background),
            CommandKind::Glyph => Some(&mut self.glyph),
            CommandKind::Mirror => Some(&mut self.mirror),
            CommandKind::Effect => Some(&mut self.effect),
            CommandKind::Pure => None,
        }
    }

    /// Push a command onto its stack and the "all" stack.
    ///
    /// Pure commands have already done their work and are dropped; returns
    /// whether the command was stacked.
    pub fn push(&mut self, command: Box<dyn ParseCommand>) -> bool {
        let kind = command.kind();
        let id = self.next_id;
        let Some(stack) = self.stack_mut(kind) else {
            return false;
        };
        stack.push(StackEntry { id, command });
        self.all.push((kind, id));
        self.next_id += 1;
        true
    }

    /// Number of commands stacked for `kind`
    pub fn len(&self, kind: CommandKind) -> usize {
        self.stack(kind).map_or(0, Vec::len)
    }

    /// Number of commands on the "all" stack
    pub fn total(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// The command currently styling `kind`
    pub fn top(&self, kind: CommandKind) -> Option<&dyn ParseCommand> {
        self.stack(kind)
            .and_then(|stack| stack.last())
            .map(|entry| entry.command.as_ref())
    }

    /// Pop up to `count` commands. Returns how many were popped.
    pub fn undo(&mut self, count: usize, target: UndoTarget) -> usize {
        let mut popped = 0;
        while popped < count {
            let removed = match target {
                UndoTarget::All => match self.all.pop() {
                    Some((kind, id)) => {
                        if let Some(stack) = self.stack_mut(kind) {
                            stack.retain(|entry| entry.id != id);
                        }
                        true
                    }
                    None => false,
                },
                UndoTarget::Only(kind) => match self.stack_mut(kind).and_then(Vec::pop) {
                    Some(entry) => {
                        self.all.retain(|&(_, id)| id != entry.id);
                        true
                    }
                    None => false,
                },
            };
            if !removed {
                break;
            }
            popped += 1;
        }
        popped
    }

    /// Let the top command for `kind` style `glyph`, dropping it from both
    /// stacks once it expires
    pub fn build(
        &mut self,
        kind: CommandKind,
        glyph: &mut ColoredGlyph,
        context: &CommandContext<'_>,
    ) {
        let Some(stack) = self.stack_mut(kind) else {
            return;
        };
        let Some(entry) = stack.last_mut() else {
            return;
        };
        if entry.command.build(glyph, context) == CommandStatus::Expired {
            let id = entry.id;
            stack.pop();
            self.all.retain(|&(_, e)| e != id);
        }
    }

    /// Drop every command; the effect switch is kept
    pub fn clear(&mut self) {
        self.foreground.clear();
        self.background.clear();
        self.glyph.clear();
        self.mirror.clear();
        self.effect.clear();
        self.all.clear();
    }
}
