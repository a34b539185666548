//! Glyphgrid Format - inline formatting commands for colored strings
//!
//! Turns text such as `"[c:r f:red]Hello [c:u]world"` into a
//! `ColoredString`. Commands are embedded as `[c:name params]` brackets:
//!
//! | Command          | Params                      | Styles      |
//! |------------------|-----------------------------|-------------|
//! | `recolor` / `r`  | `f\|b:color[:N]`            | fore/back   |
//! | `mirror` / `m`   | `n\|h\|v\|b[:N]`            | mirror      |
//! | `undo` / `u`     | `[N][:f\|b\|g\|e\|m\|a]`    | pops stacks |
//! | `grad` / `g`     | `f\|b:color:color..:N`      | fore/back   |
//! | `blink` / `b`    | `[N][:speed]`               | effect      |
//! | `sglyph` / `sg`  | `glyph[:N]`                 | glyph       |
//! | `ceffect` / `ce` | `[N]`                       | effect      |
//!
//! `:N` limits a command to the next N glyphs. Malformed commands are
//! printed as text.

mod color_spec;
pub mod commands;
mod error;
mod parser;
mod stacks;

pub use color_spec::{Channel, ColorSpec};
pub use commands::{CommandContext, CommandKind, CommandStatus, Counter, ParseCommand};
pub use error::{CommandError, Result};
pub use parser::{parse, CommandResolver, Parser};
pub use stacks::{ParseCommandStacks, UndoTarget};
