//! Glyphgrid - character-grid surfaces with per-cell effects
//!
//! This crate ties the workspace together:
//!
//! - `model`: cells, surfaces, effects and colored strings (`glyphgrid-core`)
//! - `format`: the `[c:...]` inline formatting parser (`glyphgrid-format`)
//! - `config` / `scene`: TOML scene files and the headless frame runner
//!
//! ```no_run
//! use glyphgrid::{EffectRegistry, Parser, Scene};
//!
//! let scene = Scene::load("demo.toml".as_ref())?;
//! let mut surface = scene.build(&EffectRegistry::with_builtin(), &Parser::new())?;
//! glyphgrid::scene::run_frames(&mut surface, &scene.runner);
//! println!("{}", surface.snapshot().screen_text());
//! # Ok::<(), glyphgrid::Error>(())
//! ```

pub mod config;
mod error;
pub mod scene;

pub use glyphgrid_core as model;
pub use glyphgrid_format as format;

pub use config::{OutputFormat, RunnerConfig, SurfaceConfig};
pub use error::{Error, Result};
pub use glyphgrid_core::{
    CellSurface, Color, ColoredGlyph, ColoredString, EffectHandle, EffectRegistry, Snapshot,
};
pub use glyphgrid_format::Parser;
pub use scene::Scene;
